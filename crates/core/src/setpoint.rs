//! Operator-commanded setpoint store
//!
//! Holds the targets for the two controlled axes. Every mutation re-clamps
//! or re-wraps, so readers can rely on the invariants: altitude in
//! `[0, 100]` percent, yaw in canonical `(-180, 180]` degrees. Out-of-range
//! requests saturate or wrap silently; they are never rejected.

/// Upper altitude target bound, percent.
pub const MAX_ALTITUDE: i32 = 100;

/// Lower altitude target bound, percent.
pub const MIN_ALTITUDE: i32 = 0;

/// Operator step per altitude button press, percent.
pub const ALTITUDE_STEP: i32 = 10;

/// Operator step per yaw button press, degrees.
pub const YAW_STEP: i16 = 15;

/// Targets for both axes, owned by the orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetpointStore {
    altitude: i32,
    yaw: i16,
}

impl SetpointStore {
    pub const fn new() -> Self {
        Self {
            altitude: 0,
            yaw: 0,
        }
    }

    /// Altitude target, percent.
    pub fn altitude(&self) -> i32 {
        self.altitude
    }

    /// Yaw target, degrees in `(-180, 180]`.
    pub fn yaw(&self) -> i16 {
        self.yaw
    }

    /// Set the altitude target, saturating at the bounds.
    pub fn set_altitude(&mut self, value: i32) {
        self.altitude = value.clamp(MIN_ALTITUDE, MAX_ALTITUDE);
    }

    /// Step the altitude target, saturating at the bounds.
    pub fn nudge_altitude(&mut self, delta: i32) {
        self.set_altitude(self.altitude + delta);
    }

    /// Step the yaw target, wrapping modulo 360 into `(-180, 180]`.
    pub fn nudge_yaw(&mut self, delta: i16) {
        let mut yaw = self.yaw + delta;
        if yaw > 180 {
            yaw -= 360;
        } else if yaw <= -180 {
            yaw += 360;
        }
        self.yaw = yaw;
    }

    /// Re-aim the yaw axis at the reference (zero) heading.
    pub fn zero_yaw(&mut self) {
        self.yaw = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_saturates_at_bounds() {
        let mut store = SetpointStore::new();
        store.nudge_altitude(ALTITUDE_STEP);
        assert_eq!(store.altitude(), 10);

        for _ in 0..20 {
            store.nudge_altitude(ALTITUDE_STEP);
        }
        assert_eq!(store.altitude(), MAX_ALTITUDE);

        for _ in 0..20 {
            store.nudge_altitude(-ALTITUDE_STEP);
        }
        assert_eq!(store.altitude(), MIN_ALTITUDE);
    }

    #[test]
    fn set_altitude_clamps_direct_requests() {
        let mut store = SetpointStore::new();
        store.set_altitude(250);
        assert_eq!(store.altitude(), MAX_ALTITUDE);
        store.set_altitude(-5);
        assert_eq!(store.altitude(), MIN_ALTITUDE);
        store.set_altitude(10);
        assert_eq!(store.altitude(), 10);
    }

    #[test]
    fn yaw_wraps_into_canonical_range() {
        let mut store = SetpointStore::new();
        for _ in 0..12 {
            store.nudge_yaw(YAW_STEP);
        }
        assert_eq!(store.yaw(), 180);

        // One more step wraps around to the negative side.
        store.nudge_yaw(YAW_STEP);
        assert_eq!(store.yaw(), -165);
    }

    #[test]
    fn yaw_never_reports_minus_180() {
        let mut store = SetpointStore::new();
        for _ in 0..12 {
            store.nudge_yaw(-YAW_STEP);
        }
        // -180 normalizes to the canonical +180.
        assert_eq!(store.yaw(), 180);
        store.nudge_yaw(-YAW_STEP);
        assert_eq!(store.yaw(), 165);
    }

    #[test]
    fn yaw_stays_canonical_under_any_step_sequence() {
        let mut store = SetpointStore::new();
        let steps = [YAW_STEP, YAW_STEP, -YAW_STEP, YAW_STEP, -YAW_STEP];
        for _ in 0..100 {
            for &step in &steps {
                store.nudge_yaw(step);
                assert!(store.yaw() > -180 && store.yaw() <= 180);
            }
        }
    }

    #[test]
    fn zero_yaw_reaims_at_reference() {
        let mut store = SetpointStore::new();
        store.nudge_yaw(45);
        store.zero_yaw();
        assert_eq!(store.yaw(), 0);
    }
}
