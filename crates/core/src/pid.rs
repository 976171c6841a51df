//! Integer PID controllers for the two rig axes
//!
//! Both axes share one controller design: a proportional and incremental
//! integral term, plus a derivative term on the yaw axis only. All
//! arithmetic is integer; the error is scaled up by [`SCALE`] before the
//! gain products and scaled back down before clamping, so small errors are
//! not lost to integer division.
//!
//! Anti-windup: the integral accumulator advances only on steps where the
//! unclamped and clamped outputs agree. While the output is pinned at a
//! bound the accumulator is frozen, so desaturation does not overshoot.

/// Error scale factor for integer arithmetic (the underflow adjustment).
pub const SCALE: i32 = 100;

/// Lower actuation bound, percent duty.
pub const OUTPUT_MIN: i32 = 3;

/// Upper actuation bound, percent duty.
pub const OUTPUT_MAX: i32 = 70;

/// Gain set for one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidGains {
    pub kp: i32,
    pub ki: i32,
    pub kd: i32,
}

impl PidGains {
    /// Main-rotor (altitude) gains. No derivative term on this axis.
    pub const ALTITUDE: Self = Self { kp: 6, ki: 3, kd: 0 };

    /// Tail-rotor (yaw) gains.
    pub const YAW: Self = Self { kp: 12, ki: 3, kd: 1 };
}

/// One PID instance: gains plus integral/derivative history.
///
/// The enable gate exists for the yaw axis: the state machine disables
/// yaw correction while searching for the reference marker. A disabled
/// controller performs no work and produces no actuation value.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    integral: i32,
    prev_error: i32,
    enabled: bool,
}

impl Pid {
    pub const fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0,
            prev_error: 0,
            enabled: true,
        }
    }

    /// Advance one control step on `error` (target minus measurement).
    ///
    /// Returns the clamped actuation value, or `None` while disabled.
    /// The clamp compares the newly proposed value at both bounds.
    pub fn step(&mut self, error: i32) -> Option<i32> {
        if !self.enabled {
            return None;
        }

        let error = error * SCALE;
        let p = self.gains.kp * error;
        let di = self.gains.ki * error;
        let d = self.gains.kd * (error - self.prev_error);
        self.prev_error = error;

        let proposed = (p + (self.integral + di) + d) / SCALE;
        let output = if proposed > OUTPUT_MAX {
            OUTPUT_MAX
        } else if proposed < OUTPUT_MIN {
            OUTPUT_MIN
        } else {
            // In bounds: the accumulator may advance this step.
            self.integral += di;
            proposed
        };
        Some(output)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Integral accumulator, in scaled units.
    pub fn integral(&self) -> i32 {
        self.integral
    }

    /// Clear accumulated history; the enable gate is left as set.
    pub fn reset(&mut self) {
        self.integral = 0;
        self.prev_error = 0;
    }
}
