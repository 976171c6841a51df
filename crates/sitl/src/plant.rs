//! Continuous rig dynamics sampled at the kernel's base tick
//!
//! The model is deliberately crude: first-order thrust-to-rate maps with
//! fixed trim points. It only has to exercise the kernel's loops with
//! plausible signs and magnitudes, not match the real rig.

use heli_rig_core::altitude::{ADC_STEPS, SAMPLE_RATE_HZ, VREF_MILLIVOLTS};
use heli_rig_core::yaw::SLOTS_PER_REV;

/// ADC counts with the rig resting on its pad.
pub const GROUND_ADC: f64 = 2000.0;

/// Main rotor duty that holds altitude; above it the rig climbs.
const MAIN_TRIM_DUTY: f64 = 25.0;
/// Climb rate per duty point above trim, in percent of full height per
/// second.
const CLIMB_GAIN: f64 = 0.4;

/// Tail rotor duty that cancels the main rotor's torque.
const TAIL_TRIM_DUTY: f64 = 8.0;
/// Yaw rate per duty point above trim, in encoder slots per second.
const YAW_GAIN: f64 = 5.0;

const DT: f64 = 1.0 / SAMPLE_RATE_HZ as f64;

/// Quadrature states in rotation order for increasing slot count.
const QUAD_CYCLE: [u8; 4] = [0b00, 0b10, 0b11, 0b01];

/// Something the plant's sensors raised during one base tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantEvent {
    /// Quadrature channels after one slot edge.
    Edge(bool, bool),
    /// The reference marker passed the optical sensor.
    ReferencePulse,
}

pub struct Plant {
    /// Height above the pad, percent of full tether travel.
    altitude: f64,
    /// Signed rotation from the start attitude, in fractional slots.
    yaw_slots: f64,
    /// Last integer slot reported through quadrature edges.
    reported_slot: i64,
    /// Index into [`QUAD_CYCLE`] matching `reported_slot`.
    quad_index: usize,
    /// Absolute slot of the start attitude relative to the marker.
    marker_offset: i64,
}

impl Plant {
    /// A rig on its pad, `marker_offset` slots past the reference marker.
    /// A small negative offset puts the marker a short counter-clockwise
    /// search ahead.
    pub fn new(marker_offset: i64) -> Self {
        Self {
            altitude: 0.0,
            yaw_slots: 0.0,
            reported_slot: 0,
            quad_index: 0,
            marker_offset,
        }
    }

    pub fn altitude_percent(&self) -> f64 {
        self.altitude
    }

    pub fn yaw_degrees(&self) -> f64 {
        self.yaw_slots * 360.0 / SLOTS_PER_REV as f64
    }

    /// Raw ADC counts for the current height. Higher rig, lower counts.
    pub fn adc_raw(&self) -> u16 {
        let counts_per_percent = ADC_STEPS as f64 / (VREF_MILLIVOLTS as f64 / 10.0);
        let raw = GROUND_ADC - self.altitude * counts_per_percent;
        raw.round().clamp(0.0, (ADC_STEPS - 1) as f64) as u16
    }

    /// Advance one base tick under the given effective rotor duties
    /// (`None` while a rotor is gated off).
    pub fn step(&mut self, main_duty: Option<f64>, tail_duty: Option<f64>) -> Vec<PlantEvent> {
        let main = main_duty.unwrap_or(0.0);

        let mut climb = (main - MAIN_TRIM_DUTY) * CLIMB_GAIN;
        if self.altitude <= 0.0 && climb < 0.0 {
            climb = 0.0;
        }
        self.altitude = (self.altitude + climb * DT).max(0.0);

        // No torque to fight once the tail is off, so the rig holds still.
        let yaw_rate = match tail_duty {
            Some(tail) => (tail - TAIL_TRIM_DUTY) * YAW_GAIN,
            None => 0.0,
        };
        self.yaw_slots += yaw_rate * DT;

        let mut events = Vec::new();
        let target_slot = self.yaw_slots.floor() as i64;
        while self.reported_slot != target_slot {
            let step = if target_slot > self.reported_slot { 1 } else { -1 };
            self.reported_slot += step;
            self.quad_index = (self.quad_index as i64 + step).rem_euclid(4) as usize;
            let state = QUAD_CYCLE[self.quad_index];
            events.push(PlantEvent::Edge(state & 0b01 != 0, state & 0b10 != 0));

            let absolute = self.reported_slot + self.marker_offset;
            if absolute.rem_euclid(SLOTS_PER_REV as i64) == 0 {
                events.push(PlantEvent::ReferencePulse);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounded_rig_stays_put() {
        let mut plant = Plant::new(40);
        for _ in 0..SAMPLE_RATE_HZ {
            let events = plant.step(None, None);
            assert!(events.is_empty());
        }
        assert_eq!(plant.altitude_percent(), 0.0);
        assert_eq!(plant.adc_raw(), GROUND_ADC as u16);
    }

    #[test]
    fn climbs_above_trim_and_never_digs_underground() {
        let mut plant = Plant::new(40);
        for _ in 0..SAMPLE_RATE_HZ {
            plant.step(Some(50.0), Some(8.0));
        }
        // (50 - 25) * 0.4 = 10 %/s for one second.
        assert!((plant.altitude_percent() - 10.0).abs() < 0.5);
        assert!(plant.adc_raw() < GROUND_ADC as u16);

        for _ in 0..SAMPLE_RATE_HZ * 10 {
            plant.step(Some(0.0), Some(8.0));
        }
        assert_eq!(plant.altitude_percent(), 0.0);
    }

    #[test]
    fn yaw_edges_follow_the_quadrature_cycle() {
        let mut plant = Plant::new(40);
        let mut edges = Vec::new();
        for _ in 0..SAMPLE_RATE_HZ {
            for event in plant.step(Some(25.0), Some(10.0)) {
                if let PlantEvent::Edge(a, b) = event {
                    edges.push((a, b));
                }
            }
        }
        // (10 - 8) * 5 = 10 slots/s of counter-clockwise rotation, give
        // or take one edge of accumulated rounding.
        assert!(edges.len() == 9 || edges.len() == 10, "{} edges", edges.len());
        assert_eq!(edges[0], (false, true));
        assert_eq!(edges[1], (true, true));
        assert_eq!(edges[2], (true, false));
        assert_eq!(edges[3], (false, false));
    }

    #[test]
    fn marker_fires_when_the_start_offset_is_unwound() {
        let mut plant = Plant::new(4);
        let mut pulses = 0;
        let mut edges_before_pulse = 0;
        for _ in 0..SAMPLE_RATE_HZ * 60 {
            for event in plant.step(Some(25.0), Some(6.0)) {
                match event {
                    PlantEvent::Edge(..) if pulses == 0 => edges_before_pulse += 1,
                    PlantEvent::Edge(..) => {}
                    PlantEvent::ReferencePulse => pulses += 1,
                }
            }
            if pulses > 0 {
                break;
            }
        }
        // Spinning clockwise from +4 slots reaches the marker in 4 edges.
        assert_eq!(pulses, 1);
        assert_eq!(edges_before_pulse, 4);
    }
}
