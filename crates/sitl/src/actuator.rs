//! Simulated rotor actuators

use heli_rig_core::traits::RotorActuator;

/// Records the kernel's duty and gating commands in place of a PWM
/// peripheral.
#[derive(Debug, Default, Clone)]
pub struct SimRotor {
    duty: i32,
    running: bool,
    commands: u64,
}

impl SimRotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thrust the plant sees: the commanded duty while gated on, nothing
    /// otherwise.
    pub fn effective_duty(&self) -> Option<f64> {
        self.running.then_some(self.duty as f64)
    }

    /// Number of duty commands received, for scenario assertions.
    pub fn commands(&self) -> u64 {
        self.commands
    }
}

impl RotorActuator for SimRotor {
    fn set_duty(&mut self, percent: i32) -> Result<(), &'static str> {
        self.duty = percent;
        self.commands += 1;
        Ok(())
    }

    fn set_running(&mut self, running: bool) -> Result<(), &'static str> {
        self.running = running;
        Ok(())
    }

    fn duty(&self) -> i32 {
        self.duty
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
