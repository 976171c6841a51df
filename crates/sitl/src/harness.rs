//! Lockstep bridge between the control kernel and the plant model
//!
//! Each simulated base tick plays the role of the firmware's interrupt
//! handlers: sample the plant's ADC, replay its quadrature edges, raise
//! the tick, then drain the kernel's task roster.

use heli_rig_core::rig::{Rig, TaskId, Telemetry};
use heli_rig_core::traits::{Button, SwitchEdge};

use crate::actuator::SimRotor;
use crate::error::SitlError;
use crate::plant::{Plant, PlantEvent};

pub struct SimRig {
    rig: Rig<SimRotor, SimRotor>,
    plant: Plant,
    ticks: u64,
}

impl SimRig {
    pub fn new(plant: Plant) -> Result<Self, SitlError> {
        let rig = Rig::new(SimRotor::new(), SimRotor::new()).map_err(SitlError::Kernel)?;
        Ok(Self { rig, plant, ticks: 0 })
    }

    pub fn rig(&self) -> &Rig<SimRotor, SimRotor> {
        &self.rig
    }

    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn lift_up(&mut self) {
        self.rig.on_lift_switch(SwitchEdge::Up);
    }

    pub fn lift_down(&mut self) {
        self.rig.on_lift_switch(SwitchEdge::Down);
    }

    pub fn press(&mut self, button: Button) {
        self.rig.on_button(button);
    }

    /// One base tick: plant step, interrupt replay, roster drain.
    pub fn step(&mut self) -> Result<(), SitlError> {
        let main = self.rig.main_rotor().effective_duty();
        let tail = self.rig.tail_rotor().effective_duty();
        let events = self.plant.step(main, tail);

        for event in events {
            match event {
                PlantEvent::Edge(a, b) => self.rig.on_quadrature_edge(a, b),
                PlantEvent::ReferencePulse => self.rig.on_reference_pulse(),
            }
        }
        self.rig.on_sample_ready(self.plant.adc_raw());
        self.rig.on_base_tick();
        self.ticks += 1;

        while let Some(task) = self.rig.poll().map_err(SitlError::Kernel)? {
            match task {
                TaskId::Control | TaskId::StateMachine => {}
                TaskId::Display => self.log_telemetry(log::Level::Debug),
                TaskId::Serial => self.log_telemetry(log::Level::Info),
            }
        }
        Ok(())
    }

    pub fn run_ticks(&mut self, ticks: u64) -> Result<(), SitlError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Step until `done` holds, or fail with a timeout naming `what`.
    pub fn run_until(
        &mut self,
        what: &'static str,
        max_ticks: u64,
        mut done: impl FnMut(&Rig<SimRotor, SimRotor>) -> bool,
    ) -> Result<u64, SitlError> {
        for elapsed in 0..max_ticks {
            if done(&self.rig) {
                return Ok(elapsed);
            }
            self.step()?;
        }
        Err(SitlError::Timeout(what))
    }

    fn log_telemetry(&self, level: log::Level) {
        let Telemetry {
            altitude_percent,
            altitude_setpoint,
            yaw_degrees,
            yaw_fraction,
            yaw_setpoint,
            main_duty,
            tail_duty,
            phase,
        } = self.rig.telemetry();
        log::log!(
            level,
            "t={:.2}s phase={} alt={}% (want {}) yaw={}.{}deg (want {}) main={}% tail={}%",
            self.ticks as f64 / heli_rig_core::altitude::SAMPLE_RATE_HZ as f64,
            phase.name(),
            altitude_percent,
            altitude_setpoint,
            yaw_degrees,
            yaw_fraction,
            yaw_setpoint,
            main_duty,
            tail_duty,
        );
    }
}
