//! Rig orchestrator
//!
//! Composition root for the kernel: owns the sample window, the yaw
//! decoder, the setpoint store, both PID controllers, the flight phase and
//! the two rotor actuators, and wires them to the cooperative scheduler.
//! Components never reach into each other; everything meets here.
//!
//! The embedding delivers interrupts through the `on_*` entry points (one
//! per interrupt class) and repeatedly calls [`Rig::poll`] from its single
//! dispatch thread. `poll` drains the pending base ticks into the
//! scheduler and runs at most one ready task. The two telemetry cadences
//! perform no work inside the kernel: their task ids are returned so the
//! embedding can read [`Rig::telemetry`] at the configured rate — the
//! kernel never pushes data.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::altitude::{AltitudeEstimator, SAMPLE_RATE_HZ, SAMPLE_WINDOW};
use crate::mode::FlightPhase;
use crate::pid::{Pid, PidGains};
use crate::scheduler::Scheduler;
use crate::setpoint::{SetpointStore, ALTITUDE_STEP, YAW_STEP};
use crate::traits::{Button, RotorActuator, SwitchEdge};
use crate::yaw::{fold_error, YawDecoder};

/// Base-tick rate of the periodic timer, Hz. The sample trigger rides the
/// same timer, so this equals the sample rate.
pub const BASE_TICK_HZ: u32 = SAMPLE_RATE_HZ;

/// Lower bound forwarded to the actuators, percent duty.
pub const PWM_MIN_DUTY: i32 = 3;

/// Upper bound forwarded to the actuators, percent duty.
pub const PWM_MAX_DUTY: i32 = 60;

/// Altitude setpoint forced while ascending, percent.
pub const HOVER_ALTITUDE: i32 = 10;

/// Constant slow tail duty commanded while hunting the reference marker.
pub const SEARCH_DUTY: i32 = 10;

/// Fixed main-rotor duty override while descending, percent.
pub const LANDING_DUTY: i32 = 10;

/// Measured altitude at or below this is touchdown, percent.
pub const TOUCHDOWN_THRESHOLD: i32 = 1;

/// Control loop period, base ticks (15 Hz at the 150 Hz base).
pub const CONTROL_PERIOD: u32 = 10;

/// State machine period, base ticks (15 Hz).
pub const STATE_PERIOD: u32 = 10;

/// Display telemetry period, base ticks (10 Hz).
pub const DISPLAY_PERIOD: u32 = 15;

/// Serial telemetry period, base ticks (2 Hz).
pub const SERIAL_PERIOD: u32 = 75;

const TASK_COUNT: usize = 4;

/// Tags for the fixed task roster, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Both PID loops.
    Control,
    /// Flight phase sequencing.
    StateMachine,
    /// Display telemetry cadence (work done by the embedding).
    Display,
    /// Serial telemetry cadence (work done by the embedding).
    Serial,
}

/// Read-only snapshot for the telemetry sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub altitude_percent: i32,
    pub altitude_setpoint: i32,
    pub yaw_degrees: i16,
    pub yaw_fraction: i16,
    pub yaw_setpoint: i16,
    pub main_duty: i32,
    pub tail_duty: i32,
    pub phase: FlightPhase,
}

/// The control kernel.
pub struct Rig<M, T> {
    altitude: AltitudeEstimator<SAMPLE_WINDOW>,
    yaw: YawDecoder,
    setpoints: SetpointStore,
    altitude_pid: Pid,
    yaw_pid: Pid,
    phase: FlightPhase,
    main_rotor: M,
    tail_rotor: T,
    scheduler: Scheduler<TaskId, TASK_COUNT>,
    pending_ticks: AtomicU32,
    lift_edge: Option<SwitchEdge>,
}

impl<M: RotorActuator, T: RotorActuator> Rig<M, T> {
    /// Build the kernel around the two rotor actuators and register the
    /// fixed task roster.
    pub fn new(main_rotor: M, tail_rotor: T) -> Result<Self, &'static str> {
        let mut scheduler = Scheduler::new();
        scheduler.register(TaskId::Control, CONTROL_PERIOD)?;
        scheduler.register(TaskId::StateMachine, STATE_PERIOD)?;
        scheduler.register(TaskId::Display, DISPLAY_PERIOD)?;
        scheduler.register(TaskId::Serial, SERIAL_PERIOD)?;

        Ok(Self {
            altitude: AltitudeEstimator::new(),
            yaw: YawDecoder::new(),
            setpoints: SetpointStore::new(),
            altitude_pid: Pid::new(PidGains::ALTITUDE),
            yaw_pid: Pid::new(PidGains::YAW),
            phase: FlightPhase::Grounded,
            main_rotor,
            tail_rotor,
            scheduler,
            pending_ticks: AtomicU32::new(0),
            lift_edge: None,
        })
    }

    // ------------------------------------------------------------------
    // Interrupt entry points
    // ------------------------------------------------------------------

    /// Periodic timer interrupt. One atomic increment; the ticks are
    /// applied to the scheduler from dispatch context in [`Rig::poll`].
    pub fn on_base_tick(&self) {
        self.pending_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Sample-complete interrupt: one raw altitude ADC count.
    pub fn on_sample_ready(&mut self, raw: u16) {
        self.altitude.on_sample(raw);
    }

    /// Quadrature edge interrupt: current level of both encoder channels.
    pub fn on_quadrature_edge(&mut self, a: bool, b: bool) {
        self.yaw.on_edge(a, b);
    }

    /// Reference-marker interrupt. Honoured only while a search phase is
    /// active; zeroes the decoded position and the yaw target together so
    /// the rig holds the reference heading it just found.
    pub fn on_reference_pulse(&mut self) {
        if self.phase.is_searching() {
            self.yaw.on_reference();
            self.setpoints.zero_yaw();
        }
    }

    /// Operator button edge. Setpoint changes are accepted in normal
    /// flight only.
    pub fn on_button(&mut self, button: Button) {
        if self.phase != FlightPhase::Airborne {
            return;
        }
        match button {
            Button::AltitudeUp => self.setpoints.nudge_altitude(ALTITUDE_STEP),
            Button::AltitudeDown => self.setpoints.nudge_altitude(-ALTITUDE_STEP),
            Button::YawRight => self.setpoints.nudge_yaw(YAW_STEP),
            Button::YawLeft => self.setpoints.nudge_yaw(-YAW_STEP),
        }
    }

    /// Lift-switch edge. Latched until the phase that reacts to it runs;
    /// a lower edge flipped during ascent is acted on once airborne.
    pub fn on_lift_switch(&mut self, edge: SwitchEdge) {
        self.lift_edge = Some(edge);
    }

    /// Reset-switch edge: re-initialize the whole kernel, as a hardware
    /// reset would. The task roster survives; every counter, target,
    /// baseline and latch is dropped and the rotors are stopped.
    pub fn on_reset_switch(&mut self) -> Result<(), &'static str> {
        self.altitude.reset();
        self.yaw.reset();
        self.setpoints.reset();
        self.altitude_pid.reset();
        self.yaw_pid.reset();
        self.yaw_pid.set_enabled(true);
        self.phase = FlightPhase::Grounded;
        self.scheduler.restart();
        self.pending_ticks.store(0, Ordering::Relaxed);
        self.lift_edge = None;
        self.main_rotor.set_running(false)?;
        self.tail_rotor.set_running(false)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run one dispatch pass: fold pending base ticks into the scheduler,
    /// then execute at most one ready task.
    ///
    /// Returns the task that ran, if any. [`TaskId::Display`] and
    /// [`TaskId::Serial`] are returned without kernel-side work; the
    /// embedding reads [`Rig::telemetry`] when it sees them.
    pub fn poll(&mut self) -> Result<Option<TaskId>, &'static str> {
        let pending = self.pending_ticks.swap(0, Ordering::Relaxed);
        for _ in 0..pending {
            self.scheduler.tick();
        }

        let Some(task) = self.scheduler.next_ready() else {
            return Ok(None);
        };
        match task {
            TaskId::Control => self.run_control()?,
            TaskId::StateMachine => self.run_state_machine()?,
            TaskId::Display | TaskId::Serial => {}
        }
        Ok(Some(task))
    }

    /// Both PID loops at the control cadence.
    fn run_control(&mut self) -> Result<(), &'static str> {
        if self.phase == FlightPhase::Grounded {
            return Ok(());
        }

        // The landing override owns the altitude axis while descending.
        if self.phase != FlightPhase::Descending {
            let error = self.setpoints.altitude() - self.altitude.measurement();
            if let Some(output) = self.altitude_pid.step(error) {
                self.command_main(output)?;
            }
        }

        let raw = self.setpoints.yaw() as i32 - self.yaw.angle() as i32;
        if let Some(output) = self.yaw_pid.step(fold_error(raw)) {
            self.command_tail(output)?;
        }
        Ok(())
    }

    /// Phase actions and transitions at the state-machine cadence.
    fn run_state_machine(&mut self) -> Result<(), &'static str> {
        match self.phase {
            FlightPhase::Grounded => {
                self.main_rotor.set_running(false)?;
                self.tail_rotor.set_running(false)?;
                if self.lift_edge.take() == Some(SwitchEdge::Up) {
                    self.phase = FlightPhase::Ascending;
                }
            }
            FlightPhase::Ascending => {
                self.main_rotor.set_running(true)?;
                self.tail_rotor.set_running(true)?;
                self.yaw_pid.set_enabled(false);
                self.setpoints.set_altitude(HOVER_ALTITUDE);
                if self.yaw.reference_found() {
                    self.phase = FlightPhase::Airborne;
                } else {
                    self.command_tail(SEARCH_DUTY)?;
                }
            }
            FlightPhase::Airborne => {
                self.main_rotor.set_running(true)?;
                self.tail_rotor.set_running(true)?;
                self.yaw_pid.set_enabled(true);
                if self.lift_edge.take() == Some(SwitchEdge::Down) {
                    // New search: the latch must drop before re-seeking.
                    self.yaw.clear_reference();
                    self.phase = FlightPhase::SeekingReference;
                }
            }
            FlightPhase::SeekingReference => {
                self.yaw_pid.set_enabled(false);
                if self.yaw.reference_found() {
                    self.yaw_pid.set_enabled(true);
                    self.phase = FlightPhase::Descending;
                } else {
                    self.command_tail(SEARCH_DUTY)?;
                }
            }
            FlightPhase::Descending => {
                self.command_main(LANDING_DUTY)?;
                if self.altitude.measurement() <= TOUCHDOWN_THRESHOLD {
                    self.phase = FlightPhase::Grounded;
                }
            }
        }
        Ok(())
    }

    fn command_main(&mut self, duty: i32) -> Result<(), &'static str> {
        self.main_rotor
            .set_duty(duty.clamp(PWM_MIN_DUTY, PWM_MAX_DUTY))
    }

    fn command_tail(&mut self, duty: i32) -> Result<(), &'static str> {
        self.tail_rotor
            .set_duty(duty.clamp(PWM_MIN_DUTY, PWM_MAX_DUTY))
    }

    // ------------------------------------------------------------------
    // Read-only accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn measurement(&self) -> i32 {
        self.altitude.measurement()
    }

    pub fn setpoints(&self) -> &SetpointStore {
        &self.setpoints
    }

    pub fn yaw_control_enabled(&self) -> bool {
        self.yaw_pid.is_enabled()
    }

    pub fn main_rotor(&self) -> &M {
        &self.main_rotor
    }

    pub fn tail_rotor(&self) -> &T {
        &self.tail_rotor
    }

    /// Snapshot for the telemetry sinks (display, serial).
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            altitude_percent: self.altitude.measurement(),
            altitude_setpoint: self.setpoints.altitude(),
            yaw_degrees: self.yaw.angle(),
            yaw_fraction: self.yaw.angle_fraction(),
            yaw_setpoint: self.setpoints.yaw(),
            main_duty: self.main_rotor.duty(),
            tail_duty: self.tail_rotor.duty(),
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct TestRotor {
        duty: i32,
        running: bool,
        commands: usize,
    }

    impl RotorActuator for TestRotor {
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

    fn rig() -> Rig<TestRotor, TestRotor> {
        Rig::new(TestRotor::default(), TestRotor::default()).unwrap()
    }

    /// Prime the sample window so the baseline locks at `raw`.
    fn prime(rig: &mut Rig<TestRotor, TestRotor>, raw: u16) {
        for _ in 0..SAMPLE_WINDOW {
            rig.on_sample_ready(raw);
        }
    }

    /// Drive `n` base ticks, fully draining dispatch after each.
    fn run_ticks(rig: &mut Rig<TestRotor, TestRotor>, n: u32) {
        for _ in 0..n {
            rig.on_base_tick();
            while rig.poll().unwrap().is_some() {}
        }
    }

    /// Push the measured altitude to roughly `percent` by feeding counts
    /// below the 2000-count baseline.
    fn fly_at(rig: &mut Rig<TestRotor, TestRotor>, percent: i32) {
        let raw = 2000 - (percent * 4096 / 330) as i32;
        for _ in 0..SAMPLE_WINDOW {
            rig.on_sample_ready(raw as u16);
        }
    }

    #[test]
    fn boots_grounded_with_rotors_stopped() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Grounded);
        assert!(!rig.main_rotor().is_running());
        assert!(!rig.tail_rotor().is_running());
    }

    #[test]
    fn lift_edge_starts_ascent_and_search() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Ascending);

        run_ticks(&mut rig, STATE_PERIOD);
        assert!(rig.main_rotor().is_running());
        assert!(rig.tail_rotor().is_running());
        assert!(!rig.yaw_control_enabled());
        assert_eq!(rig.setpoints().altitude(), HOVER_ALTITUDE);
        // Reference search: constant slow tail duty.
        assert_eq!(rig.tail_rotor().duty(), SEARCH_DUTY);
    }

    #[test]
    fn down_edge_is_ignored_while_grounded() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Down);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Grounded);

        // The discarded edge must not satisfy a later up check.
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Grounded);
    }

    #[test]
    fn reference_pulse_promotes_to_airborne() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Ascending);

        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Airborne);
        run_ticks(&mut rig, STATE_PERIOD);
        assert!(rig.yaw_control_enabled());
    }

    #[test]
    fn reference_pulse_is_a_no_op_outside_search_phases() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_reference_pulse();
        assert_eq!(rig.phase(), FlightPhase::Grounded);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        // Never searched, so the latch must still be down and the rig
        // must not take off on its own.
        assert_eq!(rig.phase(), FlightPhase::Grounded);

        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Ascending);
    }

    #[test]
    fn buttons_only_act_airborne() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_button(Button::AltitudeUp);
        rig.on_button(Button::YawRight);
        assert_eq!(rig.setpoints().altitude(), 0);
        assert_eq!(rig.setpoints().yaw(), 0);

        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Airborne);

        rig.on_button(Button::AltitudeUp);
        rig.on_button(Button::YawRight);
        rig.on_button(Button::YawLeft);
        rig.on_button(Button::YawLeft);
        assert_eq!(rig.setpoints().altitude(), HOVER_ALTITUDE + ALTITUDE_STEP);
        assert_eq!(rig.setpoints().yaw(), -YAW_STEP);
    }

    #[test]
    fn lower_edge_reseeks_then_lands() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Airborne);
        fly_at(&mut rig, 10);

        rig.on_lift_switch(SwitchEdge::Down);
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::SeekingReference);
        run_ticks(&mut rig, STATE_PERIOD);
        assert!(!rig.yaw_control_enabled());
        assert_eq!(rig.tail_rotor().duty(), SEARCH_DUTY);

        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Descending);
        assert!(rig.yaw_control_enabled());

        // Landing override regardless of the PID.
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.main_rotor().duty(), LANDING_DUTY);

        // Altitude decays to the touchdown threshold.
        fly_at(&mut rig, 0);
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Grounded);
    }

    #[test]
    fn clearing_reference_forces_a_fresh_search() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::Airborne);

        // Without a second pulse the rig stays in the seek phase.
        rig.on_lift_switch(SwitchEdge::Down);
        run_ticks(&mut rig, 4 * STATE_PERIOD);
        assert_eq!(rig.phase(), FlightPhase::SeekingReference);
    }

    #[test]
    fn altitude_control_steps_toward_target_within_bounds() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);
        fly_at(&mut rig, 10);
        run_ticks(&mut rig, CONTROL_PERIOD);
        let settled = rig.main_rotor().duty();

        // A +10 setpoint step must raise the command monotonically
        // without leaving the duty bounds.
        rig.on_button(Button::AltitudeUp);
        let mut previous = settled;
        for _ in 0..5 {
            run_ticks(&mut rig, CONTROL_PERIOD);
            let duty = rig.main_rotor().duty();
            assert!(duty >= previous);
            assert!((PWM_MIN_DUTY..=PWM_MAX_DUTY).contains(&duty));
            previous = duty;
        }
        assert!(previous > settled);
    }

    #[test]
    fn duty_forwarding_is_clamped_to_pwm_range() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);

        // Huge error: the controller pins at OUTPUT_MAX (70), but the
        // actuator must never see more than the PWM ceiling.
        rig.on_button(Button::AltitudeUp); // needs Airborne
        for _ in 0..9 {
            rig.on_button(Button::AltitudeUp);
        }
        run_ticks(&mut rig, 10 * CONTROL_PERIOD);
        assert!(rig.main_rotor().duty() <= PWM_MAX_DUTY);
    }

    #[test]
    fn telemetry_snapshot_reflects_state() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        let telem = rig.telemetry();
        assert_eq!(telem.phase, FlightPhase::Grounded);
        assert_eq!(telem.altitude_percent, 0);
        assert_eq!(telem.yaw_degrees, 0);
        assert_eq!(telem.yaw_fraction, 0);

        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        let telem = rig.telemetry();
        assert_eq!(telem.phase, FlightPhase::Ascending);
        assert_eq!(telem.altitude_setpoint, HOVER_ALTITUDE);
        assert_eq!(telem.tail_duty, SEARCH_DUTY);
    }

    #[test]
    fn dispatch_runs_one_task_per_pass() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        // Tick to the point where every task is due simultaneously.
        for _ in 0..150 {
            rig.on_base_tick();
        }
        let mut order = [None; 4];
        let mut i = 0;
        while let Some(task) = rig.poll().unwrap() {
            order[i] = Some(task);
            i += 1;
        }
        assert_eq!(
            order,
            [
                Some(TaskId::Control),
                Some(TaskId::StateMachine),
                Some(TaskId::Display),
                Some(TaskId::Serial),
            ]
        );
    }

    #[test]
    fn reset_switch_reinitializes_everything() {
        let mut rig = rig();
        prime(&mut rig, 2000);
        rig.on_lift_switch(SwitchEdge::Up);
        run_ticks(&mut rig, 2 * STATE_PERIOD);
        rig.on_reference_pulse();
        run_ticks(&mut rig, STATE_PERIOD);
        rig.on_button(Button::YawRight);
        assert_eq!(rig.phase(), FlightPhase::Airborne);

        rig.on_reset_switch().unwrap();
        assert_eq!(rig.phase(), FlightPhase::Grounded);
        assert_eq!(rig.setpoints().yaw(), 0);
        assert_eq!(rig.setpoints().altitude(), 0);
        assert_eq!(rig.measurement(), 0);
        assert!(!rig.main_rotor().is_running());
        assert!(!rig.tail_rotor().is_running());
        // The baseline is gone; the window must re-prime from scratch.
        prime(&mut rig, 1000);
        assert_eq!(rig.measurement(), 0);
    }
}
