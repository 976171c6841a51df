//! Collaborator contracts consumed by the kernel
//!
//! Hardware-facing collaborators (PWM outputs, debounced buttons and
//! switches) live outside this crate; the kernel sees them only through
//! these narrow seams. Platform implementations belong to the embedding
//! (SITL harness or firmware).

/// Duty-cycle sink for one rotor.
///
/// The kernel clamps duty values to [`PWM_MIN_DUTY`]..[`PWM_MAX_DUTY`]
/// before forwarding, so implementations receive only in-range
/// percentages. A stopped rotor retains its last commanded duty and
/// reapplies it on start.
///
/// [`PWM_MIN_DUTY`]: crate::rig::PWM_MIN_DUTY
/// [`PWM_MAX_DUTY`]: crate::rig::PWM_MAX_DUTY
pub trait RotorActuator {
    /// Set the duty value, percent of the actuation cycle.
    fn set_duty(&mut self, percent: i32) -> Result<(), &'static str>;

    /// Gate the output on or off without touching the duty value.
    fn set_running(&mut self, running: bool) -> Result<(), &'static str>;

    /// Last commanded duty value, percent.
    fn duty(&self) -> i32;

    /// Whether the output is currently gated on.
    fn is_running(&self) -> bool;
}

/// Operator buttons, delivered as clean pressed edges.
///
/// Debouncing is the collaborator's concern; the kernel only ever sees
/// one event per physical press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Raise the altitude target one step.
    AltitudeUp,
    /// Lower the altitude target one step.
    AltitudeDown,
    /// Step the yaw target clockwise.
    YawRight,
    /// Step the yaw target counter-clockwise.
    YawLeft,
}

/// Debounced lift-switch change, delivered as a direction edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchEdge {
    /// Switch moved to the up (lift) position.
    Up,
    /// Switch moved to the down (lower) position.
    Down,
}
