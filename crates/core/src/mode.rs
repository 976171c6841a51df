//! Flight phase types
//!
//! The rig is always in exactly one phase; transitions are sequenced by
//! the orchestrator's state-machine task (see [`crate::rig`]). The enum is
//! closed, so an out-of-range phase value is unrepresentable by
//! construction rather than handled by a defensive default arm.

/// Operating phase of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightPhase {
    /// On the ground, actuators off. Leaves on a lift switch-up edge.
    #[default]
    Grounded,
    /// Climbing to hover altitude while turning to find the reference
    /// marker; yaw control disabled.
    Ascending,
    /// Normal flight; operator setpoint changes accepted.
    Airborne,
    /// Re-seeking the reference marker before descent; yaw control
    /// disabled.
    SeekingReference,
    /// Fixed low actuation on the altitude axis until touchdown.
    Descending,
}

impl FlightPhase {
    /// Display name for telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            FlightPhase::Grounded => "Grounded",
            FlightPhase::Ascending => "Ascending",
            FlightPhase::Airborne => "Airborne",
            FlightPhase::SeekingReference => "Seeking Ref",
            FlightPhase::Descending => "Descending",
        }
    }

    /// True while the phase is hunting for the reference marker; the
    /// marker interrupt is honoured only in these phases.
    pub fn is_searching(&self) -> bool {
        matches!(self, FlightPhase::Ascending | FlightPhase::SeekingReference)
    }
}
