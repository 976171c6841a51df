//! heli_rig_sitl - Software-in-the-loop harness for the rig kernel
//!
//! Runs the `no_std` control kernel on the host against a small simulated
//! plant: main-rotor thrust integrates into an altitude percentage (fed
//! back as ADC counts), tail-rotor thrust into a yaw rate (fed back as
//! quadrature edges and a once-per-revolution reference pulse). The
//! harness drives both in lockstep at the kernel's base-tick rate.

pub mod actuator;
pub mod error;
pub mod harness;
pub mod plant;

pub use actuator::SimRotor;
pub use error::SitlError;
pub use harness::SimRig;
pub use plant::{Plant, PlantEvent};
