//! heli_rig_core - Pure no_std control kernel for a tethered two-rotor rig
//!
//! This crate contains the platform-agnostic control logic for a rig with
//! one main (altitude) rotor and one tail (yaw) rotor, driven by a periodic
//! base-tick interrupt plus asynchronous quadrature, reference-marker and
//! sample-complete interrupts. It can be tested on host without any
//! platform dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Narrow seams**: Hardware collaborators injected via traits; the
//!   [`rig`] orchestrator owns every component, components never reach
//!   into each other
//! - **Single-writer sharing**: Each interrupt class funnels its effect
//!   through one atomic field consumed by the dispatch thread
//!
//! # Modules
//!
//! - [`altitude`]: Sample window, baseline capture, altitude percentage
//! - [`yaw`]: Quadrature decoder, bounded angle, reference marker
//! - [`setpoint`]: Operator-commanded targets with clamp/wrap
//! - [`pid`]: Integer PID with anti-windup and output clamping
//! - [`mode`]: Flight phase enumeration
//! - [`scheduler`]: Cooperative tick-driven task roster
//! - [`traits`]: Actuator and discrete-input collaborator contracts
//! - [`rig`]: Top-level orchestrator and interrupt entry points

#![no_std]

pub mod altitude;
pub mod mode;
pub mod pid;
pub mod rig;
pub mod scheduler;
pub mod setpoint;
pub mod traits;
pub mod yaw;
