//! Core abstractions for helix motion sequencing.
//!
//! This crate provides the fundamental building blocks:
//! - `MotionStep` / `Sequence` - What gets commanded, in which order
//! - `CapabilityRequirement` - Services and topics a program needs
//! - `Endpoint` / `BridgeOptions` - Where the backend lives
//! - `Backend` and `Connector` traits

pub mod capability;
pub mod config;
pub mod messages;
pub mod sequence;
pub mod step;
pub mod traits;

pub use capability::{
    Capabilities, Capability, CapabilityError, CapabilityKind, CapabilityRequirement, Channel,
};
pub use config::{BridgeOptions, Endpoint};
pub use sequence::{Sequence, SequenceError};
pub use step::{MotionStep, StepKind, TrajectoryFrame, Vector3, WaypointStep};
pub use traits::{Backend, BackendError, Connector};
