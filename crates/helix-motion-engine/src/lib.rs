//! Motion sequencing for the helix tendon robot.
//!
//! Provides:
//! - `source` - Built-in waypoint scripts and CSV trajectory loading
//! - `Program` - A sequence with its channels and capability requirements
//! - `Sequencer` - The dispatch/dwell loop
//! - `Shutdown` / `ShutdownHandler` - Cancellation and single release
//! - `MotionEngine` - Connect, validate and run a program

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod program;
pub mod sequencer;
pub mod shutdown;
pub mod source;

pub use dispatch::{Dispatch, SessionDispatcher};
pub use engine::MotionEngine;
pub use error::EngineError;
pub use program::{Channels, Program};
pub use sequencer::{RunSummary, Sequencer, SequencerState};
pub use shutdown::{Shutdown, ShutdownHandler, ShutdownSignal};
