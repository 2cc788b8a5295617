//! Session management for the helix control backend.
//!
//! Provides:
//! - `SessionManager` / `Session` - Open, query and release the backend connection
//! - `validator::require` - Capability checks before motion starts

pub mod manager;
pub mod validator;

pub use manager::{Session, SessionError, SessionManager, SessionState};
pub use validator::require;
