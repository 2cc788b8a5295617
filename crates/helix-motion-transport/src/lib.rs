//! Transport layer between the motion engine and the robot.
//!
//! Provides:
//! - Wire protocol (rosbridge v2 JSON)
//! - WebSocket client implementing `Backend` (feature: websocket)

pub mod protocol;

#[cfg(feature = "websocket")]
pub mod rosbridge;

pub use protocol::{ClientOp, ServerOp};

#[cfg(feature = "websocket")]
pub use rosbridge::{RosbridgeClient, RosbridgeConnector};
