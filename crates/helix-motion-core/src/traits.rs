//! Core traits for talking to the control backend.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::{
    capability::{Capabilities, Channel},
    config::Endpoint,
};

/// Transport-level failure.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Connect failed: {0}")]
    ConnectFailed(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Service {service} failed: {message}")]
    ServiceFailed { service: String, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A live connection to the control backend.
///
/// Implementations carry requests and topic messages; they never retry.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Whether the underlying connection is up.
    fn is_connected(&self) -> bool;

    /// Query the services and topics currently advertised.
    async fn advertised(&self) -> Result<Capabilities, BackendError>;

    /// Call a service and wait for its response.
    async fn call(&self, service: &Channel, args: Option<Value>) -> Result<Value, BackendError>;

    /// Publish one message on a topic without waiting for acknowledgement.
    async fn publish(&self, topic: &Channel, msg: Value) -> Result<(), BackendError>;

    /// Release the connection.
    async fn close(&self) -> Result<(), BackendError>;
}

/// Factory for [`Backend`] connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Backend: Backend;

    /// Perform the handshake with `endpoint`.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Backend, BackendError>;
}
