//! Session manager for the control backend connection.

use std::sync::atomic::{AtomicBool, Ordering};

use helix_motion_core::{
    Backend, BackendError, Capabilities, CapabilityError, Channel, Connector, Endpoint,
};
use serde_json::Value;

/// Session manager error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot connect to {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        source: BackendError,
    },
    #[error("Session to {0} is not connected")]
    NotReady(Endpoint),
    #[error("Capability query failed: {0}")]
    Query(#[source] BackendError),
    #[error(transparent)]
    MissingCapability(#[from] CapabilityError),
}

/// Connection state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Disconnected,
}

/// One live connection to the control backend.
///
/// Components borrow the session and talk through [`Session::call`] and
/// [`Session::publish`]; only the shutdown path calls [`Session::close`].
pub struct Session<B: Backend> {
    endpoint: Endpoint,
    backend: B,
    released: AtomicBool,
}

impl<B: Backend> Session<B> {
    /// Wrap an already connected backend.
    #[must_use]
    pub const fn new(endpoint: Endpoint, backend: B) -> Self {
        Self {
            endpoint,
            backend,
            released: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if !self.released.load(Ordering::SeqCst) && self.backend.is_connected() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    /// True only while connected and not yet released.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Names currently advertised by the backend.
    ///
    /// # Errors
    /// Returns error if the session is not ready or the query fails.
    pub async fn list_advertised(&self) -> Result<Capabilities, SessionError> {
        if !self.is_ready() {
            return Err(SessionError::NotReady(self.endpoint.clone()));
        }
        self.backend.advertised().await.map_err(SessionError::Query)
    }

    /// Synchronous request/response call.
    ///
    /// # Errors
    /// Returns the transport error unchanged.
    pub async fn call(&self, service: &Channel, args: Option<Value>) -> Result<Value, BackendError> {
        self.backend.call(service, args).await
    }

    /// Fire-and-forget publish.
    ///
    /// # Errors
    /// Returns the transport error unchanged.
    pub async fn publish(&self, topic: &Channel, msg: Value) -> Result<(), BackendError> {
        self.backend.publish(topic, msg).await
    }

    /// Release the session. Safe to call any number of times.
    ///
    /// Returns `true` only for the call that actually released it.
    pub async fn close(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Err(e) = self.backend.close().await {
            tracing::warn!(endpoint = %self.endpoint, "Error while closing session: {e}");
        }
        true
    }
}

/// Opens sessions through a [`Connector`].
pub struct SessionManager<C: Connector> {
    connector: C,
}

impl<C: Connector> SessionManager<C> {
    /// Create a new session manager.
    #[must_use]
    pub const fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Open a session. No retries: a failed handshake is returned immediately.
    ///
    /// # Errors
    /// Returns [`SessionError::Connect`] if the handshake fails, or
    /// [`SessionError::NotReady`] if the backend reports itself disconnected.
    pub async fn open(&self, endpoint: &Endpoint) -> Result<Session<C::Backend>, SessionError> {
        tracing::debug!(%endpoint, "Opening session");
        let backend = self
            .connector
            .connect(endpoint)
            .await
            .map_err(|source| SessionError::Connect {
                endpoint: endpoint.clone(),
                source,
            })?;

        let session = Session::new(endpoint.clone(), backend);
        if !session.is_ready() {
            session.close().await;
            return Err(SessionError::NotReady(endpoint.clone()));
        }

        tracing::info!(%endpoint, "Session open");
        Ok(session)
    }
}
