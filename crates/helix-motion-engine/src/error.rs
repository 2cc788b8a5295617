use helix_motion_core::{BackendError, CapabilityError, Endpoint, SequenceError};
use helix_motion_session::SessionError;

/// Why a run ended without being cancelled.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Cannot connect to rosbridge server at {endpoint}")]
    Connection {
        endpoint: Endpoint,
        #[source]
        source: Option<BackendError>,
    },
    #[error(transparent)]
    MissingCapability(#[from] CapabilityError),
    #[error("Capability query failed: {0}")]
    Query(#[source] BackendError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error("Reset call failed: {0}")]
    Reset(#[source] BackendError),
    #[error("Step {index} of pass {pass} failed: {source}")]
    Dispatch {
        pass: u64,
        index: usize,
        #[source]
        source: BackendError,
    },
}

impl From<SessionError> for EngineError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Connect { endpoint, source } => Self::Connection {
                endpoint,
                source: Some(source),
            },
            SessionError::NotReady(endpoint) => Self::Connection {
                endpoint,
                source: None,
            },
            SessionError::Query(source) => Self::Query(source),
            SessionError::MissingCapability(e) => Self::MissingCapability(e),
        }
    }
}
