//! Capability validation, run once before any motion.

use helix_motion_core::{Backend, CapabilityRequirement};

use crate::manager::{Session, SessionError};

/// Confirm every capability in `requirement` is advertised on `session`.
///
/// Availability is assumed stable for the session's lifetime, so this runs
/// once at startup and never mid-sequence.
///
/// # Errors
/// Returns [`SessionError::MissingCapability`] naming the first absent entry,
/// or the error from querying the backend.
pub async fn require<B: Backend>(
    session: &Session<B>,
    requirement: &CapabilityRequirement,
) -> Result<(), SessionError> {
    let advertised = session.list_advertised().await?;

    if let Err(e) = requirement.check(&advertised) {
        tracing::error!(endpoint = %session.endpoint(), "{e}");
        return Err(e.into());
    }

    tracing::debug!(
        count = requirement.required().len(),
        "All required capabilities available"
    );
    Ok(())
}
