//! Top-level run: connect, validate, prepare, loop, release.

use helix_motion_core::{Backend, Connector, Endpoint};
use helix_motion_session::{Session, SessionManager, require};

use crate::{
    dispatch::SessionDispatcher,
    error::EngineError,
    program::Program,
    sequencer::{RunSummary, Sequencer},
    shutdown::{Shutdown, ShutdownHandler, ShutdownSignal},
};

/// Drives one [`Program`] against the backend reached through `C`.
pub struct MotionEngine<C: Connector> {
    manager: SessionManager<C>,
    endpoint: Endpoint,
}

impl<C: Connector> MotionEngine<C> {
    #[must_use]
    pub const fn new(connector: C, endpoint: Endpoint) -> Self {
        Self {
            manager: SessionManager::new(connector),
            endpoint,
        }
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Run `program` until `shutdown` is triggered or something fails.
    ///
    /// Nothing is dispatched unless every required capability is advertised.
    /// Once connected, the session is closed exactly once on every exit path.
    ///
    /// # Errors
    /// Returns [`EngineError::Connection`] if no session could be opened,
    /// [`EngineError::MissingCapability`] if validation fails,
    /// [`EngineError::Reset`] if the startup call fails, or
    /// [`EngineError::Dispatch`] for the first failed step.
    pub async fn run(&self, program: &Program, shutdown: &Shutdown) -> Result<RunSummary, EngineError> {
        let session = self.manager.open(&self.endpoint).await.map_err(|e| {
            tracing::error!("{e}");
            EngineError::from(e)
        })?;

        let handler = ShutdownHandler::new(&session, shutdown.clone());
        handler
            .run(drive(&session, program, handler.signal()))
            .await
    }
}

async fn drive<B: Backend>(
    session: &Session<B>,
    program: &Program,
    signal: ShutdownSignal,
) -> Result<RunSummary, EngineError> {
    require(session, program.requirement()).await?;

    if signal.is_cancelled() {
        return Ok(RunSummary::default());
    }

    if let Some(reset) = program.reset() {
        session.call(reset, None).await.map_err(EngineError::Reset)?;
        tracing::info!(service = %reset.name, "Model reset");
    }

    let dispatcher = SessionDispatcher::new(session, program.channels());
    Sequencer::new(&dispatcher, program.sequence(), signal)
        .run()
        .await
}
