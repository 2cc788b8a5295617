//! Cooperative cancellation and the single release point for a session.

use std::{future::Future, sync::Arc, time::Duration};

use helix_motion_core::Backend;
use helix_motion_session::Session;
use tokio::{sync::watch, task::JoinHandle};

/// Owner side of a cancellation flag. Cloning shares the same flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Repeated triggers are no-ops.
    pub fn trigger(&self) {
        let was = self.tx.send_replace(true);
        if !was {
            tracing::info!("Shutdown requested");
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// A receiver for the sequencer and anything else that waits.
    #[must_use]
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger on the first Ctrl-C.
    pub fn listen_for_ctrl_c(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Interrupt received");
                    shutdown.trigger();
                }
                Err(e) => tracing::error!("Cannot listen for interrupt: {e}"),
            }
        })
    }
}

/// Receiver side of [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested. Pends forever if every
    /// [`Shutdown`] handle is dropped untriggered.
    pub async fn cancelled(&mut self) {
        let closed = self.rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if the full duration elapsed without cancellation.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.is_cancelled();
        }
        let interrupted = tokio::select! {
            () = tokio::time::sleep(duration) => false,
            () = self.cancelled() => true,
        };
        !interrupted && !self.is_cancelled()
    }
}

/// Wraps the running phase of a session and releases it exactly once,
/// however that phase ends.
pub struct ShutdownHandler<'a, B: Backend> {
    session: &'a Session<B>,
    shutdown: Shutdown,
}

impl<'a, B: Backend> ShutdownHandler<'a, B> {
    #[must_use]
    pub const fn new(session: &'a Session<B>, shutdown: Shutdown) -> Self {
        Self { session, shutdown }
    }

    #[must_use]
    pub fn signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Drive `body` to completion, then release the session.
    pub async fn run<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let result = body.await;
        self.release().await;
        result
    }

    /// Cancel and release. Only the first call closes the session.
    ///
    /// Returns `true` for the call that closed it.
    pub async fn release(&self) -> bool {
        self.shutdown.trigger();
        let closed = self.session.close().await;
        if closed {
            tracing::info!(endpoint = %self.session.endpoint(), "Terminating rosbridge client");
        }
        closed
    }
}
