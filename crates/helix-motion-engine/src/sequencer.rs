//! The dispatch loop: steps in order, dwell after each, repeat until cancelled.

use helix_motion_core::Sequence;

use crate::{dispatch::Dispatch, error::EngineError, shutdown::ShutdownSignal};

/// Where the sequencer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    NotStarted,
    Running { pass: u64, index: usize },
    Stopped,
}

/// Outcome of a run that ended by cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passes_completed: u64,
    pub steps_dispatched: u64,
}

/// Loops a [`Sequence`] through a [`Dispatch`] implementation.
pub struct Sequencer<'a, D: Dispatch> {
    dispatcher: &'a D,
    sequence: &'a Sequence,
    signal: ShutdownSignal,
    state: SequencerState,
    steps_dispatched: u64,
}

impl<'a, D: Dispatch> Sequencer<'a, D> {
    #[must_use]
    pub const fn new(dispatcher: &'a D, sequence: &'a Sequence, signal: ShutdownSignal) -> Self {
        Self {
            dispatcher,
            sequence,
            signal,
            state: SequencerState::NotStarted,
            steps_dispatched: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// Run until cancelled or a dispatch fails.
    ///
    /// Cancellation is checked before every step and interrupts any dwell or
    /// cycle pause; a step already dispatched is never abandoned.
    ///
    /// # Errors
    /// Returns [`EngineError::Dispatch`] for the first failed step. Nothing
    /// further is dispatched after a failure.
    pub async fn run(&mut self) -> Result<RunSummary, EngineError> {
        let mut pass = 0;
        tracing::info!(
            kind = ?self.sequence.kind(),
            steps = self.sequence.len(),
            "Starting sequence"
        );

        loop {
            for (index, step) in self.sequence.iter().enumerate() {
                if self.signal.is_cancelled() {
                    return Ok(self.stop(pass));
                }
                self.state = SequencerState::Running { pass, index };
                tracing::debug!(pass, index, "Dispatching step");

                if let Err(source) = self.dispatcher.dispatch(step).await {
                    self.state = SequencerState::Stopped;
                    return Err(EngineError::Dispatch {
                        pass,
                        index,
                        source,
                    });
                }
                self.steps_dispatched += 1;

                if !self.signal.sleep(step.dwell()).await {
                    return Ok(self.stop(pass));
                }
            }

            pass += 1;
            tracing::debug!(pass, "Pass complete");
            if !self.signal.sleep(self.sequence.cycle_pause()).await {
                return Ok(self.stop(pass));
            }
        }
    }

    fn stop(&mut self, passes_completed: u64) -> RunSummary {
        self.state = SequencerState::Stopped;
        let summary = RunSummary {
            passes_completed,
            steps_dispatched: self.steps_dispatched,
        };
        tracing::info!(
            passes = summary.passes_completed,
            steps = summary.steps_dispatched,
            "Sequence stopped"
        );
        summary
    }
}
