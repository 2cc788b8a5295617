//! Ordered, immutable motion sequences.

use std::time::Duration;

use thiserror::Error;

use crate::step::{MotionStep, StepKind};

/// Errors raised while building or loading a sequence.
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("Sequence has no steps")]
    Empty,
    #[error("Step {index} is a {found:?} step in a {expected:?} sequence")]
    MixedKinds {
        index: usize,
        expected: StepKind,
        found: StepKind,
    },
    #[error("Waypoint coordinates must be finite")]
    NonFiniteCoordinate,
    #[error("Invalid dwell: {0} s")]
    InvalidDwell(f64),
    #[error("Malformed trajectory at row {row}: {reason}")]
    MalformedTrajectory { row: usize, reason: String },
    #[error("Invalid waypoint script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert a dwell given in seconds.
///
/// # Errors
/// Returns [`SequenceError::InvalidDwell`] for negative or non-finite values.
pub fn dwell_from_secs(secs: f64) -> Result<Duration, SequenceError> {
    Duration::try_from_secs_f64(secs).map_err(|_| SequenceError::InvalidDwell(secs))
}

/// A non-empty list of steps of a single kind, executed in order and looped.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    kind: StepKind,
    steps: Vec<MotionStep>,
    cycle_pause: Duration,
}

impl Sequence {
    /// Build a sequence with no inter-cycle pause.
    ///
    /// Trajectory frames must all drive the same number of tendons.
    ///
    /// # Errors
    /// Returns error if `steps` is empty, mixes step kinds, or mixes frame widths.
    pub fn new(steps: Vec<MotionStep>) -> Result<Self, SequenceError> {
        let kind = steps.first().ok_or(SequenceError::Empty)?.kind();

        let mut width = None;
        for (index, step) in steps.iter().enumerate() {
            match step {
                MotionStep::Trajectory(frame) if kind == StepKind::Trajectory => {
                    let expected = *width.get_or_insert(frame.width());
                    if frame.width() != expected {
                        return Err(SequenceError::MalformedTrajectory {
                            row: index,
                            reason: format!("expected {expected} fields, found {}", frame.width()),
                        });
                    }
                }
                _ if step.kind() != kind => {
                    return Err(SequenceError::MixedKinds {
                        index,
                        expected: kind,
                        found: step.kind(),
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            kind,
            steps,
            cycle_pause: Duration::ZERO,
        })
    }

    /// Hold for `pause` after each full pass, before restarting at index 0.
    #[must_use]
    pub const fn with_cycle_pause(mut self, pause: Duration) -> Self {
        self.cycle_pause = pause;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> StepKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true for a constructed sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`, or `None` past the end.
    #[must_use]
    pub fn step_at(&self, index: usize) -> Option<&MotionStep> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MotionStep> {
        self.steps.iter()
    }

    #[must_use]
    pub const fn cycle_pause(&self) -> Duration {
        self.cycle_pause
    }

    /// Tendon count for trajectory sequences.
    #[must_use]
    pub fn width(&self) -> Option<usize> {
        match self.steps.first()? {
            MotionStep::Trajectory(frame) => Some(frame.width()),
            MotionStep::Waypoint(_) => None,
        }
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a MotionStep;
    type IntoIter = std::slice::Iter<'a, MotionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
