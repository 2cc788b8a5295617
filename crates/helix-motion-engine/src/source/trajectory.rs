//! Recorded tendon trajectories stored as headerless CSV.

use std::{fs::File, io, path::Path, time::Duration};

use helix_motion_core::{MotionStep, Sequence, SequenceError, TrajectoryFrame};

/// Dwell after each published frame (50 Hz playback).
pub const FRAME_DWELL: Duration = Duration::from_millis(20);

/// Pause between the last frame of a pass and the first of the next.
pub const CYCLE_PAUSE: Duration = Duration::from_secs(4);

/// File the playback demo reads from its working directory.
pub const DEFAULT_TRAJECTORY_FILE: &str = "display_demo_tendon_positions.csv";

fn malformed(row: usize, reason: impl Into<String>) -> SequenceError {
    SequenceError::MalformedTrajectory {
        row,
        reason: reason.into(),
    }
}

/// Load a trajectory file.
///
/// # Errors
/// Returns [`SequenceError::Io`] if the file cannot be opened, otherwise
/// see [`read_trajectory`].
pub fn load_trajectory(path: impl AsRef<Path>) -> Result<Sequence, SequenceError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let sequence = read_trajectory(file)?;
    tracing::info!(
        path = %path.display(),
        frames = sequence.len(),
        width = sequence.width().unwrap_or_default(),
        "Loaded trajectory"
    );
    Ok(sequence)
}

/// Parse a headerless CSV trajectory: one frame per row, one position per field.
///
/// Every row must hold the same number of numeric fields. The whole input is
/// validated before anything is returned.
///
/// # Errors
/// Returns [`SequenceError::MalformedTrajectory`] naming the first bad row
/// (0-based), or [`SequenceError::Empty`] if there are no rows.
pub fn read_trajectory<R: io::Read>(reader: R) -> Result<Sequence, SequenceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut frames: Vec<MotionStep> = Vec::new();
    let mut width = None;

    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| malformed(row, e.to_string()))?;

        let positions = record
            .iter()
            .enumerate()
            .map(|(column, field)| match field.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                Ok(_) => Err(malformed(row, format!("column {column}: `{field}` is not finite"))),
                Err(e) => Err(malformed(row, format!("column {column}: `{field}`: {e}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expected = *width.get_or_insert(positions.len());
        if positions.len() != expected {
            return Err(malformed(
                row,
                format!("expected {expected} fields, found {}", positions.len()),
            ));
        }

        frames.push(TrajectoryFrame::new(positions, FRAME_DWELL).into());
    }

    Ok(Sequence::new(frames)?.with_cycle_pause(CYCLE_PAUSE))
}
