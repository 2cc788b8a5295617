//! Hand-authored Cartesian waypoint scripts.

use helix_motion_core::{
    Sequence, SequenceError, Vector3, WaypointStep, sequence::dwell_from_secs,
};
use serde::{Deserialize, Serialize};

/// One scripted goal pose, with its dwell in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub goal_point: Vector3,
    pub goal_direction: Vector3,
    #[serde(default = "linear_default")]
    pub plan_linear: bool,
    pub dwell: f64,
}

const fn linear_default() -> bool {
    true
}

impl WaypointRecord {
    const fn linear(point: [f64; 3], direction: [f64; 3], dwell: f64) -> Self {
        Self {
            goal_point: Vector3::new(point[0], point[1], point[2]),
            goal_direction: Vector3::new(direction[0], direction[1], direction[2]),
            plan_linear: true,
            dwell,
        }
    }

    /// Validate and convert into a step.
    ///
    /// # Errors
    /// Returns error for non-finite coordinates or an invalid dwell.
    pub fn to_step(&self) -> Result<WaypointStep, SequenceError> {
        WaypointStep::new(
            self.goal_point,
            self.goal_direction,
            self.plan_linear,
            dwell_from_secs(self.dwell)?,
        )
    }
}

/// Gripper tour used by the Cartesian demo: centre, four compass points,
/// a tilted pass and back toward the start.
pub const CARTESIAN_DEMO: &[WaypointRecord] = &[
    WaypointRecord::linear([0.0, 0.0, -0.5], [0.0, 0.0, -1.0], 1.0),
    WaypointRecord::linear([0.17, 0.0, -0.5], [0.0, 0.0, -1.0], 1.0),
    WaypointRecord::linear([-0.17, 0.0, -0.5], [0.0, 0.0, -1.0], 1.5),
    WaypointRecord::linear([0.0, 0.17, -0.5], [0.0, 0.0, -1.0], 1.0),
    WaypointRecord::linear([0.0, -0.17, -0.5], [0.0, 0.0, -1.0], 1.0),
    WaypointRecord::linear([0.0, -0.17, -0.5], [0.0, -1.0, -1.0], 1.5),
    WaypointRecord::linear([0.0, -0.1, -0.43], [0.0, -1.0, -1.0], 1.0),
    WaypointRecord::linear([-0.15, -0.1, -0.43], [0.0, -1.0, -1.0], 1.0),
    WaypointRecord::linear([-0.15, -0.1, -0.5], [0.0, -1.0, -1.0], 0.5),
    WaypointRecord::linear([-0.15, -0.1, -0.5], [-1.0, 0.0, -1.0], 1.5),
    WaypointRecord::linear([-0.15, -0.1, -0.5], [0.0, 0.0, -1.0], 1.5),
];

/// Build a waypoint sequence from records, in order.
///
/// # Errors
/// Returns error if `records` is empty or any record is invalid.
pub fn from_records(records: &[WaypointRecord]) -> Result<Sequence, SequenceError> {
    let steps = records
        .iter()
        .map(|r| r.to_step().map(Into::into))
        .collect::<Result<Vec<_>, _>>()?;
    Sequence::new(steps)
}

/// The built-in Cartesian demo sequence.
///
/// # Errors
/// Returns error only if [`CARTESIAN_DEMO`] is edited into an invalid state.
pub fn cartesian_demo() -> Result<Sequence, SequenceError> {
    from_records(CARTESIAN_DEMO)
}

/// Parse a JSON array of [`WaypointRecord`]s.
///
/// # Errors
/// Returns error for malformed JSON, an empty array or invalid records.
pub fn parse_script(json: &str) -> Result<Sequence, SequenceError> {
    let records: Vec<WaypointRecord> = serde_json::from_str(json)?;
    from_records(&records)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use helix_motion_core::{MotionStep, StepKind};

    use super::*;

    #[test]
    fn test_demo_is_valid_closed_tour() {
        let seq = cartesian_demo().unwrap();
        assert_eq!(seq.kind(), StepKind::Waypoint);
        assert_eq!(seq.len(), CARTESIAN_DEMO.len());
        assert_eq!(seq.cycle_pause(), Duration::ZERO);

        for step in &seq {
            let dwell = step.dwell();
            assert!(dwell >= Duration::from_millis(500) && dwell <= Duration::from_millis(1500));
        }

        let (Some(MotionStep::Waypoint(first)), Some(MotionStep::Waypoint(last))) =
            (seq.step_at(0), seq.step_at(seq.len() - 1))
        else {
            panic!("expected waypoints");
        };
        let gap = (first.goal_point().x - last.goal_point().x).hypot(first.goal_point().y - last.goal_point().y);
        assert!(gap < 0.25, "tour should end near its start, gap {gap}");
        assert_eq!(first.goal_direction(), last.goal_direction());
    }

    #[test]
    fn test_parse_script() {
        let json = r#"[
            {"goal_point": {"x": 0, "y": 0, "z": -0.5}, "goal_direction": {"x": 0, "y": 0, "z": -1}, "dwell": 1},
            {"goal_point": {"x": 0.1, "y": 0, "z": -0.5}, "goal_direction": {"x": 0, "y": 0, "z": -1}, "plan_linear": false, "dwell": 0.5}
        ]"#;
        let seq = parse_script(json).unwrap();
        assert_eq!(seq.len(), 2);
        let Some(MotionStep::Waypoint(second)) = seq.step_at(1) else {
            panic!("expected waypoint");
        };
        assert!(!second.plan_linear());
        assert_eq!(seq.step_at(1).unwrap().dwell(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_script_rejects_bad_input() {
        assert!(matches!(parse_script("[]"), Err(SequenceError::Empty)));
        assert!(matches!(parse_script("{"), Err(SequenceError::Script(_))));
        let negative = r#"[{"goal_point": {"x": 0, "y": 0, "z": 0}, "goal_direction": {"x": 0, "y": 0, "z": -1}, "dwell": -2}]"#;
        assert!(matches!(parse_script(negative), Err(SequenceError::InvalidDwell(_))));
    }
}
