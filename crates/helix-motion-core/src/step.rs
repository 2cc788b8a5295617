//! Motion steps: the unit of commanded motion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sequence::SequenceError;

/// A Cartesian triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Whether every component is a finite real number.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Goal pose handed to the remote Cartesian planner.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointStep {
    goal_point: Vector3,
    goal_direction: Vector3,
    plan_linear: bool,
    dwell: Duration,
}

impl WaypointStep {
    /// Create a waypoint.
    ///
    /// # Errors
    /// Returns [`SequenceError::NonFiniteCoordinate`] if either triple holds a NaN or infinity.
    pub fn new(
        goal_point: Vector3,
        goal_direction: Vector3,
        plan_linear: bool,
        dwell: Duration,
    ) -> Result<Self, SequenceError> {
        if !goal_point.is_finite() || !goal_direction.is_finite() {
            return Err(SequenceError::NonFiniteCoordinate);
        }
        Ok(Self {
            goal_point,
            goal_direction,
            plan_linear,
            dwell,
        })
    }

    #[must_use]
    pub const fn goal_point(&self) -> Vector3 {
        self.goal_point
    }

    #[must_use]
    pub const fn goal_direction(&self) -> Vector3 {
        self.goal_direction
    }

    #[must_use]
    pub const fn plan_linear(&self) -> bool {
        self.plan_linear
    }
}

/// One recorded row of tendon/joint positions.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryFrame {
    positions: Vec<f64>,
    dwell: Duration,
}

impl TrajectoryFrame {
    #[must_use]
    pub const fn new(positions: Vec<f64>, dwell: Duration) -> Self {
        Self { positions, dwell }
    }

    /// Actuator positions in tendon order.
    #[must_use]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Number of tendons/joints this frame drives.
    #[must_use]
    pub fn width(&self) -> usize {
        self.positions.len()
    }
}

/// Which channel a step is dispatched through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Synchronous request to the Cartesian planner service.
    Waypoint,
    /// Fire-and-forget publish on the commands topic.
    Trajectory,
}

/// A single unit of commanded motion.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionStep {
    Waypoint(WaypointStep),
    Trajectory(TrajectoryFrame),
}

impl MotionStep {
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::Waypoint(_) => StepKind::Waypoint,
            Self::Trajectory(_) => StepKind::Trajectory,
        }
    }

    /// Time to hold after this step has been dispatched.
    #[must_use]
    pub const fn dwell(&self) -> Duration {
        match self {
            Self::Waypoint(w) => w.dwell,
            Self::Trajectory(f) => f.dwell,
        }
    }
}

impl From<WaypointStep> for MotionStep {
    fn from(step: WaypointStep) -> Self {
        Self::Waypoint(step)
    }
}

impl From<TrajectoryFrame> for MotionStep {
    fn from(frame: TrajectoryFrame) -> Self {
        Self::Trajectory(frame)
    }
}
