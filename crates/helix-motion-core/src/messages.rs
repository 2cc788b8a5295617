//! Payload schemas exchanged with the helix control nodes.

use serde::{Deserialize, Serialize};

use crate::step::{TrajectoryFrame, Vector3, WaypointStep};

/// `helix_transmission_interfaces/GoToGripperPoseVector` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoToPoseRequest {
    pub goal_point: Vector3,
    pub goal_direction: Vector3,
    pub plan_linear: bool,
}

impl From<&WaypointStep> for GoToPoseRequest {
    fn from(step: &WaypointStep) -> Self {
        Self {
            goal_point: step.goal_point(),
            goal_direction: step.goal_direction(),
            plan_linear: step.plan_linear(),
        }
    }
}

/// `std_msgs/msg/Float64MultiArray`; only `data` is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Float64MultiArray {
    pub data: Vec<f64>,
}

impl From<&TrajectoryFrame> for Float64MultiArray {
    fn from(frame: &TrajectoryFrame) -> Self {
        Self {
            data: frame.positions().to_vec(),
        }
    }
}

/// Response fields shared by `std_srvs/Trigger` and the planner services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
