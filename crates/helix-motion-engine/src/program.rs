//! Programs: a sequence plus the channels and capabilities it needs.

use helix_motion_core::{Capability, CapabilityRequirement, Channel, Sequence, StepKind};

pub const COMMANDS_TOPIC: &str = "/tendon_transmission_node/commands";
pub const COMMANDS_TYPE: &str = "std_msgs/msg/Float64MultiArray";
pub const TENDON_STATES_TOPIC: &str = "/tendon_transmission_node/tendon_states";
pub const DELTA_INCREMENT_TOPIC: &str = "/helix_cartesian_control_node/delta_increment";
pub const GO_TO_POSE_SERVICE: &str = "/helix_cartesian_control_node/go_to_gripper_pose_vector";
pub const GO_TO_POSE_TYPE: &str = "helix_transmission_interfaces/GoToGripperPoseVector";
pub const RESET_SERVICE: &str = "/helix_cartesian_control_node/reset_model";
pub const RESET_TYPE: &str = "std_srvs/Trigger";

/// Channels steps are dispatched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channels {
    /// Topic trajectory frames are published to.
    pub commands: Channel,
    /// Service each waypoint is sent to.
    pub goal: Channel,
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            commands: Channel::topic(COMMANDS_TOPIC, COMMANDS_TYPE),
            goal: Channel::service(GO_TO_POSE_SERVICE, GO_TO_POSE_TYPE),
        }
    }
}

/// Everything the engine needs to drive one sequence.
#[derive(Debug, Clone)]
pub struct Program {
    sequence: Sequence,
    channels: Channels,
    requirement: CapabilityRequirement,
    reset: Option<Channel>,
}

impl Program {
    /// Wrap `sequence` with the requirement set and startup call for its kind.
    ///
    /// Waypoint programs need the Cartesian controller and reset its model
    /// once before the first pass; playback programs only need the tendon
    /// transmission topics.
    #[must_use]
    pub fn new(sequence: Sequence) -> Self {
        let channels = Channels::default();
        let (requirement, reset) = match sequence.kind() {
            StepKind::Waypoint => {
                let reset = Channel::service(RESET_SERVICE, RESET_TYPE);
                let requirement = CapabilityRequirement::new()
                    .with(channels.commands.capability())
                    .with(Capability::topic(DELTA_INCREMENT_TOPIC))
                    .with(channels.goal.capability())
                    .with(reset.capability());
                (requirement, Some(reset))
            }
            StepKind::Trajectory => {
                let requirement = CapabilityRequirement::new()
                    .with(Capability::topic(TENDON_STATES_TOPIC))
                    .with(channels.commands.capability());
                (requirement, None)
            }
        };
        Self {
            sequence,
            channels,
            requirement,
            reset,
        }
    }

    #[must_use]
    pub const fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    #[must_use]
    pub const fn channels(&self) -> &Channels {
        &self.channels
    }

    #[must_use]
    pub const fn requirement(&self) -> &CapabilityRequirement {
        &self.requirement
    }

    /// Service called once after validation, if any.
    #[must_use]
    pub const fn reset(&self) -> Option<&Channel> {
        self.reset.as_ref()
    }
}
