//! Step dispatch: turning one motion step into one backend interaction.

use async_trait::async_trait;
use helix_motion_core::{
    Backend, BackendError, MotionStep,
    messages::{Float64MultiArray, GoToPoseRequest, TriggerResponse},
};
use helix_motion_session::Session;

use crate::program::Channels;

/// Sends a single step to the robot.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Dispatch `step`. Waypoints block until the planner responds;
    /// frames return once the message is handed to the transport.
    async fn dispatch(&self, step: &MotionStep) -> Result<(), BackendError>;
}

/// Dispatches through a live [`Session`].
pub struct SessionDispatcher<'a, B: Backend> {
    session: &'a Session<B>,
    channels: &'a Channels,
}

impl<'a, B: Backend> SessionDispatcher<'a, B> {
    #[must_use]
    pub const fn new(session: &'a Session<B>, channels: &'a Channels) -> Self {
        Self { session, channels }
    }
}

#[async_trait]
impl<'a, B: Backend> Dispatch for SessionDispatcher<'a, B> {
    async fn dispatch(&self, step: &MotionStep) -> Result<(), BackendError> {
        match step {
            MotionStep::Waypoint(waypoint) => {
                let request = serde_json::to_value(GoToPoseRequest::from(waypoint))?;
                let response = self.session.call(&self.channels.goal, Some(request)).await?;

                // The planner may refuse a pose without failing the call.
                if let Ok(TriggerResponse {
                    success: Some(false),
                    message,
                }) = serde_json::from_value::<TriggerResponse>(response)
                {
                    tracing::warn!(
                        service = %self.channels.goal.name,
                        "Planner rejected waypoint: {}",
                        message.unwrap_or_default()
                    );
                }
                Ok(())
            }
            MotionStep::Trajectory(frame) => {
                let msg = serde_json::to_value(Float64MultiArray::from(frame))?;
                self.session.publish(&self.channels.commands, msg).await
            }
        }
    }
}
