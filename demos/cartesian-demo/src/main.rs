//! Cartesian waypoint demo: resets the planner model, then tours the gripper
//! through the built-in waypoint script until Ctrl-C.
//!
//! Run with: cargo run -p cartesian-demo
//!
//! Set `RUST_LOG=debug` to see every dispatched step.

use helix_motion_core::Endpoint;
use helix_motion_engine::{MotionEngine, Program, Shutdown, source};
use helix_motion_transport::RosbridgeConnector;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let program = Program::new(source::cartesian_demo()?);

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    let engine = MotionEngine::new(RosbridgeConnector::default(), Endpoint::default());
    tracing::info!(endpoint = %engine.endpoint(), "Connecting to rosbridge");

    let summary = engine.run(&program, &shutdown).await?;
    tracing::info!(
        passes = summary.passes_completed,
        waypoints = summary.steps_dispatched,
        "Done"
    );
    Ok(())
}
