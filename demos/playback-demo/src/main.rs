//! Trajectory playback demo: streams recorded tendon positions to the
//! transmission node at 50 Hz, pausing between loops, until Ctrl-C.
//!
//! Run with: cargo run -p playback-demo [path/to/positions.csv]
//!
//! Without an argument, `display_demo_tendon_positions.csv` is read from the
//! working directory.

use std::path::PathBuf;

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

    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(source::DEFAULT_TRAJECTORY_FILE), PathBuf::from);

    // A bad file is reported before any connection is made.
    let program = Program::new(source::load_trajectory(&path)?);

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    let engine = MotionEngine::new(RosbridgeConnector::default(), Endpoint::default());
    tracing::info!(endpoint = %engine.endpoint(), "Connecting to rosbridge");

    let summary = engine.run(&program, &shutdown).await?;
    tracing::info!(
        passes = summary.passes_completed,
        frames = summary.steps_dispatched,
        "Done"
    );
    Ok(())
}
