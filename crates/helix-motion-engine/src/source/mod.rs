//! Where sequences come from: built-in waypoint scripts and CSV trajectories.

pub mod script;
pub mod trajectory;

pub use script::{CARTESIAN_DEMO, WaypointRecord, cartesian_demo, parse_script};
pub use trajectory::{
    CYCLE_PAUSE, DEFAULT_TRAJECTORY_FILE, FRAME_DWELL, load_trajectory, read_trajectory,
};
