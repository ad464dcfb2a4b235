//! Side-by-side replay of robot and human motion
//!
//! Players own their skeleton and loaded animation and push transforms into
//! any [`Scene`] implementation. The [`PlaybackDriver`] advances several
//! players in lock-step at a fixed frame rate.

pub mod body_model;
pub mod driver;
pub mod error;
pub mod human_player;
pub mod recording;
pub mod robot_player;
pub mod scene;

pub use body_model::{BodyModel, BodyPose, RigidTemplate};
pub use driver::{Playable, PlaybackDriver, PlaybackStats, StopReason};
pub use error::{Result, ViewerError};
pub use human_player::HumanPlayer;
pub use recording::RecordingScene;
pub use robot_player::{PlayerState, RobotPlayer};
pub use scene::{MeshData, NodeId, Scene};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
