use std::io;
use thiserror::Error;

use crate::scene::NodeId;

/// Error types for scene updates and animation playback
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Robot description could not be loaded or evaluated
    #[error(transparent)]
    Mjcf(#[from] g2h_mjcf::MjcfError),

    /// Motion record could not be loaded
    #[error(transparent)]
    Motion(#[from] g2h_motion::MotionError),

    /// I/O Error while exporting scene state
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Scene snapshot encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node handle does not belong to the scene
    #[error("Unknown scene node {0}")]
    UnknownNode(NodeId),

    /// A node path is already taken
    #[error("Scene node '{0}' already exists")]
    DuplicateNode(String),

    /// The parent path of a new node does not exist
    #[error("Parent of scene node '{0}' does not exist")]
    MissingParent(String),

    /// Vertex data does not match the mesh it replaces
    #[error("Mesh node {node} has {expected} vertices, got {actual}")]
    VertexCountMismatch {
        node: NodeId,
        expected: usize,
        actual: usize,
    },

    /// A frame was requested before any animation was loaded
    #[error("No animation loaded")]
    NotLoaded,

    /// A frame index past the end of the loaded animation
    #[error("Frame {frame} out of range (animation has {count} frames)")]
    FrameOutOfRange { frame: usize, count: usize },

    /// The body model could not evaluate a pose
    #[error("Body model error: {0}")]
    BodyModel(String),
}

/// Result type using ViewerError
pub type Result<T> = std::result::Result<T, ViewerError>;
