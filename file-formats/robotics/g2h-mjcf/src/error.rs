use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for MJCF robot description parsing and evaluation
#[derive(Error, Debug)]
pub enum MjcfError {
    /// I/O Error during reading
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A required element is missing from the description
    #[error("Missing element: <{0}>")]
    MissingElement(String),

    /// A numeric attribute list has the wrong arity or cannot be parsed
    #[error("Malformed topology: <{element}> attribute '{attribute}': {reason}")]
    MalformedTopology {
        element: String,
        attribute: String,
        reason: String,
    },

    /// A geom names a mesh that is not declared in the asset section
    #[error("Unknown mesh reference '{mesh}' in body '{body}'")]
    UnknownMeshReference { mesh: String, body: String },

    /// A mesh asset file does not exist on disk
    #[error("Mesh asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// A mesh asset uses a file format we cannot read
    #[error("Unsupported mesh format: {}", .0.display())]
    UnsupportedMeshFormat(PathBuf),

    /// A mesh asset exists but could not be decoded
    #[error("Failed to load mesh {}: {reason}", .path.display())]
    MeshLoad { path: PathBuf, reason: String },

    /// Per-frame inputs disagree with the model or with each other
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Result type using MjcfError
pub type Result<T> = std::result::Result<T, MjcfError>;
