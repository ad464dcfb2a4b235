use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for reading, validating and converting motion records
#[derive(Error, Debug)]
pub enum MotionError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding or decoding failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// The file extension does not name a supported record format
    #[error("Unsupported motion record format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Per-frame arrays disagree in length or width
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A field holds a value outside its valid range
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// A directory walk pattern could not be built
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A directory entry could not be read during a walk
    #[error("Directory walk failed: {0}")]
    Walk(#[from] glob::GlobError),
}

impl MotionError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type using MotionError
pub type Result<T> = std::result::Result<T, MotionError>;
