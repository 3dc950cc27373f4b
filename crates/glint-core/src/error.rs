//! Error types for Glint

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Glint operations
#[derive(Debug, Error)]
pub enum GlintError {
    #[error("{stage} shader compile error: {log}")]
    Compile { stage: String, log: String },

    #[error("Shader link error: {0}")]
    Link(String),

    #[error("Missing required {stage} shader: {path}")]
    MissingRequiredStage { stage: String, path: PathBuf },

    #[error("Cyclic include: {0} transitively includes itself")]
    CyclicInclude(PathBuf),

    #[error("Missing include: {path} (included from {included_from})")]
    MissingInclude {
        path: PathBuf,
        included_from: PathBuf,
    },

    #[error("Missing required property: {0}")]
    MissingProperty(String),

    #[error("Property kind mismatch for '{field}': expected {expected}, got {got}")]
    PropertyKindMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Glint operations
pub type Result<T> = std::result::Result<T, GlintError>;
