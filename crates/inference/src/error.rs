//! Inference error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Invalid model artifact {}: {message}", path.display())]
    InvalidArtifact { path: PathBuf, message: String },

    /// Registry is disabled
    #[error("Prediction unavailable: {0}")]
    Unavailable(String),

    /// Declared inputs absent from the row
    #[error("Stage '{stage}' is missing features: {}", missing.join(", "))]
    SchemaMismatch { stage: String, missing: Vec<String> },

    #[error("Stage '{0}' produced a non-finite output")]
    NonFiniteOutput(String),
}
