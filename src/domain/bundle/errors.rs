//! Bundle Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Missing required artifact: {0}")]
    MissingArtifact(String),

    #[error("Invalid config document {path}: {message}")]
    InvalidDocument { path: String, message: String },

    #[error("IO error on {path}: {message}")]
    IoError { path: String, message: String },
}

impl BundleError {
    pub fn invalid_document(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
