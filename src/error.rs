//! Error handling for report decoding and series reconstruction.
//!
//! Fatal errors only. Recoverable problems inside a single report (an
//! unrecognised group, a group whose value is out of range) are carried as
//! [`crate::models::Diagnostic`] values next to the decoded observation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsosError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Empty report line")]
    EmptyReport,

    #[error("Could not parse report '{text}': {reason}")]
    Parse { text: String, reason: String },

    #[error("Series reconstruction failed: {reason}")]
    Reconstruction { reason: String },

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AsosError {
    /// Create a parse error for the offending report text
    pub fn parse(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Create a reconstruction error for structurally invalid input
    pub fn reconstruction(reason: impl Into<String>) -> Self {
        Self::Reconstruction {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AsosError>;
