//! Error handling for the shield workspace
//!
//! Ingestion surfaces missing and empty sample files; conditioning surfaces
//! filter designs that cannot be realised. Every other anomaly is handled by
//! a documented fallback and never reaches this type.

use crate::element::ElementType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shield operations
pub type ShieldResult<T> = Result<T, ShieldError>;

/// Error type for all shield operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShieldError {
    /// A required file does not exist
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path that was probed
        path: PathBuf,
    },

    /// A sample file exists but decodes to zero elements
    #[error("Empty input: {} holds no complete {element_type} element", path.display())]
    EmptyInput {
        /// Path of the sample file
        path: PathBuf,
        /// Element type used for decoding
        element_type: ElementType,
    },

    /// Decoding parameter outside the recognised candidate sets
    #[error("Unsupported {parameter}: {value}")]
    Unsupported {
        /// Name of the rejected parameter
        parameter: &'static str,
        /// Rejected value as given by the caller
        value: String,
    },

    /// Filter parameters that cannot be turned into a stable design
    #[error("Invalid filter configuration: {reason}")]
    InvalidFilterConfig {
        /// Description of the configuration error
        reason: String,
    },

    /// Pipeline configuration that cannot be parsed or used
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error
        reason: String,
    },

    /// Matrix construction with inconsistent dimensions
    #[error("Shape mismatch: {reason}")]
    ShapeMismatch {
        /// Description of the mismatch
        reason: String,
    },

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShieldError {
    /// Shorthand for filter design failures
    pub fn filter_config(reason: impl Into<String>) -> Self {
        ShieldError::InvalidFilterConfig {
            reason: reason.into(),
        }
    }

    /// Returns true for the `NotFound` variant
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShieldError::NotFound { .. })
    }
}
