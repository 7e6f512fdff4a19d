//! Error types for projection setup.

use thiserror::Error;

/// Errors raised while building a projection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// The projection parameters do not define a usable projection.
    #[error("invalid projection parameters: {0}")]
    InvalidParameters(String),

    /// The CRS identifier is not one of the supported equal-area systems.
    #[error("unsupported equal-area CRS: {0}")]
    UnsupportedCrs(String),
}

impl ProjectionError {
    /// Create an InvalidParameters error.
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
