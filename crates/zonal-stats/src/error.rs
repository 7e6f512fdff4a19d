//! Error types for zonal aggregation.

use grid_processor::GridProcessorError;
use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur during zonal aggregation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZonalError {
    /// Region category other than county or tract.
    #[error("unsupported geography '{0}': expected 'county' or 'tract'")]
    UnsupportedGeography(String),

    /// Malformed region input.
    #[error("invalid region input: {0}")]
    InvalidRegion(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Grid(#[from] GridProcessorError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl ZonalError {
    /// Create an InvalidRegion error.
    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }
}

impl From<std::io::Error> for ZonalError {
    fn from(err: std::io::Error) -> Self {
        Self::InvalidRegion(err.to_string())
    }
}

impl From<serde_json::Error> for ZonalError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRegion(err.to_string())
    }
}

/// Result type for zonal aggregation.
pub type Result<T> = std::result::Result<T, ZonalError>;
