//! Error types for grid processing.

use thiserror::Error;

/// Errors that can occur during grid processing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridProcessorError {
    /// The grid axes or value buffers are structurally invalid.
    ///
    /// Raised for axes with fewer than two values, non-monotonic or
    /// non-uniform axes, value buffers whose length does not match the
    /// axes, and fields whose axes disagree with each other.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A field has no defined cell to propagate into its gaps.
    #[error("field '{field}' has no non-missing values{}", slice_suffix(.slice))]
    UnfillableField {
        field: String,
        slice: Option<usize>,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Grid document could not be encoded or decoded.
    #[error("grid document error: {0}")]
    Document(String),
}

fn slice_suffix(slice: &Option<usize>) -> String {
    match slice {
        Some(t) => format!(" in time slice {}", t),
        None => String::new(),
    }
}

impl GridProcessorError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create an UnfillableField error.
    pub fn unfillable(field: impl Into<String>, slice: Option<usize>) -> Self {
        Self::UnfillableField {
            field: field.into(),
            slice,
        }
    }
}

impl From<std::io::Error> for GridProcessorError {
    fn from(err: std::io::Error) -> Self {
        Self::Document(err.to_string())
    }
}

impl From<serde_json::Error> for GridProcessorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Document(err.to_string())
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfillable_message() {
        let err = GridProcessorError::unfillable("mrt", Some(3));
        assert_eq!(
            err.to_string(),
            "field 'mrt' has no non-missing values in time slice 3"
        );

        let err = GridProcessorError::unfillable("mrt", None);
        assert_eq!(err.to_string(), "field 'mrt' has no non-missing values");
    }
}
