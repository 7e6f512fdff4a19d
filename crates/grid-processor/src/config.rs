//! Configuration for the grid processor.

use serde::{Deserialize, Serialize};

use crate::axis::DEFAULT_SPACING_TOLERANCE;

/// Configuration for the grid processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridProcessorConfig {
    /// Relative tolerance when checking that axes are uniformly spaced.
    pub spacing_tolerance: f64,

    /// Fill time slices on the rayon pool.
    pub parallel: bool,

    /// Numeric fill value to treat as missing, in addition to NaN.
    pub missing_value: Option<f32>,
}

impl Default for GridProcessorConfig {
    fn default() -> Self {
        Self {
            spacing_tolerance: DEFAULT_SPACING_TOLERANCE,
            parallel: true,
            missing_value: None,
        }
    }
}

impl GridProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_SPACING_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                config.spacing_tolerance = tol;
            }
        }

        if let Ok(val) = std::env::var("GRID_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("GRID_MISSING_VALUE") {
            if let Ok(sentinel) = val.parse() {
                config.missing_value = Some(sentinel);
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.spacing_tolerance.is_finite() || self.spacing_tolerance < 0.0 {
            return Err("spacing_tolerance must be a finite value >= 0".to_string());
        }

        if let Some(sentinel) = self.missing_value {
            if sentinel.is_nan() {
                return Err("missing_value must not be NaN; NaN is always missing".to_string());
            }
        }

        Ok(())
    }
}
