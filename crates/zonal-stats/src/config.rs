//! Configuration for the zonal aggregator.

use projection::EqualAreaCrs;
use serde::{Deserialize, Serialize};

/// Configuration for the zonal aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Equal-area plane in which intersection areas are measured.
    pub equal_area_crs: EqualAreaCrs,

    /// Longest polygon edge, in degrees, kept straight before projection.
    pub densify_step_deg: f64,

    /// Evaluate regions on the rayon pool.
    pub parallel: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            equal_area_crs: EqualAreaCrs::default(),
            densify_step_deg: 0.05,
            parallel: true,
        }
    }
}

impl AggregatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values are ignored and the default kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ZONAL_EQUAL_AREA_CRS") {
            if let Ok(crs) = val.parse() {
                config.equal_area_crs = crs;
            }
        }

        if let Ok(val) = std::env::var("ZONAL_DENSIFY_STEP_DEG") {
            if let Ok(step) = val.parse() {
                config.densify_step_deg = step;
            }
        }

        if let Ok(val) = std::env::var("ZONAL_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.densify_step_deg.is_finite() || self.densify_step_deg <= 0.0 {
            return Err("densify_step_deg must be a finite value > 0".to_string());
        }

        Ok(())
    }
}
