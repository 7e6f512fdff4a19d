//! Gridded field processing for the WBGT pipeline.
//!
//! This crate holds regular lat/lon grids of climate variables and the
//! per-cell operations applied to them before zonal aggregation:
//!
//! - **Regridding**: nearest-neighbour resampling onto another grid
//! - **Gap filling**: every missing cell takes the value of the nearest
//!   defined cell, one time slice at a time
//! - **Derived fields**: daily WBGT from a caller-supplied formula and its
//!   maximum over time
//!
//! # Pipeline
//!
//! ```text
//! coarse mrt grid            reanalysis grid (t2m, d2m, u10, v10)
//!      │                              │
//!      ▼                              │
//! regrid_nearest(target axes)         │
//!      │  (edge ring is NaN)          │
//!      ▼                              │
//! GapFiller::fill_field               │
//!      │                              │
//!      └──────────────┬───────────────┘
//!                     ▼
//!        compute_daily_and_max_wbgt
//!                     │
//!                     ▼
//!          WbgtFields { daily, max }  ──►  zonal aggregation
//! ```
//!
//! # Example
//!
//! ```
//! use grid_processor::{fill_missing, ScalarGrid};
//!
//! let grid = ScalarGrid::new(
//!     vec![0.0, 1.0],
//!     vec![0.0, 1.0],
//!     vec![f32::NAN, 20.0, 30.0, 40.0],
//! )?;
//! let filled = fill_missing(&grid)?;
//! assert_eq!(filled.values(), &[20.0, 20.0, 30.0, 40.0]);
//! # Ok::<(), grid_processor::GridProcessorError>(())
//! ```

pub mod axis;
pub mod compute;
pub mod config;
pub mod document;
pub mod error;
pub mod fill;
pub mod reduce;
pub mod regrid;
pub mod types;

// Re-export commonly used types at crate root
pub use axis::Axis;
pub use compute::{
    compute_daily_and_max_wbgt, wind_speed, ClimateFields, WbgtFields, WbgtFormula,
};
pub use config::GridProcessorConfig;
pub use document::{read_field_set, write_field_set, GridDocument};
pub use error::{GridProcessorError, Result};
pub use fill::{fill_missing, fill_nearest_2d, GapFiller};
pub use reduce::collapse_time_max;
pub use regrid::regrid_nearest;
pub use types::{is_missing, BoundingBox, FieldSet, ScalarGrid};
