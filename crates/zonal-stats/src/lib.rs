//! Zonal statistics over county and tract polygons.
//!
//! Converts regular lat/lon grids into area-weighted averages over
//! irregular regions. Regions are clipped against cells in lon/lat and the
//! pieces are measured in an Albers equal-area plane, so overlap areas are
//! true surface areas.
//!
//! # Architecture
//!
//! ```text
//! FieldSet (time-stacked fields)      RegionSet (GeoJSON counties/tracts)
//!      │                                    │
//!      ▼                                    │
//! collapse_time_max per field               │
//!      │                                    ▼
//!      │                           union of region extents
//!      ▼                                    │
//! GridCells::build(window) ◄────────────────┘
//!      │  projected cell areas, R-tree over lon/lat envelopes
//!      ▼
//! per region (rayon):
//!      ├─► R-tree candidates
//!      ├─► clip region to cell, densify on the step lattice, project
//!      ├─► weight = |cell ∩ region| / |cell|
//!      └─► Σ(value · weight) / Σ(weight) for every field
//!               │
//!               ▼
//!      Vec<AggregationResult> (input order, zero-weight regions omitted)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use zonal_stats::{read_regions, write_results, GeographyKind, ZonalAggregator};
//!
//! let kind: GeographyKind = "county".parse()?;
//! let regions = read_regions("counties.geojson", kind)?;
//! let results = ZonalAggregator::default().aggregate(&fields, &regions)?;
//! write_results("wbgt_by_county.geojson", &results)?;
//! ```

pub mod aggregate;
pub mod cells;
pub mod config;
pub mod error;
pub mod geojson;
pub mod region;
pub mod reproject;

// Re-export commonly used types at crate root
pub use aggregate::{
    aggregate, missing_regions, AggregationResult, CellWeight, ZonalAggregator, MIN_CELL_WEIGHT,
};
pub use config::AggregatorConfig;
pub use error::{Result, ZonalError};
pub use geojson::{
    parse_regions, read_regions, regions_from_collection, results_to_collection, write_results,
    FeatureCollection,
};
pub use region::{GeographyKind, Region, RegionSet};
