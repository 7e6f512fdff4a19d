//! Coordinate reference system transformations.
//!
//! Implements the equal-area projections used for area weighting from
//! scratch without external dependencies.

pub mod albers;
pub mod crs;
pub mod error;

pub use albers::AlbersEqualArea;
pub use crs::EqualAreaCrs;
pub use error::{ProjectionError, Result};
