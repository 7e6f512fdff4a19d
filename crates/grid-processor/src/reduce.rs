//! Reductions over the time axis.

use crate::error::Result;
use crate::types::{is_missing, ScalarGrid};

/// Per-cell maximum over time, ignoring missing values.
///
/// A cell missing at every time step stays missing. Grids without a time
/// axis are returned as they are.
pub fn collapse_time_max(grid: &ScalarGrid) -> Result<ScalarGrid> {
    if !grid.has_time() {
        return Ok(grid.clone());
    }

    let mut max = vec![f32::NAN; grid.slice_len()];
    for slice in grid.slices() {
        for (acc, &v) in max.iter_mut().zip(slice) {
            if !is_missing(v) && (is_missing(*acc) || v > *acc) {
                *acc = v;
            }
        }
    }

    ScalarGrid::from_axes(
        grid.latitudes().clone(),
        grid.longitudes().clone(),
        None,
        max,
    )
}
