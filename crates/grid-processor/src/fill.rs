//! Nearest-neighbour gap filling.
//!
//! Resampling a coarse field onto a finer grid leaves a ring of undefined
//! cells along the edges of the bounding box. Each undefined cell is
//! replaced by the value of the closest defined cell, measured by Euclidean
//! distance in grid-index space.
//!
//! The nearest cell is found with an exact separable feature transform
//! (Felzenszwalb & Huttenlocher, "Distance Transforms of Sampled
//! Functions"): a pass along each row finds the nearest defined column, then
//! a lower-envelope pass down each column picks the best row. Among
//! equidistant candidates the one first in row-major scan order wins.

use rayon::prelude::*;
use tracing::debug;

use crate::config::GridProcessorConfig;
use crate::error::{GridProcessorError, Result};
use crate::types::{is_missing, FieldSet, ScalarGrid};

/// For every cell of a `width` x `height` slice, the flat index of the
/// nearest defined cell.
///
/// Returns `None` when the slice has no defined cell at all.
pub fn nearest_defined_indices(data: &[f32], width: usize, height: usize) -> Option<Vec<usize>> {
    debug_assert_eq!(data.len(), width * height);

    // Pass 1: nearest defined column within each row (ties go left).
    let mut nearest_col: Vec<Option<usize>> = vec![None; width * height];
    for row in 0..height {
        let base = row * width;
        let mut last: Option<usize> = None;
        for col in 0..width {
            if !is_missing(data[base + col]) {
                last = Some(col);
            }
            nearest_col[base + col] = last;
        }
        let mut next: Option<usize> = None;
        for col in (0..width).rev() {
            if !is_missing(data[base + col]) {
                next = Some(col);
            }
            let choice = match (nearest_col[base + col], next) {
                (Some(l), Some(r)) => {
                    if r - col < col - l {
                        Some(r)
                    } else {
                        Some(l)
                    }
                }
                (l, r) => l.or(r),
            };
            nearest_col[base + col] = choice;
        }
    }

    if nearest_col.iter().all(Option::is_none) {
        return None;
    }

    // Pass 2: lower envelope of parabolas down each column. Each site is a
    // row with a defined cell, weighted by its squared column distance.
    let mut result = vec![0usize; width * height];
    let mut sites: Vec<(usize, f64)> = Vec::with_capacity(height);
    let mut starts: Vec<f64> = Vec::with_capacity(height);

    for col in 0..width {
        sites.clear();
        starts.clear();

        for row in 0..height {
            let Some(site_col) = nearest_col[row * width + col] else {
                continue;
            };
            let d = site_col as f64 - col as f64;
            let f_row = d * d;
            let r = row as f64;

            let mut start = f64::NEG_INFINITY;
            while let (Some(&(top, f_top)), Some(&top_start)) = (sites.last(), starts.last()) {
                let t = top as f64;
                let s = ((f_row + r * r) - (f_top + t * t)) / (2.0 * r - 2.0 * t);
                if s <= top_start {
                    sites.pop();
                    starts.pop();
                } else {
                    start = s;
                    break;
                }
            }
            sites.push((row, f_row));
            starts.push(start);
        }

        // A cell sitting exactly on a boundary keeps the earlier (lower) row.
        let mut k = 0;
        for row in 0..height {
            while k + 1 < sites.len() && starts[k + 1] < row as f64 {
                k += 1;
            }
            let site_row = sites[k].0;
            let site_col = nearest_col[site_row * width + col].unwrap_or(col);
            result[row * width + col] = site_row * width + site_col;
        }
    }

    Some(result)
}

/// Fill missing cells of one `width` x `height` slice.
///
/// Returns `None` when no defined cell exists.
pub fn fill_nearest_2d(data: &[f32], width: usize, height: usize) -> Option<Vec<f32>> {
    if !data.iter().any(|v| is_missing(*v)) {
        return Some(data.to_vec());
    }
    let indices = nearest_defined_indices(data, width, height)?;
    Some(
        data.iter()
            .zip(indices.iter())
            .map(|(v, &src)| if is_missing(*v) { data[src] } else { *v })
            .collect(),
    )
}

/// Gap filler for whole grids and field sets.
#[derive(Debug, Clone, Default)]
pub struct GapFiller {
    config: GridProcessorConfig,
}

impl GapFiller {
    pub fn new(config: GridProcessorConfig) -> Self {
        Self { config }
    }

    /// Fill an unnamed grid.
    pub fn fill(&self, grid: &ScalarGrid) -> Result<ScalarGrid> {
        self.fill_field("field", grid)
    }

    /// Fill every missing cell of `grid`, slice by slice.
    ///
    /// A grid without missing cells is returned unchanged. Fails with
    /// `UnfillableField` if any slice has no defined cell.
    pub fn fill_field(&self, name: &str, grid: &ScalarGrid) -> Result<ScalarGrid> {
        let grid = match self.config.missing_value {
            Some(sentinel) => grid.clone().mask_value(sentinel),
            None => grid.clone(),
        };

        let missing = grid.missing_count();
        if missing == 0 {
            return Ok(grid);
        }

        let (width, height) = (grid.nlon(), grid.nlat());
        let time_slice = |t: usize| grid.has_time().then_some(t);
        let fill_slice = |(t, slice): (usize, &[f32])| {
            fill_nearest_2d(slice, width, height)
                .ok_or_else(|| GridProcessorError::unfillable(name, time_slice(t)))
        };

        let filled: Vec<Vec<f32>> = if self.config.parallel {
            grid.values()
                .par_chunks_exact(grid.slice_len())
                .enumerate()
                .map(fill_slice)
                .collect::<Result<_>>()?
        } else {
            grid.slices()
                .enumerate()
                .map(fill_slice)
                .collect::<Result<_>>()?
        };

        debug!(
            field = name,
            slices = grid.ntime(),
            filled = missing,
            "Filled missing cells with nearest neighbours"
        );

        grid.with_values(filled.concat())
    }

    /// Fill the named fields of a set (all fields when `names` is empty).
    pub fn fill_fields(&self, fields: &FieldSet, names: &[String]) -> Result<FieldSet> {
        for name in names {
            if fields.get(name).is_none() {
                return Err(GridProcessorError::invalid_grid(format!(
                    "no field named '{}'",
                    name
                )));
            }
        }
        fields.try_map(|name, grid| {
            if names.is_empty() || names.iter().any(|n| n == name) {
                self.fill_field(name, grid)
            } else {
                Ok(grid.clone())
            }
        })
    }
}

/// Fill a grid with the default configuration.
pub fn fill_missing(grid: &ScalarGrid) -> Result<ScalarGrid> {
    GapFiller::default().fill(grid)
}
