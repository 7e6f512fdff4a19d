//! Regular coordinate axes.

use serde::{Deserialize, Serialize};

use crate::error::{GridProcessorError, Result};

/// Default relative tolerance when checking that an axis is uniformly spaced.
pub const DEFAULT_SPACING_TOLERANCE: f64 = 1e-6;

/// A strictly monotonic, uniformly spaced sequence of cell-centre coordinates.
///
/// Axes may run in either direction (reanalysis latitudes usually run
/// north to south), so `spacing` is signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Axis {
    values: Vec<f64>,
    spacing: f64,
}

impl Axis {
    /// Build an axis with the default spacing tolerance.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        Self::with_tolerance(values, DEFAULT_SPACING_TOLERANCE)
    }

    /// Build an axis, allowing each step to deviate from the mean step by
    /// `tolerance` (relative).
    pub fn with_tolerance(values: Vec<f64>, tolerance: f64) -> Result<Self> {
        if values.len() < 2 {
            return Err(GridProcessorError::invalid_grid(format!(
                "axis needs at least 2 distinct values to infer cell spacing, got {}",
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(GridProcessorError::invalid_grid(format!(
                "axis contains non-finite coordinate {}",
                bad
            )));
        }

        let n = values.len();
        let spacing = (values[n - 1] - values[0]) / (n - 1) as f64;
        if spacing == 0.0 {
            return Err(GridProcessorError::invalid_grid(
                "axis coordinates are not strictly monotonic",
            ));
        }

        for (k, pair) in values.windows(2).enumerate() {
            let step = pair[1] - pair[0];
            if step == 0.0 || step.signum() != spacing.signum() {
                return Err(GridProcessorError::invalid_grid(format!(
                    "axis coordinates are not strictly monotonic at index {}",
                    k + 1
                )));
            }
            if ((step - spacing) / spacing).abs() > tolerance {
                return Err(GridProcessorError::invalid_grid(format!(
                    "axis is not uniformly spaced: step {} at index {} differs from mean step {}",
                    step,
                    k + 1,
                    spacing
                )));
            }
        }

        Ok(Self { values, spacing })
    }

    /// Build an axis from a start coordinate, a signed step and a count.
    pub fn regular(start: f64, step: f64, count: usize) -> Result<Self> {
        Self::new((0..count).map(|k| start + step * k as f64).collect())
    }

    /// Cell-centre coordinates.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of cells along the axis.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; an axis holds at least two values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Signed step between consecutive cell centres.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Cell width (absolute step).
    pub fn step(&self) -> f64 {
        self.spacing.abs()
    }

    pub fn is_ascending(&self) -> bool {
        self.spacing > 0.0
    }

    /// Coordinate of cell `index`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Smallest cell-centre coordinate.
    pub fn min(&self) -> f64 {
        self.values[0].min(self.values[self.values.len() - 1])
    }

    /// Largest cell-centre coordinate.
    pub fn max(&self) -> f64 {
        self.values[0].max(self.values[self.values.len() - 1])
    }

    /// Outer cell-edge extent (min, max).
    pub fn edges(&self) -> (f64, f64) {
        let half = self.step() / 2.0;
        (self.min() - half, self.max() + half)
    }

    /// Index of the cell centre nearest to `coord`.
    ///
    /// Returns `None` when `coord` lies outside the closed range of cell
    /// centres; points beyond the outermost centre are not extrapolated.
    pub fn nearest_index(&self, coord: f64) -> Option<usize> {
        let slack = self.step() * 1e-9;
        if !coord.is_finite() || coord < self.min() - slack || coord > self.max() + slack {
            return None;
        }
        let frac = (coord - self.values[0]) / self.spacing;
        let index = frac.round().max(0.0) as usize;
        Some(index.min(self.values.len() - 1))
    }

    /// Range of cell indices whose extent overlaps `[lo, hi]`.
    pub fn overlapping_range(&self, lo: f64, hi: f64) -> Option<std::ops::RangeInclusive<usize>> {
        let (edge_min, edge_max) = self.edges();
        if hi < edge_min || lo > edge_max {
            return None;
        }
        // Cell k spans [k - 0.5, k + 0.5] in fractional index space.
        let to_index = |coord: f64| (coord - self.values[0]) / self.spacing;
        let (a, b) = (to_index(lo), to_index(hi));
        let first = (a.min(b) - 0.5).ceil().max(0.0) as usize;
        let last = ((a.max(b) + 0.5).floor().max(0.0) as usize).min(self.values.len() - 1);
        if first > last {
            return None;
        }
        Some(first..=last)
    }
}

impl TryFrom<Vec<f64>> for Axis {
    type Error = GridProcessorError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Axis> for Vec<f64> {
    fn from(axis: Axis) -> Self {
        axis.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_axis() {
        let axis = Axis::new(vec![50.0, 49.75, 49.5, 49.25]).unwrap();
        assert!(!axis.is_ascending());
        assert!((axis.spacing() + 0.25).abs() < 1e-12);
        assert!((axis.step() - 0.25).abs() < 1e-12);
        assert_eq!(axis.min(), 49.25);
        assert_eq!(axis.max(), 50.0);
        let (lo, hi) = axis.edges();
        assert!((lo - 49.125).abs() < 1e-12);
        assert!((hi - 50.125).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_rejected() {
        let err = Axis::new(vec![1.0]).unwrap_err();
        assert!(matches!(err, GridProcessorError::InvalidGrid(_)));
    }

    #[test]
    fn test_repeated_value_rejected() {
        assert!(Axis::new(vec![1.0, 1.0]).is_err());
        assert!(Axis::new(vec![0.0, 1.0, 1.0, 3.0]).is_err());
    }

    #[test]
    fn test_non_monotonic_rejected() {
        assert!(Axis::new(vec![0.0, 2.0, 1.0, 3.0]).is_err());
    }

    #[test]
    fn test_non_uniform_rejected() {
        let err = Axis::new(vec![0.0, 1.0, 3.0]).unwrap_err();
        assert!(err.to_string().contains("not uniformly spaced"));
    }

    #[test]
    fn test_tolerance_allows_float_noise() {
        let values: Vec<f64> = (0..10).map(|k| 0.1 * k as f64).collect();
        assert!(Axis::new(values).is_ok());
    }

    #[test]
    fn test_nearest_index() {
        let axis = Axis::regular(0.0, 1.0, 5).unwrap();
        assert_eq!(axis.nearest_index(0.0), Some(0));
        assert_eq!(axis.nearest_index(2.4), Some(2));
        assert_eq!(axis.nearest_index(2.6), Some(3));
        assert_eq!(axis.nearest_index(4.0), Some(4));
        assert_eq!(axis.nearest_index(-0.1), None);
        assert_eq!(axis.nearest_index(4.1), None);

        let desc = Axis::regular(10.0, -2.0, 3).unwrap();
        assert_eq!(desc.nearest_index(9.0 + 1e-6), Some(0));
        assert_eq!(desc.nearest_index(7.5), Some(1));
        assert_eq!(desc.nearest_index(6.0), Some(2));
    }

    #[test]
    fn test_overlapping_range() {
        let axis = Axis::regular(0.0, 1.0, 10).unwrap();
        assert_eq!(axis.overlapping_range(2.2, 3.7), Some(2..=4));
        assert_eq!(axis.overlapping_range(-5.0, -1.0), None);
        assert_eq!(axis.overlapping_range(-5.0, 100.0), Some(0..=9));

        let desc = Axis::regular(9.0, -1.0, 10).unwrap();
        assert_eq!(desc.overlapping_range(2.2, 3.7), Some(5..=7));
    }

    #[test]
    fn test_serde_validates() {
        let axis: Axis = serde_json::from_str("[1.0, 2.0, 3.0]").unwrap();
        assert_eq!(axis.len(), 3);
        assert!(serde_json::from_str::<Axis>("[1.0]").is_err());
    }
}
