//! Core types for grid processing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::error::{GridProcessorError, Result};

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check if this bounding box intersects another (shared edges count).
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.max_lon < other.min_lon
            || self.min_lon > other.max_lon
            || self.max_lat < other.min_lat
            || self.min_lat > other.max_lat)
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }
}

/// True when `value` is the missing marker.
#[inline]
pub fn is_missing(value: f32) -> bool {
    value.is_nan()
}

/// A scalar field on a regular lat/lon grid, optionally stacked over time.
///
/// Values are stored row-major as `[time][lat][lon]`; without a time axis
/// the buffer is a single `[lat][lon]` slice. Missing cells are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    latitudes: Axis,
    longitudes: Axis,
    time_index: Option<Vec<DateTime<Utc>>>,
    values: Vec<f32>,
}

impl ScalarGrid {
    /// Create a 2D grid from raw axis coordinates.
    pub fn new(latitudes: Vec<f64>, longitudes: Vec<f64>, values: Vec<f32>) -> Result<Self> {
        Self::from_axes(Axis::new(latitudes)?, Axis::new(longitudes)?, None, values)
    }

    /// Create a time-stacked grid from raw axis coordinates.
    pub fn with_time(
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        time_index: Vec<DateTime<Utc>>,
        values: Vec<f32>,
    ) -> Result<Self> {
        Self::from_axes(
            Axis::new(latitudes)?,
            Axis::new(longitudes)?,
            Some(time_index),
            values,
        )
    }

    /// Create a grid from validated axes.
    pub fn from_axes(
        latitudes: Axis,
        longitudes: Axis,
        time_index: Option<Vec<DateTime<Utc>>>,
        values: Vec<f32>,
    ) -> Result<Self> {
        if let Some(times) = &time_index {
            if times.is_empty() {
                return Err(GridProcessorError::invalid_grid("time index is empty"));
            }
            if times.windows(2).any(|w| w[1] <= w[0]) {
                return Err(GridProcessorError::invalid_grid(
                    "time index is not strictly increasing",
                ));
            }
        }

        let ntime = time_index.as_ref().map_or(1, Vec::len);
        let expected = ntime * latitudes.len() * longitudes.len();
        if values.len() != expected {
            return Err(GridProcessorError::invalid_grid(format!(
                "value buffer has {} cells, expected {} ({} x {} x {})",
                values.len(),
                expected,
                ntime,
                latitudes.len(),
                longitudes.len()
            )));
        }

        Ok(Self {
            latitudes,
            longitudes,
            time_index,
            values,
        })
    }

    pub fn latitudes(&self) -> &Axis {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &Axis {
        &self.longitudes
    }

    pub fn time_index(&self) -> Option<&[DateTime<Utc>]> {
        self.time_index.as_deref()
    }

    pub fn has_time(&self) -> bool {
        self.time_index.is_some()
    }

    /// Number of latitude rows.
    pub fn nlat(&self) -> usize {
        self.latitudes.len()
    }

    /// Number of longitude columns.
    pub fn nlon(&self) -> usize {
        self.longitudes.len()
    }

    /// Number of time slices (1 for a 2D grid).
    pub fn ntime(&self) -> usize {
        self.time_index.as_ref().map_or(1, Vec::len)
    }

    /// Cells per time slice.
    pub fn slice_len(&self) -> usize {
        self.nlat() * self.nlon()
    }

    /// All values, `[time][lat][lon]` row-major.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The 2D slice at time index `t`.
    pub fn slice(&self, t: usize) -> Option<&[f32]> {
        let len = self.slice_len();
        self.values.get(t * len..(t + 1) * len)
    }

    /// Iterate over 2D slices in time order.
    pub fn slices(&self) -> std::slice::ChunksExact<'_, f32> {
        self.values.chunks_exact(self.slice_len())
    }

    /// Value at (time, lat row, lon column).
    pub fn get(&self, t: usize, i: usize, j: usize) -> Option<f32> {
        if t >= self.ntime() || i >= self.nlat() || j >= self.nlon() {
            return None;
        }
        self.values.get(t * self.slice_len() + i * self.nlon() + j).copied()
    }

    /// Number of missing cells across all slices.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| is_missing(**v)).count()
    }

    /// Cell size as (Δlat, Δlon) in degrees.
    pub fn cell_size(&self) -> (f64, f64) {
        (self.latitudes.step(), self.longitudes.step())
    }

    /// Extent covered by the cell rectangles (not just the cell centres).
    pub fn bounds(&self) -> BoundingBox {
        let (min_lat, max_lat) = self.latitudes.edges();
        let (min_lon, max_lon) = self.longitudes.edges();
        BoundingBox::new(min_lon, min_lat, max_lon, max_lat)
    }

    /// Rectangle of cell (i, j).
    pub fn cell_bounds(&self, i: usize, j: usize) -> Option<BoundingBox> {
        let lat = self.latitudes.get(i)?;
        let lon = self.longitudes.get(j)?;
        let (dlat, dlon) = self.cell_size();
        Some(BoundingBox::new(
            lon - dlon / 2.0,
            lat - dlat / 2.0,
            lon + dlon / 2.0,
            lat + dlat / 2.0,
        ))
    }

    /// True when both grids have identical latitude and longitude axes.
    pub fn same_axes(&self, other: &ScalarGrid) -> bool {
        self.latitudes.values() == other.latitudes.values()
            && self.longitudes.values() == other.longitudes.values()
    }

    /// True when both grids have identical axes and time index.
    pub fn same_shape(&self, other: &ScalarGrid) -> bool {
        self.same_axes(other) && self.time_index == other.time_index
    }

    /// A grid with the same axes and time index but new values.
    pub fn with_values(&self, values: Vec<f32>) -> Result<Self> {
        Self::from_axes(
            self.latitudes.clone(),
            self.longitudes.clone(),
            self.time_index.clone(),
            values,
        )
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            latitudes: self.latitudes.clone(),
            longitudes: self.longitudes.clone(),
            time_index: self.time_index.clone(),
            values: self.values.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Treat a numeric fill value as missing.
    pub fn mask_value(mut self, sentinel: f32) -> Self {
        for v in self.values.iter_mut() {
            if *v == sentinel {
                *v = f32::NAN;
            }
        }
        self
    }
}

/// Named scalar fields sharing one latitude/longitude grid.
///
/// Fields are kept in name order so every consumer sees them in the same
/// sequence. Time axes may differ between fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    fields: BTreeMap<String, ScalarGrid>,
}

impl FieldSet {
    /// Build a field set, checking it is non-empty, names are unique and
    /// all fields share the same axes.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ScalarGrid)>,
        S: Into<String>,
    {
        let mut map: BTreeMap<String, ScalarGrid> = BTreeMap::new();
        for (name, grid) in fields {
            let name = name.into();
            if let Some(first) = map.values().next() {
                if !first.same_axes(&grid) {
                    return Err(GridProcessorError::invalid_grid(format!(
                        "field '{}' does not share the latitude/longitude axes of the other fields",
                        name
                    )));
                }
            }
            if map.insert(name.clone(), grid).is_some() {
                return Err(GridProcessorError::invalid_grid(format!(
                    "duplicate field name '{}'",
                    name
                )));
            }
        }
        if map.is_empty() {
            return Err(GridProcessorError::invalid_grid("field set is empty"));
        }
        Ok(Self { fields: map })
    }

    /// A field set holding one field.
    pub fn single(name: impl Into<String>, grid: ScalarGrid) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(name.into(), grid);
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&ScalarGrid> {
        self.fields.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarGrid)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; a field set holds at least one field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The grid every field shares.
    pub fn reference(&self) -> &ScalarGrid {
        // Construction guarantees at least one field.
        self.fields
            .values()
            .next()
            .unwrap_or_else(|| unreachable!("FieldSet is never empty"))
    }

    pub fn latitudes(&self) -> &Axis {
        self.reference().latitudes()
    }

    pub fn longitudes(&self) -> &Axis {
        self.reference().longitudes()
    }

    /// Replace each field with the result of `f`, keeping names.
    pub fn try_map<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&str, &ScalarGrid) -> Result<ScalarGrid>,
    {
        let mapped = self
            .fields
            .iter()
            .map(|(name, grid)| f(name, grid).map(|g| (name.clone(), g)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(mapped)
    }
}
