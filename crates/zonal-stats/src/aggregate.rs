//! Area-weighted zonal aggregation.
//!
//! For every region, each grid cell it touches contributes its value with
//! weight `intersection_area / cell_area`. The region is clipped against
//! the cell in lon/lat and both pieces are measured in the configured
//! equal-area plane. The region's value is the weighted mean
//! `Σ(value · weight) / Σ(weight)`.
//!
//! Cell weights depend only on geometry, so they are computed once per
//! region and reused for every field. Regions whose total weight is zero
//! are left out of the result; [`missing_regions`] recovers their ids.

use std::collections::{BTreeMap, HashSet};

use geo::{Area, BooleanOps, MultiPolygon};
use grid_processor::{collapse_time_max, BoundingBox, FieldSet, ScalarGrid};
use projection::AlbersEqualArea;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cells::GridCells;
use crate::config::AggregatorConfig;
use crate::error::{Result, ZonalError};
use crate::region::{Region, RegionSet};
use crate::reproject::project_multi_polygon;

/// Overlaps at or below this fraction of the smaller of cell and region
/// are numerical slivers along shared edges, not overlap.
pub const MIN_CELL_WEIGHT: f64 = 1e-9;

/// The aggregated values of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub region_id: String,
    /// The region's original lon/lat geometry.
    pub geometry: MultiPolygon<f64>,
    /// Weighted mean per field name.
    pub values: BTreeMap<String, f64>,
    /// Sum of cell weights (in cell-equivalents).
    pub total_weight: f64,
    /// Number of cells with non-zero weight.
    pub cell_count: usize,
}

impl AggregationResult {
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// Fraction of one grid cell lying inside a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellWeight {
    pub row: usize,
    pub col: usize,
    pub weight: f64,
}

/// Area-weighted aggregator over a fixed equal-area projection.
#[derive(Debug, Clone)]
pub struct ZonalAggregator {
    config: AggregatorConfig,
    projection: AlbersEqualArea,
}

impl Default for ZonalAggregator {
    fn default() -> Self {
        let config = AggregatorConfig::default();
        let projection = config.equal_area_crs.projection();
        Self { config, projection }
    }
}

impl ZonalAggregator {
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate().map_err(ZonalError::ConfigError)?;
        let projection = config.equal_area_crs.projection();
        Ok(Self { config, projection })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Aggregate every field over every region.
    ///
    /// Time-stacked fields are first collapsed to their per-cell maximum.
    /// Results follow the input region order; regions with no overlapping
    /// cell weight are omitted.
    pub fn aggregate(
        &self,
        fields: &FieldSet,
        regions: &RegionSet,
    ) -> Result<Vec<AggregationResult>> {
        let collapsed = fields.try_map(|_, grid| collapse_time_max(grid))?;
        let grid = collapsed.reference();
        let grid_bounds = grid.bounds();

        let window = regions
            .iter()
            .filter_map(Region::bounds)
            .filter(|b| b.intersects(&grid_bounds))
            .reduce(|a, b| a.union(&b));
        let Some(window) = window else {
            warn!(
                geography = %regions.kind(),
                regions = regions.len(),
                "No region overlaps the grid; all regions omitted"
            );
            return Ok(Vec::new());
        };

        let cells = self.build_cells(grid, &window);
        let nlon = grid.nlon();
        let columns: Vec<(&str, &[f32])> =
            collapsed.iter().map(|(name, g)| (name, g.values())).collect();

        let evaluate = |region: &Region| -> Option<AggregationResult> {
            let overlaps = region.bounds().is_some_and(|b| b.intersects(&grid_bounds));
            let weights = if overlaps {
                self.weights_in(&cells, region)
            } else {
                Vec::new()
            };
            let total_weight: f64 = weights.iter().map(|w| w.weight).sum();
            if !(total_weight > 0.0) {
                debug!(region_id = %region.region_id, "Region has no overlapping cells; omitted");
                return None;
            }

            let values = columns
                .iter()
                .map(|(name, data)| {
                    let sum: f64 = weights
                        .iter()
                        .map(|w| f64::from(data[w.row * nlon + w.col]) * w.weight)
                        .sum();
                    (name.to_string(), sum / total_weight)
                })
                .collect();

            Some(AggregationResult {
                region_id: region.region_id.clone(),
                geometry: region.geometry.clone(),
                values,
                total_weight,
                cell_count: weights.len(),
            })
        };

        let outputs: Vec<Option<AggregationResult>> = if self.config.parallel {
            regions.regions().par_iter().map(evaluate).collect()
        } else {
            regions.iter().map(evaluate).collect()
        };
        let results: Vec<AggregationResult> = outputs.into_iter().flatten().collect();

        let omitted = regions.len() - results.len();
        if omitted > 0 {
            warn!(
                geography = %regions.kind(),
                omitted,
                "Regions with zero overlapping cell weight were omitted"
            );
        }
        info!(
            geography = %regions.kind(),
            regions = regions.len(),
            results = results.len(),
            cells = cells.len(),
            fields = collapsed.len(),
            crs = %self.config.equal_area_crs,
            "Aggregated fields over regions"
        );

        Ok(results)
    }

    /// Cell weights of one region against the cells of `grid`, in
    /// row-major order.
    pub fn cell_weights(&self, grid: &ScalarGrid, region: &Region) -> Vec<CellWeight> {
        let Some(bounds) = region.bounds() else {
            return Vec::new();
        };
        let cells = self.build_cells(grid, &bounds);
        self.weights_in(&cells, region)
    }

    fn build_cells(&self, grid: &ScalarGrid, window: &BoundingBox) -> GridCells {
        GridCells::build(
            grid,
            window,
            &self.projection,
            self.config.densify_step_deg,
            self.config.parallel,
        )
    }

    fn weights_in(&self, cells: &GridCells, region: &Region) -> Vec<CellWeight> {
        let step = self.config.densify_step_deg;
        let region_area =
            project_multi_polygon(&region.geometry, &self.projection, step).unsigned_area();
        cells
            .candidates(&region.geometry)
            .into_iter()
            .filter_map(|index| {
                let cell = cells.get(index)?;
                let clipped = region.geometry.intersection(&cell.footprint);
                let overlap =
                    project_multi_polygon(&clipped, &self.projection, step).unsigned_area();
                if overlap <= MIN_CELL_WEIGHT * cell.area.min(region_area) {
                    return None;
                }
                Some(CellWeight {
                    row: cell.row,
                    col: cell.col,
                    weight: overlap / cell.area,
                })
            })
            .collect()
    }
}

/// Aggregate with the default configuration.
pub fn aggregate(fields: &FieldSet, regions: &RegionSet) -> Result<Vec<AggregationResult>> {
    ZonalAggregator::default().aggregate(fields, regions)
}

/// Ids of input regions that have no result, in input order.
pub fn missing_regions(regions: &RegionSet, results: &[AggregationResult]) -> Vec<String> {
    let present: HashSet<&str> = results.iter().map(|r| r.region_id.as_str()).collect();
    regions
        .iter()
        .filter(|r| !present.contains(r.region_id.as_str()))
        .map(|r| r.region_id.clone())
        .collect()
}
