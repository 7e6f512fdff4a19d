//! Grid cells with their equal-area sizes, indexed by an R-tree.
//!
//! Cells keep their lon/lat footprint so regions can be clipped against
//! them exactly; only the clipped pieces are projected for measuring.

use geo::{coord, Area, BoundingRect, MultiPolygon, Rect};
use grid_processor::{BoundingBox, ScalarGrid};
use projection::AlbersEqualArea;
use rayon::prelude::*;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::reproject::project_multi_polygon;

type CellEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// One grid cell.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Latitude row in the source grid.
    pub row: usize,
    /// Longitude column in the source grid.
    pub col: usize,
    /// Cell rectangle in lon/lat.
    pub footprint: MultiPolygon<f64>,
    /// Projected area, the denominator of every weight for this cell.
    pub area: f64,
}

/// The grid cells overlapping a geographic window, with a spatial index
/// over their lon/lat envelopes.
pub struct GridCells {
    cells: Vec<Cell>,
    tree: RTree<CellEntry>,
}

impl GridCells {
    /// Materialize the cells of `grid` that overlap `window`.
    pub fn build(
        grid: &ScalarGrid,
        window: &BoundingBox,
        proj: &AlbersEqualArea,
        densify_step: f64,
        parallel: bool,
    ) -> Self {
        let rows = grid
            .latitudes()
            .overlapping_range(window.min_lat, window.max_lat);
        let cols = grid
            .longitudes()
            .overlapping_range(window.min_lon, window.max_lon);
        let (Some(rows), Some(cols)) = (rows, cols) else {
            return Self::empty();
        };

        let positions: Vec<(usize, usize)> = rows
            .flat_map(|row| cols.clone().map(move |col| (row, col)))
            .collect();

        let make_cell = |&(row, col): &(usize, usize)| {
            let bounds = grid.cell_bounds(row, col)?;
            let footprint = cell_rect(&bounds);
            let area = project_multi_polygon(&footprint, proj, densify_step).unsigned_area();
            Some(Cell {
                row,
                col,
                footprint,
                area,
            })
        };

        let cells: Vec<Cell> = if parallel {
            positions.par_iter().filter_map(make_cell).collect()
        } else {
            positions.iter().filter_map(make_cell).collect()
        };

        let entries = cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| {
                let rect = cell.footprint.bounding_rect()?;
                Some(CellEntry::new(
                    Rectangle::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    index,
                ))
            })
            .collect();

        Self {
            cells,
            tree: RTree::bulk_load(entries),
        }
    }

    fn empty() -> Self {
        Self {
            cells: Vec::new(),
            tree: RTree::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Indices of cells whose envelope meets the envelope of the lon/lat
    /// `geometry`, in row-major order.
    pub fn candidates(&self, geometry: &MultiPolygon<f64>) -> Vec<usize> {
        let Some(rect) = geometry.bounding_rect() else {
            return Vec::new();
        };
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        hits.sort_unstable();
        hits
    }
}

fn cell_rect(bounds: &BoundingBox) -> MultiPolygon<f64> {
    let rect = Rect::new(
        coord! { x: bounds.min_lon, y: bounds.min_lat },
        coord! { x: bounds.max_lon, y: bounds.max_lat },
    );
    MultiPolygon::new(vec![rect.to_polygon()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{axis_values, rectangle};

    fn grid() -> ScalarGrid {
        ScalarGrid::new(
            axis_values(40.0, -0.25, 20),
            axis_values(-100.0, 0.25, 30),
            vec![0.0; 20 * 30],
        )
        .unwrap()
    }

    #[test]
    fn test_build_limits_cells_to_window() {
        let window = BoundingBox::new(-99.6, 38.9, -99.1, 39.3);
        let cells = GridCells::build(&grid(), &window, &AlbersEqualArea::conus(), 0.05, false);

        // Rows 3..=4 (lat 39.25, 39.0) and columns 2..=4 (lon -99.5..-99.0).
        assert_eq!(cells.len(), 6);
        let first = cells.get(0).unwrap();
        assert_eq!((first.row, first.col), (3, 2));
        assert!(first.area > 5.0e8 && first.area < 7.0e8);
        let rect = first.footprint.bounding_rect().unwrap();
        assert_eq!((rect.min().x, rect.min().y), (-99.625, 39.125));
        assert_eq!((rect.max().x, rect.max().y), (-99.375, 39.375));
    }

    #[test]
    fn test_window_outside_grid_is_empty() {
        let window = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let cells = GridCells::build(&grid(), &window, &AlbersEqualArea::conus(), 0.05, true);
        assert!(cells.is_empty());
        assert!(cells.candidates(&rectangle(0.0, 0.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_candidates_are_sorted_and_local() {
        let grid = grid();
        let proj = AlbersEqualArea::conus();
        let window = BoundingBox::new(-100.2, 35.0, -92.0, 40.2);
        let parallel = GridCells::build(&grid, &window, &proj, 0.05, true);
        let serial = GridCells::build(&grid, &window, &proj, 0.05, false);
        assert_eq!(parallel.len(), 20 * 30);
        assert_eq!(parallel.len(), serial.len());

        // Strictly inside cell (row 4, col 4) at (39.0, -99.0).
        let region = rectangle(-99.05, 38.95, -98.95, 39.05);
        let hits = parallel.candidates(&region);
        assert_eq!(hits.len(), 1);
        assert_eq!(parallel.get(hits[0]).map(|c| (c.row, c.col)), Some((4, 4)));
        assert_eq!(hits, serial.candidates(&region));
    }
}
