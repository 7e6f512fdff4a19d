//! Nearest-neighbour regridding onto a different lat/lon grid.
//!
//! Each target point takes the value of the closest source cell centre,
//! chosen independently along each axis. Target points beyond the outermost
//! source cell centres have no neighbour to copy and become missing, which
//! is what leaves the edge ring the gap filler repairs.

use crate::axis::Axis;
use crate::error::Result;
use crate::types::ScalarGrid;

/// Resample `source` onto the given target axes.
///
/// The time index is carried over unchanged.
pub fn regrid_nearest(
    source: &ScalarGrid,
    target_latitudes: &Axis,
    target_longitudes: &Axis,
) -> Result<ScalarGrid> {
    let rows: Vec<Option<usize>> = target_latitudes
        .values()
        .iter()
        .map(|lat| source.latitudes().nearest_index(*lat))
        .collect();
    let cols: Vec<Option<usize>> = target_longitudes
        .values()
        .iter()
        .map(|lon| source.longitudes().nearest_index(*lon))
        .collect();

    let src_width = source.nlon();
    let mut values = Vec::with_capacity(source.ntime() * rows.len() * cols.len());
    for slice in source.slices() {
        for row in &rows {
            for col in &cols {
                let value = match (row, col) {
                    (Some(i), Some(j)) => slice[i * src_width + j],
                    _ => f32::NAN,
                };
                values.push(value);
            }
        }
    }

    ScalarGrid::from_axes(
        target_latitudes.clone(),
        target_longitudes.clone(),
        source.time_index().map(<[_]>::to_vec),
        values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refine_leaves_edge_ring_missing() {
        // 2x2 source with centres at 0 and 1 on both axes.
        let source =
            ScalarGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let target = Axis::regular(-0.5, 0.5, 5).unwrap();

        let out = regrid_nearest(&source, &target, &target).unwrap();
        assert_eq!(out.nlat(), 5);
        assert_eq!(out.nlon(), 5);

        // Outer ring sits outside [0, 1] on at least one axis.
        for k in 0..5 {
            assert!(out.get(0, 0, k).unwrap().is_nan());
            assert!(out.get(0, 4, k).unwrap().is_nan());
            assert!(out.get(0, k, 0).unwrap().is_nan());
            assert!(out.get(0, k, 4).unwrap().is_nan());
        }
        assert_eq!(out.get(0, 1, 1), Some(1.0));
        assert_eq!(out.get(0, 3, 3), Some(4.0));
        assert_eq!(out.get(0, 1, 3), Some(2.0));
        assert_eq!(out.missing_count(), 16);
    }

    #[test]
    fn test_descending_source_latitudes() {
        let source =
            ScalarGrid::new(vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let lats = Axis::new(vec![0.0, 1.0]).unwrap();
        let lons = Axis::new(vec![0.0, 1.0]).unwrap();

        let out = regrid_nearest(&source, &lats, &lons).unwrap();
        assert_eq!(out.values(), &[3.0, 4.0, 1.0, 2.0]);
    }
}
