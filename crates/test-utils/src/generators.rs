//! Test data generators for synthetic reanalysis-like grids.
//!
//! All grids are `Vec<f32>` in row-major order (row 0 first), matching the
//! `[lat][lon]` layout used across the workspace.

/// Evenly spaced axis coordinates.
///
/// ```
/// use test_utils::axis_values;
///
/// assert_eq!(axis_values(40.0, -0.25, 3), vec![40.0, 39.75, 39.5]);
/// ```
pub fn axis_values(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|k| start + step * k as f64).collect()
}

/// Creates a test grid with predictable values.
///
/// Each cell value is `col * 1000 + row`, so a value read back identifies
/// exactly which cell it came from.
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid with temperature-like values in Kelvin.
///
/// Values run from 290K at the first cell to about 320K at the last,
/// a gradient across both axes.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(290.0 + x_factor * 15.0 + y_factor * 15.0);
        }
    }
    data
}

/// Creates a U-component (west-east) wind grid in m/s, varying by row.
pub fn create_u_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let lat_factor = (row as f32 / height.max(1) as f32 - 0.5) * 2.0;
        data.extend(std::iter::repeat(lat_factor * 8.0).take(width));
    }
    data
}

/// Creates a V-component (south-north) wind grid in m/s, varying by column.
pub fn create_v_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let lon_factor = (col as f32 / width.max(1) as f32 - 0.5) * 2.0;
            data.push(lon_factor * 6.0);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid with NaN values at the given (col, row) positions and
/// zeros elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Sets every cell within `ring` cells of the grid edge to NaN.
///
/// This is the pattern nearest-neighbour regridding leaves behind when a
/// coarse field is resampled onto a finer grid with a wider extent.
pub fn mask_edge_ring(data: &mut [f32], width: usize, height: usize, ring: usize) {
    for row in 0..height {
        for col in 0..width {
            let edge = row < ring || col < ring || row + ring >= height || col + ring >= width;
            if edge {
                data[row * width + col] = f32::NAN;
            }
        }
    }
}

/// Sets roughly `percent`% of cells to NaN, deterministically from `seed`.
pub fn mask_scattered(data: &mut [f32], width: usize, percent: u32, seed: u32) {
    for (idx, value) in data.iter_mut().enumerate() {
        let hash = simple_hash((idx % width) as u32, (idx / width) as u32, seed);
        if hash % 100 < percent {
            *value = f32::NAN;
        }
    }
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
