//! Shared test utilities for the WBGT workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Grid data generators (axes, value patterns, missing-cell masks)
//! - Region fixtures (rectangles, GeoJSON collections)
//! - Approximate equality assertions
//!
//! It has no dependency on the other workspace crates, so any of them can
//! pull it in as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, create_temperature_grid};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality relative to the magnitude of `right`.
///
/// ```
/// use test_utils::assert_rel_eq;
///
/// assert_rel_eq!(1.0e9 + 1.0, 1.0e9, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_rel_eq {
    ($left:expr, $right:expr, $rel:expr) => {{
        let right: f64 = $right as f64;
        $crate::assert_approx_eq!($left, right, ($rel as f64) * right.abs().max(1.0));
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 0.001);
    }

    #[test]
    fn test_assert_rel_eq_scales_with_magnitude() {
        assert_rel_eq!(2.0e10 + 100.0, 2.0e10, 1e-6);
    }
}
