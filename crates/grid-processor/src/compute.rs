//! Derived wet bulb globe temperature fields.
//!
//! The physical WBGT formula is supplied by the caller through
//! [`WbgtFormula`]; this module only lines the inputs up cell by cell,
//! converts the result to Celsius and reduces it over time.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{GridProcessorError, Result};
use crate::reduce::collapse_time_max;
use crate::types::{is_missing, ScalarGrid};

/// Offset between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;

/// A pointwise WBGT formula.
///
/// Inputs are 2 m air temperature, mean radiant temperature and 2 m dew
/// point (all Kelvin) plus 10 m wind speed (m/s). Returns WBGT in Kelvin.
pub trait WbgtFormula: Sync {
    fn wbgt(&self, t2m: f32, mrt: f32, wind_speed: f32, d2m: f32) -> f32;
}

impl<F> WbgtFormula for F
where
    F: Fn(f32, f32, f32, f32) -> f32 + Sync,
{
    fn wbgt(&self, t2m: f32, mrt: f32, wind_speed: f32, d2m: f32) -> f32 {
        self(t2m, mrt, wind_speed, d2m)
    }
}

/// 10 m wind speed from its u and v components.
pub fn wind_speed(u10: &ScalarGrid, v10: &ScalarGrid) -> Result<ScalarGrid> {
    if !u10.same_shape(v10) {
        return Err(GridProcessorError::invalid_grid(
            "u10 and v10 do not share axes and time index",
        ));
    }
    let speed = u10
        .values()
        .iter()
        .zip(v10.values())
        .map(|(u, v)| (u * u + v * v).sqrt())
        .collect();
    u10.with_values(speed)
}

/// The reanalysis inputs of the WBGT stage, all on one grid.
#[derive(Debug, Clone)]
pub struct ClimateFields {
    pub t2m: ScalarGrid,
    pub d2m: ScalarGrid,
    pub u10: ScalarGrid,
    pub v10: ScalarGrid,
    pub mrt: ScalarGrid,
}

impl ClimateFields {
    /// Bundle the inputs, checking they share axes and time index.
    pub fn new(
        t2m: ScalarGrid,
        d2m: ScalarGrid,
        u10: ScalarGrid,
        v10: ScalarGrid,
        mrt: ScalarGrid,
    ) -> Result<Self> {
        for (name, grid) in [("d2m", &d2m), ("u10", &u10), ("v10", &v10), ("mrt", &mrt)] {
            if !t2m.same_shape(grid) {
                return Err(GridProcessorError::invalid_grid(format!(
                    "{} does not share the axes and time index of t2m",
                    name
                )));
            }
        }
        Ok(Self {
            t2m,
            d2m,
            u10,
            v10,
            mrt,
        })
    }
}

/// Daily WBGT and its maximum over time, both in degrees Celsius.
#[derive(Debug, Clone)]
pub struct WbgtFields {
    pub daily: ScalarGrid,
    pub max: ScalarGrid,
}

/// Evaluate `formula` for every cell and time step.
///
/// A cell with any missing input is missing in the output.
pub fn compute_daily_and_max_wbgt<F: WbgtFormula>(
    fields: &ClimateFields,
    formula: &F,
) -> Result<WbgtFields> {
    let speed = wind_speed(&fields.u10, &fields.v10)?;
    let t2m = fields.t2m.values();
    let mrt = fields.mrt.values();
    let d2m = fields.d2m.values();
    let ws = speed.values();

    let width = fields.t2m.nlon();
    let mut daily = vec![f32::NAN; t2m.len()];
    daily
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            let base = row * width;
            for (k, cell) in out.iter_mut().enumerate() {
                let idx = base + k;
                let inputs = [t2m[idx], mrt[idx], ws[idx], d2m[idx]];
                if inputs.iter().any(|v| is_missing(*v)) {
                    continue;
                }
                *cell = formula.wbgt(inputs[0], inputs[1], inputs[2], inputs[3]) - KELVIN_OFFSET;
            }
        });

    let daily = fields.t2m.with_values(daily)?;
    let max = collapse_time_max(&daily)?;

    debug!(
        slices = daily.ntime(),
        cells = daily.slice_len(),
        "Computed daily and maximum WBGT"
    );

    Ok(WbgtFields { daily, max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn stacked(values: Vec<f32>) -> ScalarGrid {
        let start = Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap();
        let times = vec![start, start + Duration::days(1)];
        ScalarGrid::with_time(vec![0.0, 1.0], vec![0.0, 1.0], times, values).unwrap()
    }

    #[test]
    fn test_wind_speed() {
        let u = ScalarGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![3.0, 0.0, -6.0, 1.0]).unwrap();
        let v = ScalarGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![4.0, 2.0, 8.0, 0.0]).unwrap();
        assert_eq!(wind_speed(&u, &v).unwrap().values(), &[5.0, 2.0, 10.0, 1.0]);
    }

    #[test]
    fn test_daily_and_max() {
        let t2m = stacked(vec![300.0, 301.0, 302.0, 303.0, 305.0, 299.0, 302.0, f32::NAN]);
        let zeros = stacked(vec![0.0; 8]);
        let fields = ClimateFields::new(
            t2m,
            zeros.clone(),
            zeros.clone(),
            zeros.clone(),
            zeros,
        )
        .unwrap();

        // Formula echoing air temperature.
        let result = compute_daily_and_max_wbgt(&fields, &|t: f32, _m: f32, _w: f32, _d: f32| t)
            .unwrap();

        assert_eq!(result.daily.ntime(), 2);
        assert!((result.daily.get(0, 0, 0).unwrap() - 26.85).abs() < 1e-3);
        assert!(result.daily.get(1, 1, 1).unwrap().is_nan());

        assert!(!result.max.has_time());
        assert!((result.max.get(0, 0, 0).unwrap() - 31.85).abs() < 1e-3);
        assert!((result.max.get(0, 0, 1).unwrap() - 27.85).abs() < 1e-3);
        assert!((result.max.get(0, 1, 1).unwrap() - 29.85).abs() < 1e-3);
    }

    #[test]
    fn test_mismatched_inputs_rejected() {
        let a = stacked(vec![0.0; 8]);
        let b = ScalarGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0; 4]).unwrap();
        let err = ClimateFields::new(a.clone(), b, a.clone(), a.clone(), a).unwrap_err();
        assert!(err.to_string().contains("d2m"));
    }
}
