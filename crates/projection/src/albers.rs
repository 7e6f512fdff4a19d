//! Albers Equal-Area Conic projection.
//!
//! This is the projection behind the national US equal-area grids
//! (EPSG:5070 for CONUS, EPSG:3338 for Alaska). It maps a cone secant to the
//! ellipsoid onto a flat plane such that every region keeps its true surface
//! area, which makes it the natural plane for area-weighted statistics.
//!
//! The projection parameters include:
//! - Latitude of origin (lat0)
//! - Central meridian (lon0)
//! - Standard parallels: lat1 and lat2 (can be equal for a tangent cone)
//!
//! Formulas follow Snyder, *Map Projections: A Working Manual* (USGS PP 1395),
//! equations 14-1 through 14-21, on the GRS80 ellipsoid.

use std::f64::consts::PI;

use crate::error::{ProjectionError, Result};

/// GRS80 semi-major axis (meters).
pub const GRS80_SEMI_MAJOR: f64 = 6_378_137.0;

/// GRS80 inverse flattening.
pub const GRS80_INVERSE_FLATTENING: f64 = 298.257_222_101;

const MAX_INVERSE_ITERATIONS: usize = 25;
const INVERSE_TOLERANCE: f64 = 1e-12;

/// Albers Equal-Area Conic projection parameters.
///
/// Converts between geographic (lon/lat in degrees) and planar (x, y in
/// meters) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbersEqualArea {
    /// Latitude of origin in radians
    pub lat0: f64,
    /// Central meridian in radians
    pub lon0: f64,
    /// First standard parallel in radians
    pub lat1: f64,
    /// Second standard parallel in radians
    pub lat2: f64,
    /// Ellipsoid semi-major axis (meters)
    pub semi_major: f64,
    /// First eccentricity
    e: f64,
    /// Cone constant (n)
    n: f64,
    /// C constant
    c: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl AlbersEqualArea {
    /// Create a new projection on the GRS80 ellipsoid.
    ///
    /// # Arguments
    /// * `lat0_deg` - Latitude of origin (degrees)
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `lat1_deg` - First standard parallel (degrees)
    /// * `lat2_deg` - Second standard parallel (degrees)
    pub fn new(lat0_deg: f64, lon0_deg: f64, lat1_deg: f64, lat2_deg: f64) -> Result<Self> {
        Self::with_ellipsoid(
            lat0_deg,
            lon0_deg,
            lat1_deg,
            lat2_deg,
            GRS80_SEMI_MAJOR,
            GRS80_INVERSE_FLATTENING,
        )
    }

    /// Create a new projection on an arbitrary ellipsoid.
    pub fn with_ellipsoid(
        lat0_deg: f64,
        lon0_deg: f64,
        lat1_deg: f64,
        lat2_deg: f64,
        semi_major: f64,
        inverse_flattening: f64,
    ) -> Result<Self> {
        for (name, lat) in [("lat0", lat0_deg), ("lat1", lat1_deg), ("lat2", lat2_deg)] {
            if !lat.is_finite() || lat.abs() >= 90.0 {
                return Err(ProjectionError::invalid_parameters(format!(
                    "{} must be strictly between -90 and 90, got {}",
                    name, lat
                )));
            }
        }
        if !(semi_major > 0.0) || !(inverse_flattening > 1.0) {
            return Err(ProjectionError::invalid_parameters(
                "ellipsoid axis and flattening must be positive",
            ));
        }

        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();

        let f = 1.0 / inverse_flattening;
        let e = (2.0 * f - f * f).sqrt();

        let m1 = m(lat1, e);
        let m2 = m(lat2, e);
        let q0 = q(lat0, e);
        let q1 = q(lat1, e);
        let q2 = q(lat2, e);

        // Compute cone constant n
        let n = if (lat1 - lat2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            lat1.sin()
        } else {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        };

        if n.abs() < 1e-10 {
            return Err(ProjectionError::invalid_parameters(
                "standard parallels are symmetric about the equator (cone constant is zero)",
            ));
        }

        let c = m1 * m1 + n * q1;
        let rho0 = semi_major * (c - n * q0).max(0.0).sqrt() / n;

        Ok(Self {
            lat0,
            lon0,
            lat1,
            lat2,
            semi_major,
            e,
            n,
            c,
            rho0,
        })
    }

    /// CONUS Albers (EPSG:5070): origin 23°N 96°W, parallels 29.5°N and 45.5°N.
    pub fn conus() -> Self {
        Self::preset(23.0, -96.0, 29.5, 45.5)
    }

    /// Alaska Albers (EPSG:3338): origin 50°N 154°W, parallels 55°N and 65°N.
    pub fn alaska() -> Self {
        Self::preset(50.0, -154.0, 55.0, 65.0)
    }

    /// Hawaii Albers (ESRI:102007): origin 13°N 157°W, parallels 8°N and 18°N.
    pub fn hawaii() -> Self {
        Self::preset(13.0, -157.0, 8.0, 18.0)
    }

    fn preset(lat0: f64, lon0: f64, lat1: f64, lat2: f64) -> Self {
        match Self::new(lat0, lon0, lat1, lat2) {
            Ok(proj) => proj,
            // Preset parameters are constants known to be valid.
            Err(e) => unreachable!("invalid Albers preset: {}", e),
        }
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Project geographic coordinates (degrees) to planar meters.
    ///
    /// Returns (x, y) relative to the projection origin.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.rho(q(lat, self.e));
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        (x, y)
    }

    /// Convert planar meters back to geographic coordinates.
    ///
    /// Returns (lon, lat) in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let dy = self.rho0 - y;
        let mut rho = (x * x + dy * dy).sqrt();
        let theta = if self.n < 0.0 {
            rho = -rho;
            (-x).atan2(-dy)
        } else {
            x.atan2(dy)
        };

        let a = self.semi_major;
        let q_val = (self.c - rho * rho * self.n * self.n / (a * a)) / self.n;
        let lat = self.latitude_from_q(q_val);
        let lon = self.lon0 + theta / self.n;

        (lon.to_degrees(), lat.to_degrees())
    }

    /// Area of the ellipsoidal quadrangle bounded by two parallels and a
    /// longitude span, in square meters.
    ///
    /// Equal-area projection means a projected cell with curved parallel
    /// edges has exactly this area.
    pub fn quadrangle_area(&self, lat_south_deg: f64, lat_north_deg: f64, dlon_deg: f64) -> f64 {
        let qs = q(lat_south_deg.to_radians(), self.e);
        let qn = q(lat_north_deg.to_radians(), self.e);
        0.5 * self.semi_major * self.semi_major * dlon_deg.to_radians().abs() * (qn - qs).abs()
    }

    fn rho(&self, q_val: f64) -> f64 {
        self.semi_major * (self.c - self.n * q_val).max(0.0).sqrt() / self.n
    }

    fn latitude_from_q(&self, q_val: f64) -> f64 {
        let e = self.e;
        let e2 = e * e;

        // q at the poles; beyond this the iteration has no solution
        let q_pole = 1.0 - (1.0 - e2) / (2.0 * e) * ((1.0 - e) / (1.0 + e)).ln();
        if q_val.abs() >= q_pole - 1e-15 {
            return (PI / 2.0).copysign(q_val);
        }

        let mut lat = (q_val / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..MAX_INVERSE_ITERATIONS {
            let sin_lat = lat.sin();
            let cos_lat = lat.cos();
            let esin = e * sin_lat;
            let one_minus = 1.0 - esin * esin;

            let delta = one_minus * one_minus / (2.0 * cos_lat)
                * (q_val / (1.0 - e2) - sin_lat / one_minus
                    + 1.0 / (2.0 * e) * ((1.0 - esin) / (1.0 + esin)).ln());
            lat += delta;

            if delta.abs() < INVERSE_TOLERANCE {
                break;
            }
        }
        lat
    }
}

/// Snyder eq. 14-15.
fn m(lat: f64, e: f64) -> f64 {
    let esin = e * lat.sin();
    lat.cos() / (1.0 - esin * esin).sqrt()
}

/// Snyder eq. 3-12 (authalic q).
fn q(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    let esin = e * sin_lat;
    (1.0 - e * e)
        * (sin_lat / (1.0 - esin * esin)
            - 1.0 / (2.0 * e) * ((1.0 - esin) / (1.0 + esin)).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_zero() {
        let proj = AlbersEqualArea::conus();
        let (x, y) = proj.forward(-96.0, 23.0);
        assert!(x.abs() < 1e-6, "x should be ~0, got {}", x);
        assert!(y.abs() < 1e-6, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_snyder_worked_example() {
        // Snyder p. 292: Clarke 1866, parallels 29.5/45.5, origin 23N 96W,
        // point 35N 75W -> x = 1,885,472.7 m, y = 1,535,925.0 m, n = 0.6029035
        let proj =
            AlbersEqualArea::with_ellipsoid(23.0, -96.0, 29.5, 45.5, 6_378_206.4, 294.978_698_2)
                .unwrap();
        assert!((proj.cone_constant() - 0.602_903_5).abs() < 1e-7);

        let (x, y) = proj.forward(-75.0, 35.0);
        assert!((x - 1_885_472.7).abs() < 0.1, "x = {}", x);
        assert!((y - 1_535_925.0).abs() < 0.1, "y = {}", y);
    }

    #[test]
    fn test_conus_point_is_west_and_north_of_origin() {
        let proj = AlbersEqualArea::conus();
        let (x, y) = proj.forward(-100.0, 40.0);
        assert!((x - -338_390.6).abs() < 1.0, "x = {}", x);
        assert!((y - 1_894_100.1).abs() < 1.0, "y = {}", y);
    }

    #[test]
    fn test_roundtrip() {
        for proj in [
            AlbersEqualArea::conus(),
            AlbersEqualArea::alaska(),
            AlbersEqualArea::hawaii(),
        ] {
            for &(lon, lat) in &[(-77.0, 39.0), (-122.4, 47.6), (-150.0, 61.2), (-157.8, 21.3)] {
                let (x, y) = proj.forward(lon, lat);
                let (rlon, rlat) = proj.inverse(x, y);
                assert!((rlon - lon).abs() < 1e-8, "lon roundtrip failed: {} vs {}", lon, rlon);
                assert!((rlat - lat).abs() < 1e-8, "lat roundtrip failed: {} vs {}", lat, rlat);
            }
        }
    }

    #[test]
    fn test_projected_sector_matches_ellipsoidal_area() {
        let proj = AlbersEqualArea::conus();

        // Along the central meridian x == 0, so rho = rho0 - y.
        let (_, y_south) = proj.forward(-96.0, 38.0);
        let (_, y_north) = proj.forward(-96.0, 39.0);
        let rho_south = proj.rho0 - y_south;
        let rho_north = proj.rho0 - y_north;

        let dlon = 1.0_f64.to_radians();
        let sector = 0.5 * proj.cone_constant() * dlon * (rho_south.powi(2) - rho_north.powi(2));
        let expected = proj.quadrangle_area(38.0, 39.0, 1.0);

        assert!(
            ((sector - expected) / expected).abs() < 1e-9,
            "sector {} vs ellipsoid {}",
            sector,
            expected
        );
    }

    #[test]
    fn test_quadrangle_area_is_plausible() {
        // A 1x1 degree cell near 39N is roughly 111km * 86km
        let proj = AlbersEqualArea::conus();
        let area = proj.quadrangle_area(38.5, 39.5, 1.0);
        assert!(area > 9.3e9 && area < 9.9e9, "area = {}", area);
    }

    #[test]
    fn test_symmetric_parallels_rejected() {
        let err = AlbersEqualArea::new(0.0, 0.0, -30.0, 30.0).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameters(_)));
    }

    #[test]
    fn test_polar_latitude_rejected() {
        assert!(AlbersEqualArea::new(90.0, 0.0, 30.0, 60.0).is_err());
    }
}
