//! Common test fixtures for grids and regions.

use geo::{polygon, MultiPolygon, Polygon};

/// A lon/lat rectangle as a single-part multipolygon.
pub fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![rectangle_polygon(min_lon, min_lat, max_lon, max_lat)])
}

/// A lon/lat rectangle polygon, counter-clockwise exterior.
pub fn rectangle_polygon(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Polygon<f64> {
    polygon![
        (x: min_lon, y: min_lat),
        (x: max_lon, y: min_lat),
        (x: max_lon, y: max_lat),
        (x: min_lon, y: max_lat),
        (x: min_lon, y: min_lat),
    ]
}

/// The 2x2 one-degree grid used by the aggregation scenarios.
///
/// Cell centres at (lat, lon) = (0,0), (0,1), (1,0), (1,1); row 0 is
/// latitude 0, so the values read `[[10, 20], [30, 40]]`.
pub mod two_by_two {
    pub const LATITUDES: [f64; 2] = [0.0, 1.0];
    pub const LONGITUDES: [f64; 2] = [0.0, 1.0];
    pub const VALUES: [f32; 4] = [10.0, 20.0, 30.0, 40.0];

    /// Covers the longitude-1 column exactly.
    pub const RIGHT_HALF: (f64, f64, f64, f64) = (0.5, -0.5, 1.5, 1.5);

    /// Covers the latitude-1 row exactly.
    pub const TOP_HALF: (f64, f64, f64, f64) = (-0.5, 0.5, 1.5, 1.5);

    /// Strictly inside cell (0, 0).
    pub const INSIDE_FIRST_CELL: (f64, f64, f64, f64) = (-0.3, -0.3, 0.2, 0.1);

    /// Far away from the grid.
    pub const DISJOINT: (f64, f64, f64, f64) = (10.0, 10.0, 11.0, 11.0);

    /// Shares only the eastern grid edge.
    pub const TOUCHING_EAST_EDGE: (f64, f64, f64, f64) = (1.5, -0.5, 2.5, 1.5);
}

/// Common bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// A small county-sized box in Kansas
    pub const SMALL_COUNTY: (f64, f64, f64, f64) = (-100.0, 38.0, -99.5, 38.5);
}

/// A two-county GeoJSON FeatureCollection with `GEOID` properties.
///
/// County 20001 covers the longitude-1 column of [`two_by_two`]; county
/// 20003 covers the latitude-1 row and is stored as a MultiPolygon.
pub const COUNTY_COLLECTION: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "GEOID": "20001", "NAME": "East" },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[0.5, -0.5], [1.5, -0.5], [1.5, 1.5], [0.5, 1.5], [0.5, -0.5]]]
      }
    },
    {
      "type": "Feature",
      "properties": { "GEOID": "20003", "NAME": "North" },
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [[[[-0.5, 0.5], [1.5, 0.5], [1.5, 1.5], [-0.5, 1.5], [-0.5, 0.5]]]]
      }
    }
  ]
}"#;

/// A fixed reference day for time-stacked test grids (RFC 3339).
pub const REFERENCE_DAY: &str = "2023-07-01T00:00:00Z";
