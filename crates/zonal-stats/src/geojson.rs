//! GeoJSON input and output for regions and aggregation results.
//!
//! Only `Polygon` and `MultiPolygon` geometries are accepted. Coordinates
//! are longitude/latitude degrees; a third (elevation) ordinate is ignored.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::aggregate::AggregationResult;
use crate::error::{Result, ZonalError};
use crate::region::{GeographyKind, Region, RegionSet};

/// A GeoJSON position: `[lon, lat]` or `[lon, lat, z]`.
pub type Position = Vec<f64>;

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// Add multiple features to the collection.
    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features.extend(features);
        self
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// Optional feature identifier (string or number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Null geometries are allowed by GeoJSON but rejected on read.
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Areal GeoJSON geometries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Linear rings; the first is the exterior, the rest are holes.
    Polygon { coordinates: Vec<Vec<Position>> },

    /// Polygons, each a list of linear rings.
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    /// Convert to a geo multipolygon.
    pub fn to_multi_polygon(&self) -> Result<MultiPolygon<f64>> {
        match self {
            Geometry::Polygon { coordinates } => {
                Ok(MultiPolygon::new(vec![polygon_from_rings(coordinates)?]))
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect::<Result<Vec<_>>>()
                .map(MultiPolygon::new),
        }
    }

    /// Convert from a geo multipolygon.
    pub fn from_multi_polygon(geometry: &MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon {
            coordinates: geometry.iter().map(polygon_to_rings).collect(),
        }
    }
}

fn ring_from_positions(positions: &[Position]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            _ => Err(ZonalError::invalid_region(format!(
                "invalid position {:?}: expected finite [lon, lat]",
                p
            ))),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Err(ZonalError::invalid_region("polygon has no rings"));
    };
    let exterior = ring_from_positions(exterior)?;
    let interiors = interiors
        .iter()
        .map(|r| ring_from_positions(r))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring_to_positions(ring: &LineString<f64>) -> Vec<Position> {
    ring.coords().map(|c| vec![c.x, c.y]).collect()
}

fn polygon_to_rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_to_positions)
        .collect()
}

/// Identifier text of a JSON property or feature id.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build a region set from a parsed FeatureCollection.
///
/// The region id comes from the kind's id property, then the feature `id`,
/// then the feature's position in the collection.
pub fn regions_from_collection(
    collection: FeatureCollection,
    kind: GeographyKind,
) -> Result<RegionSet> {
    let id_key = kind.id_property();
    let mut regions = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let region_id = properties
            .get(id_key)
            .and_then(id_text)
            .or_else(|| feature.id.as_ref().and_then(id_text))
            .unwrap_or_else(|| index.to_string());

        let geometry = feature
            .geometry
            .ok_or_else(|| {
                ZonalError::invalid_region(format!("feature '{}' has no geometry", region_id))
            })?
            .to_multi_polygon()?;

        regions.push(Region::new(region_id, geometry).with_attributes(properties));
    }

    RegionSet::new(kind, regions)
}

/// Parse a GeoJSON FeatureCollection string into a region set.
pub fn parse_regions(json: &str, kind: GeographyKind) -> Result<RegionSet> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    regions_from_collection(collection, kind)
}

/// Read a GeoJSON FeatureCollection file into a region set.
pub fn read_regions(path: impl AsRef<Path>, kind: GeographyKind) -> Result<RegionSet> {
    let file = File::open(path.as_ref())?;
    let collection: FeatureCollection = serde_json::from_reader(BufReader::new(file))?;
    let regions = regions_from_collection(collection, kind)?;
    info!(
        path = %path.as_ref().display(),
        geography = %kind,
        regions = regions.len(),
        "Read regions"
    );
    Ok(regions)
}

/// Encode aggregation results as features.
///
/// Each feature carries the original geographic geometry, a `region_id`
/// property and one property per field (null when the value is NaN).
pub fn results_to_collection(results: &[AggregationResult]) -> FeatureCollection {
    let features = results
        .iter()
        .map(|result| {
            let mut properties = Map::new();
            properties.insert(
                "region_id".to_string(),
                Value::String(result.region_id.clone()),
            );
            for (name, value) in &result.values {
                let json = serde_json::Number::from_f64(*value)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                properties.insert(name.clone(), json);
            }
            Feature {
                type_: "Feature".to_string(),
                id: Some(Value::String(result.region_id.clone())),
                geometry: Some(Geometry::from_multi_polygon(&result.geometry)),
                properties: Some(properties),
            }
        })
        .collect();
    FeatureCollection::new().with_features(features)
}

/// Write aggregation results as a GeoJSON FeatureCollection file.
pub fn write_results(path: impl AsRef<Path>, results: &[AggregationResult]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer(BufWriter::new(file), &results_to_collection(results))?;
    info!(path = %path.as_ref().display(), regions = results.len(), "Wrote results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::COUNTY_COLLECTION;

    #[test]
    fn test_parse_county_collection() {
        let set = parse_regions(COUNTY_COLLECTION, GeographyKind::County).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.kind(), GeographyKind::County);

        let east = set.get("20001").unwrap();
        assert_eq!(east.geometry.0.len(), 1);
        assert_eq!(east.attributes.get("NAME"), Some(&Value::from("East")));

        let north = set.get("20003").unwrap();
        assert_eq!(north.geometry.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn test_id_fallbacks() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": 17, "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0,5],[1,0,5],[1,1,5],[0,0,5]]]}}
            ]
        }"#;
        let set = parse_regions(json, GeographyKind::Tract).unwrap();
        let ids: Vec<&str> = set.iter().map(|r| r.region_id.as_str()).collect();
        assert_eq!(ids, vec!["17", "1"]);
    }

    #[test]
    fn test_point_geometry_rejected() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"GEOID": "1"},
             "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]}"#;
        let err = parse_regions(json, GeographyKind::County).unwrap_err();
        assert!(matches!(err, ZonalError::InvalidRegion(_)));
    }

    #[test]
    fn test_missing_geometry_rejected() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"GEOID": "1"}, "geometry": null}
        ]}"#;
        let err = parse_regions(json, GeographyKind::County).unwrap_err();
        assert!(err.to_string().contains("feature '1' has no geometry"));
    }

    #[test]
    fn test_geometry_roundtrip_keeps_holes() {
        let json = r#"{"type": "Polygon", "coordinates": [
            [[0,0],[4,0],[4,4],[0,4],[0,0]],
            [[1,1],[2,1],[2,2],[1,2],[1,1]]
        ]}"#;
        let geometry: Geometry = serde_json::from_str(json).unwrap();
        let multi = geometry.to_multi_polygon().unwrap();
        assert_eq!(multi.0[0].interiors().len(), 1);

        let back = Geometry::from_multi_polygon(&multi);
        assert_eq!(back.to_multi_polygon().unwrap(), multi);
    }
}
