//! Region polygons and the geography categories they belong to.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use geo::{BoundingRect, MultiPolygon};
use grid_processor::BoundingBox;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ZonalError};

/// Administrative region categories that can be aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeographyKind {
    County,
    Tract,
}

impl GeographyKind {
    /// Parse a category name (case-insensitive).
    ///
    /// Anything other than "county" or "tract" is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "county" => Ok(GeographyKind::County),
            "tract" => Ok(GeographyKind::Tract),
            _ => Err(ZonalError::UnsupportedGeography(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeographyKind::County => "county",
            GeographyKind::Tract => "tract",
        }
    }

    /// Feature property carrying the region identifier.
    pub fn id_property(&self) -> &'static str {
        "GEOID"
    }
}

impl FromStr for GeographyKind {
    type Err = ZonalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for GeographyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A polygon region in geographic (lon/lat degree) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub region_id: String,
    pub geometry: MultiPolygon<f64>,
    /// Extra feature properties, carried through untouched.
    pub attributes: Map<String, Value>,
}

impl Region {
    pub fn new(region_id: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            region_id: region_id.into(),
            geometry,
            attributes: Map::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Geographic extent, or `None` for an empty geometry.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let rect = self.geometry.bounding_rect()?;
        Some(BoundingBox::new(
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y,
        ))
    }
}

/// Regions of one geography category with unique identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    kind: GeographyKind,
    regions: Vec<Region>,
}

impl RegionSet {
    /// Build a region set, rejecting duplicate identifiers.
    pub fn new(kind: GeographyKind, regions: Vec<Region>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(regions.len());
        for region in &regions {
            if !seen.insert(region.region_id.as_str()) {
                return Err(ZonalError::invalid_region(format!(
                    "duplicate region id '{}'",
                    region.region_id
                )));
            }
        }
        Ok(Self { kind, regions })
    }

    pub fn kind(&self) -> GeographyKind {
        self.kind
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    /// Region with the given identifier.
    pub fn get(&self, region_id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.region_id == region_id)
    }
}
