//! Equal-area coordinate reference systems used for area weighting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::albers::AlbersEqualArea;
use crate::error::ProjectionError;

/// Well-known US equal-area CRS codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EqualAreaCrs {
    /// NAD83 / Conus Albers
    #[default]
    Epsg5070,
    /// NAD83 / Alaska Albers
    Epsg3338,
    /// Hawaii Albers Equal Area Conic
    Esri102007,
}

impl EqualAreaCrs {
    /// Parse a CRS string.
    ///
    /// Accepts formats like:
    /// - "EPSG:5070"
    /// - "epsg:3338"
    /// - "ESRI:102007"
    pub fn parse(s: &str) -> Result<Self, ProjectionError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:5070" => Ok(EqualAreaCrs::Epsg5070),
            "EPSG:3338" => Ok(EqualAreaCrs::Epsg3338),
            "ESRI:102007" => Ok(EqualAreaCrs::Esri102007),
            _ => Err(ProjectionError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Build the projection for this CRS.
    pub fn projection(&self) -> AlbersEqualArea {
        match self {
            EqualAreaCrs::Epsg5070 => AlbersEqualArea::conus(),
            EqualAreaCrs::Epsg3338 => AlbersEqualArea::alaska(),
            EqualAreaCrs::Esri102007 => AlbersEqualArea::hawaii(),
        }
    }
}

impl FromStr for EqualAreaCrs {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EqualAreaCrs {
    type Error = ProjectionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<EqualAreaCrs> for String {
    fn from(crs: EqualAreaCrs) -> Self {
        crs.to_string()
    }
}

impl fmt::Display for EqualAreaCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            EqualAreaCrs::Epsg5070 => "EPSG:5070",
            EqualAreaCrs::Epsg3338 => "EPSG:3338",
            EqualAreaCrs::Esri102007 => "ESRI:102007",
        };
        write!(f, "{}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(EqualAreaCrs::parse("epsg:5070").unwrap(), EqualAreaCrs::Epsg5070);
        assert_eq!(EqualAreaCrs::parse(" EPSG:3338 ").unwrap(), EqualAreaCrs::Epsg3338);
        assert_eq!("esri:102007".parse::<EqualAreaCrs>().unwrap(), EqualAreaCrs::Esri102007);
    }

    #[test]
    fn test_parse_rejects_non_equal_area() {
        let err = EqualAreaCrs::parse("EPSG:4326").unwrap_err();
        assert_eq!(err, ProjectionError::UnsupportedCrs("EPSG:4326".to_string()));
    }

    #[test]
    fn test_display_roundtrip() {
        for crs in [EqualAreaCrs::Epsg5070, EqualAreaCrs::Epsg3338, EqualAreaCrs::Esri102007] {
            assert_eq!(EqualAreaCrs::parse(&crs.to_string()).unwrap(), crs);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&EqualAreaCrs::Epsg3338).unwrap();
        assert_eq!(json, "\"EPSG:3338\"");
        let back: EqualAreaCrs = serde_json::from_str("\"epsg:5070\"").unwrap();
        assert_eq!(back, EqualAreaCrs::Epsg5070);
    }

    #[test]
    fn test_projection_matches_preset() {
        assert_eq!(EqualAreaCrs::Epsg5070.projection(), AlbersEqualArea::conus());
    }
}
