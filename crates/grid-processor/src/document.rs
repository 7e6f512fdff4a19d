//! JSON interchange format for field sets.
//!
//! ```json
//! {
//!   "latitudes": [40.0, 39.75],
//!   "longitudes": [-100.0, -99.75],
//!   "time_index": ["2023-07-01T00:00:00Z"],
//!   "fields": { "wbgt": [30.1, null, 29.4, 28.0] }
//! }
//! ```
//!
//! Values are flat and row-major. A field whose length is
//! `time x lat x lon` is time-stacked; one whose length is `lat x lon` is
//! a plain 2D field. Missing cells are `null`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::axis::Axis;
use crate::config::GridProcessorConfig;
use crate::error::{GridProcessorError, Result};
use crate::types::{FieldSet, ScalarGrid};

/// Serialized form of a [`FieldSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_index: Option<Vec<DateTime<Utc>>>,
    pub fields: BTreeMap<String, Vec<Option<f32>>>,
}

impl GridDocument {
    /// Decode into a validated field set.
    pub fn into_field_set(self, config: &GridProcessorConfig) -> Result<FieldSet> {
        let latitudes = Axis::with_tolerance(self.latitudes, config.spacing_tolerance)?;
        let longitudes = Axis::with_tolerance(self.longitudes, config.spacing_tolerance)?;
        let slice_len = latitudes.len() * longitudes.len();
        let stacked_len = self.time_index.as_ref().map(|t| t.len() * slice_len);

        let mut grids = Vec::with_capacity(self.fields.len());
        for (name, raw) in self.fields {
            let time_index = if Some(raw.len()) == stacked_len {
                self.time_index.clone()
            } else if raw.len() == slice_len {
                None
            } else {
                return Err(GridProcessorError::invalid_grid(format!(
                    "field '{}' has {} values, expected {}{}",
                    name,
                    raw.len(),
                    slice_len,
                    stacked_len
                        .map(|n| format!(" or {}", n))
                        .unwrap_or_default()
                )));
            };
            let values = raw.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect();
            let mut grid =
                ScalarGrid::from_axes(latitudes.clone(), longitudes.clone(), time_index, values)?;
            if let Some(sentinel) = config.missing_value {
                grid = grid.mask_value(sentinel);
            }
            grids.push((name, grid));
        }

        FieldSet::new(grids)
    }

    /// Encode a field set.
    ///
    /// All time-stacked fields must share one time index.
    pub fn from_field_set(fields: &FieldSet) -> Result<Self> {
        let mut time_index: Option<Vec<DateTime<Utc>>> = None;
        let mut encoded = BTreeMap::new();

        for (name, grid) in fields.iter() {
            if let Some(times) = grid.time_index() {
                match &time_index {
                    Some(existing) if existing.as_slice() != times => {
                        return Err(GridProcessorError::Document(format!(
                            "field '{}' has a different time index from the other fields",
                            name
                        )));
                    }
                    Some(_) => {}
                    None => time_index = Some(times.to_vec()),
                }
            }
            let values = grid
                .values()
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect();
            encoded.insert(name.to_string(), values);
        }

        Ok(Self {
            latitudes: fields.latitudes().values().to_vec(),
            longitudes: fields.longitudes().values().to_vec(),
            time_index,
            fields: encoded,
        })
    }

    /// Read a document from a JSON file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let doc: Self = serde_json::from_reader(BufReader::new(file))?;
        info!(
            path = %path.as_ref().display(),
            fields = doc.fields.len(),
            rows = doc.latitudes.len(),
            cols = doc.longitudes.len(),
            "Read grid document"
        );
        Ok(doc)
    }

    /// Write the document as JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        info!(path = %path.as_ref().display(), fields = self.fields.len(), "Wrote grid document");
        Ok(())
    }
}

/// Read a field set from a JSON grid document.
pub fn read_field_set(path: impl AsRef<Path>, config: &GridProcessorConfig) -> Result<FieldSet> {
    GridDocument::read(path)?.into_field_set(config)
}

/// Write a field set as a JSON grid document.
pub fn write_field_set(path: impl AsRef<Path>, fields: &FieldSet) -> Result<()> {
    GridDocument::from_field_set(fields)?.write(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "latitudes": [1.0, 0.0],
        "longitudes": [0.0, 1.0],
        "time_index": ["2023-07-01T00:00:00Z", "2023-07-02T00:00:00Z"],
        "fields": {
            "mrt": [1.0, null, 3.0, 4.0],
            "t2m": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        }
    }"#;

    #[test]
    fn test_decode_mixed_fields() {
        let doc: GridDocument = serde_json::from_str(DOC).unwrap();
        let set = doc.into_field_set(&GridProcessorConfig::default()).unwrap();

        let mrt = set.get("mrt").unwrap();
        assert!(!mrt.has_time());
        assert!(mrt.get(0, 0, 1).unwrap().is_nan());

        let t2m = set.get("t2m").unwrap();
        assert_eq!(t2m.ntime(), 2);
        assert_eq!(t2m.get(1, 0, 0), Some(5.0));
        assert!(!set.latitudes().is_ascending());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let doc = GridDocument {
            latitudes: vec![0.0, 1.0],
            longitudes: vec![0.0, 1.0],
            time_index: None,
            fields: BTreeMap::from([("x".to_string(), vec![Some(1.0); 5])]),
        };
        let err = doc.into_field_set(&GridProcessorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("field 'x' has 5 values"));
    }

    #[test]
    fn test_sentinel_masked_on_decode() {
        let doc = GridDocument {
            latitudes: vec![0.0, 1.0],
            longitudes: vec![0.0, 1.0],
            time_index: None,
            fields: BTreeMap::from([(
                "x".to_string(),
                vec![Some(1.0), Some(-9999.0), Some(3.0), None],
            )]),
        };
        let config = GridProcessorConfig {
            missing_value: Some(-9999.0),
            ..Default::default()
        };
        let set = doc.into_field_set(&config).unwrap();
        assert_eq!(set.get("x").unwrap().missing_count(), 2);
    }

    #[test]
    fn test_encode_writes_nulls() {
        let doc: GridDocument = serde_json::from_str(DOC).unwrap();
        let set = doc.clone().into_field_set(&GridProcessorConfig::default()).unwrap();
        let encoded = GridDocument::from_field_set(&set).unwrap();
        assert_eq!(encoded, doc);

        let json = serde_json::to_string(&encoded).unwrap();
        assert!(json.contains("null"));
    }
}
