// src/geojson.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GeoJSON `Point`: `{ "type": "Point", "coordinates": [longitude, latitude] }`.
///
/// Coordinates are kept as raw JSON values. Nothing is range-checked and a
/// non-numeric coordinate is stored exactly as it was read from the source
/// document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "RawGeometry")]
pub struct GeoJsonPoint {
    #[serde(rename = "type")]
    type_field: String, // Always "Point"
    pub coordinates: [Value; 2],
}

// Wire shape before the geometry type is checked.
#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    type_field: String,
    coordinates: [Value; 2],
}

impl TryFrom<RawGeometry> for GeoJsonPoint {
    type Error = String;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        if raw.type_field != GeoJsonPoint::TYPE {
            return Err(format!(
                "expected GeoJSON type \"{}\", found \"{}\"",
                GeoJsonPoint::TYPE,
                raw.type_field
            ));
        }
        let [longitude, latitude] = raw.coordinates;
        Ok(GeoJsonPoint::from_raw(longitude, latitude))
    }
}

impl GeoJsonPoint {
    pub const TYPE: &'static str = "Point";

    /// Creates a point from numeric longitude and latitude.
    ///
    /// Note the GeoJSON ordering: longitude first.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self::from_raw(Value::from(longitude), Value::from(latitude))
    }

    /// Creates a point from whatever values the source document held.
    pub fn from_raw(longitude: Value, latitude: Value) -> Self {
        GeoJsonPoint {
            type_field: Self::TYPE.to_string(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> &Value {
        &self.coordinates[0]
    }

    pub fn latitude(&self) -> &Value {
        &self.coordinates[1]
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.type_field,
            "coordinates": [self.coordinates[0], self.coordinates[1]],
        })
    }
}
