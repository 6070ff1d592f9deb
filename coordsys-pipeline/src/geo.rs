//! GeoJSON wrapping of geographic records.

use indexmap::IndexMap;
use serde::Serialize;

use crate::coordinate::ENTITY_AXIS;
use crate::remap::TypedRecord;
use crate::value_type::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        /// `[longitude, latitude]`
        coordinates: [f64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// One point feature per record carrying `name` and, when bound, `entity`.
/// Records without numeric coordinates are skipped.
pub fn to_feature_collection(records: &[TypedRecord]) -> FeatureCollection {
    let features = records
        .iter()
        .filter_map(|record| {
            let latitude = record.get("latitude").and_then(Value::as_f64)?;
            let longitude = record.get("longitude").and_then(Value::as_f64)?;
            let properties = ["name", ENTITY_AXIS]
                .into_iter()
                .filter_map(|key| record.get(key).map(|value| (key.to_string(), value.clone())))
                .collect();
            Some(Feature {
                geometry: Geometry::Point {
                    coordinates: [longitude, latitude],
                },
                properties,
            })
        })
        .collect();
    FeatureCollection { features }
}
