//! Reads, coerces and validates raw records against a series schema.
//!
//! Runs in two passes. The lenient pass coerces every field of every record,
//! logging each failure and leaving the field unset. The strict pass then
//! rejects the whole series at the first record with an unset field, so a
//! series either comes back complete or not at all.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::coordinate::parse_coordinate_type;
use crate::error::{FieldIssue, PipelineError};
use crate::path::get_path;
use crate::schema::{SchemaMap, SeriesSchema};
use crate::series::{classify, SeriesRequest};
use crate::value_type::{coerce, Value};

/// Axis name to coerced value, holding exactly the bound axes.
pub type TypedRecord = IndexMap<String, Value>;

/// A field that failed to coerce during the lenient pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldWarning {
    pub record: usize,
    pub axis: String,
    pub key: String,
    pub reason: String,
}

impl From<&FieldWarning> for FieldIssue {
    fn from(warning: &FieldWarning) -> Self {
        FieldIssue {
            axis: warning.axis.clone(),
            key: warning.key.clone(),
            reason: warning.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemapOutput {
    pub records: Vec<TypedRecord>,
    pub warnings: Vec<FieldWarning>,
}

/// The records of the raw input, which must be a JSON array.
pub fn input_records(raw: &JsonValue) -> Result<&[JsonValue], PipelineError> {
    match raw {
        JsonValue::Array(rows) => Ok(rows),
        JsonValue::Null => Err(PipelineError::InvalidInputData {
            found: "null".to_string(),
        }),
        JsonValue::Bool(_) => Err(PipelineError::InvalidInputData {
            found: "boolean".to_string(),
        }),
        JsonValue::Number(_) => Err(PipelineError::InvalidInputData {
            found: "number".to_string(),
        }),
        JsonValue::String(_) => Err(PipelineError::InvalidInputData {
            found: "string".to_string(),
        }),
        JsonValue::Object(_) => Err(PipelineError::InvalidInputData {
            found: "object".to_string(),
        }),
    }
}

/// Lenient pass: every field coerced, failures logged and left unset.
fn coerce_rows(
    rows: &[JsonValue],
    schema: &SeriesSchema,
) -> (Vec<IndexMap<String, Option<Value>>>, Vec<FieldWarning>) {
    let mut warnings = Vec::new();
    let staged = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            schema
                .fields
                .iter()
                .map(|(axis, field)| {
                    let key = &field.descriptor.key;
                    let value = match coerce(field.descriptor.ty, get_path(row, key)) {
                        Ok(value) => Some(value),
                        Err(err) => {
                            tracing::warn!(record = index, axis = %axis, key = %key, "{err}");
                            warnings.push(FieldWarning {
                                record: index,
                                axis: axis.clone(),
                                key: key.clone(),
                                reason: err.to_string(),
                            });
                            None
                        }
                    };
                    (axis.clone(), value)
                })
                .collect()
        })
        .collect();
    (staged, warnings)
}

/// Both passes over one series. The warnings are returned whether or not the
/// strict pass succeeds.
pub(crate) fn remap_staged(
    rows: &[JsonValue],
    schema: &SeriesSchema,
) -> (Result<Vec<TypedRecord>, PipelineError>, Vec<FieldWarning>) {
    let (staged, warnings) = coerce_rows(rows, schema);

    let mut records = Vec::with_capacity(staged.len());
    for (index, record) in staged.into_iter().enumerate() {
        let complete: Option<TypedRecord> = record
            .into_iter()
            .map(|(axis, value)| value.map(|value| (axis, value)))
            .collect();
        match complete {
            Some(record) => records.push(record),
            None => {
                let err = PipelineError::InvalidRemapData {
                    record: index,
                    fields: warnings
                        .iter()
                        .filter(|warning| warning.record == index)
                        .map(FieldIssue::from)
                        .collect(),
                };
                return (Err(err), warnings);
            }
        }
    }
    (Ok(records), warnings)
}

/// Remaps `rows` for one series. Fails with [`PipelineError::InvalidRemapData`]
/// naming the first record that has an unset field.
pub fn remap_series(rows: &[JsonValue], schema: &SeriesSchema) -> Result<RemapOutput, PipelineError> {
    let (records, warnings) = remap_staged(rows, schema);
    records.map(|records| RemapOutput { records, warnings })
}

/// Remaps `raw` for a coordinate system by name.
///
/// Checks the system, the input shape and the schema before touching any
/// record. Multi-series schemas concatenate their series in order and fail
/// on the first series that does not remap.
pub fn remap(
    raw: &JsonValue,
    schema: &SchemaMap,
    coordinate_type: &str,
) -> Result<RemapOutput, PipelineError> {
    let ty = parse_coordinate_type(coordinate_type)?;
    let rows = input_records(raw)?;
    match classify(ty, schema)? {
        SeriesRequest::Single(series) => remap_series(rows, &series),
        SeriesRequest::Multi { series, .. } => {
            let mut output = RemapOutput::default();
            for schema in &series {
                let RemapOutput { records, warnings } = remap_series(rows, schema)?;
                output.records.extend(records);
                output.warnings.extend(warnings);
            }
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::CoordinateType;
    use crate::error::Stage;
    use crate::field::FieldDescriptor;
    use crate::value_type::ValueType;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn cartesian() -> SchemaMap {
        SchemaMap::new()
            .with_axis("x", FieldDescriptor::new("a", ValueType::Number))
            .with_axis("y", FieldDescriptor::new("b", ValueType::Number))
    }

    #[test]
    fn test_remap_numbers() {
        let raw = json!([{"a": 1, "b": 2}, {"a": 3, "b": 4, "extra": true}]);
        let output = remap(&raw, &cartesian(), "cartesian").unwrap();

        assert_eq!(output.records.len(), 2);
        assert_eq!(output.records[1]["x"], Value::Number(3.0));
        assert_eq!(output.records[1]["y"], Value::Number(4.0));
        assert_eq!(output.records[1].len(), 2);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_missing_field_fails_whole_series() {
        let raw = json!([{"a": 1, "b": 2}, {"a": 3}]);
        let err = remap(&raw, &cartesian(), "cartesian").unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidRemapData {
                record: 1,
                fields: vec![FieldIssue {
                    axis: "y".to_string(),
                    key: "b".to_string(),
                    reason: "Missing value".to_string(),
                }],
            }
        );
    }

    #[test]
    fn test_stage_order() {
        let err = remap(&json!({"a": 1}), &cartesian(), "mercator").unwrap_err();
        assert_eq!(err.stage(), Stage::InvalidCoordinateType);

        let err = remap(&json!({"a": 1}), &cartesian(), "cartesian").unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidInputData {
                found: "object".to_string()
            }
        );

        let err = remap(&json!([]), &cartesian(), "polar").unwrap_err();
        assert_eq!(err.stage(), Stage::InvalidSchemaConfiguration);
    }

    #[test]
    fn test_nested_paths_and_dates() {
        let schema = SchemaMap::new()
            .with_axis("x", FieldDescriptor::new("meta.day", ValueType::DateOnly))
            .with_axis("y", FieldDescriptor::new("values[0]", ValueType::Number))
            .with_entity(FieldDescriptor::new("meta.group", ValueType::String));
        let raw = json!([{"meta": {"day": "2024-03-01", "group": "g1"}, "values": [7]}]);
        let output = remap(&raw, &schema, "cartesian").unwrap();

        let record = &output.records[0];
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["x", "y", "entity"]);
        assert_eq!(
            record["x"],
            Value::Date(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(record["y"], Value::Number(7.0));
        assert_eq!(record["entity"], Value::String("g1".to_string()));
    }

    #[test]
    fn test_warnings_cover_every_bad_field() {
        let schema = SeriesSchema::resolve(
            CoordinateType::Cartesian,
            &IndexMap::from([
                ("x".to_string(), FieldDescriptor::new("a", ValueType::Number)),
                ("y".to_string(), FieldDescriptor::new("b", ValueType::Number)),
            ]),
            &IndexMap::new(),
            None,
        )
        .unwrap();
        let rows = [json!({"a": "one"}), json!({"a": 2, "b": 2})];
        let (staged, warnings) = coerce_rows(&rows, &schema);

        assert_eq!(staged[0]["x"], None);
        assert_eq!(staged[1]["x"], Some(Value::Number(2.0)));
        assert_eq!(
            warnings.iter().map(|w| w.axis.as_str()).collect::<Vec<_>>(),
            vec!["x", "y"]
        );
    }
}
