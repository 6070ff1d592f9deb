use itertools::Itertools;
use serde::Serialize;
use strum::{Display, EnumDiscriminants, EnumIter, EnumString, IntoStaticStr};

/// A single field that could not be read or coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub axis: String,
    pub key: String,
    pub reason: String,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.axis, self.key, self.reason)
    }
}

fn axis_suffix(axis: &Option<String>) -> String {
    axis.as_ref()
        .map(|axis| format!(" for axis '{axis}'"))
        .unwrap_or_default()
}

/// Stage-tagged failure of a pipeline run.
///
/// Serializes as `{"stage": "<variant>", "detail": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error, EnumDiscriminants)]
#[serde(tag = "stage", content = "detail")]
#[strum_discriminants(name(Stage))]
#[strum_discriminants(derive(Display, EnumString, EnumIter, IntoStaticStr, Hash, Serialize))]
pub enum PipelineError {
    #[error("Unknown coordinate type '{name}', expected one of: {}", .supported.join(", "))]
    InvalidCoordinateType { name: String, supported: Vec<String> },

    #[error("Expected an array of records, got {found}")]
    InvalidInputData { found: String },

    #[error("Invalid schema configuration{}: {reason}", axis_suffix(.axis))]
    InvalidSchemaConfiguration { axis: Option<String>, reason: String },

    #[error("Record {record} failed validation: {}", .fields.iter().join("; "))]
    InvalidRemapData { record: usize, fields: Vec<FieldIssue> },

    #[error("Invalid series configuration ({}): {reason}", .axes.join(", "))]
    InvalidSeriesConfiguration { axes: Vec<String>, reason: String },

    #[error("Invalid {scale} scale for axis '{axis}': {reason}")]
    InvalidScaleConfiguration {
        axis: String,
        scale: String,
        reason: String,
    },

    #[error("Cannot apply '{operation}' to axis '{axis}': {reason}")]
    InvalidOperation {
        axis: String,
        operation: String,
        reason: String,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        Stage::from(self)
    }

    pub(crate) fn schema(axis: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::InvalidSchemaConfiguration {
            axis: Some(axis.into()),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_stage_and_detail() {
        let err = PipelineError::InvalidRemapData {
            record: 1,
            fields: vec![FieldIssue {
                axis: "y".to_string(),
                key: "b".to_string(),
                reason: "Missing value".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "stage": "InvalidRemapData",
                "detail": {
                    "record": 1,
                    "fields": [{"axis": "y", "key": "b", "reason": "Missing value"}]
                }
            })
        );
        assert_eq!(err.stage(), Stage::InvalidRemapData);
        assert_eq!(
            err.to_string(),
            "Record 1 failed validation: y (b): Missing value"
        );
    }

    #[test]
    fn test_schema_message_names_axis() {
        let err = PipelineError::schema("z", "axis is not part of cartesian");
        assert_eq!(
            err.to_string(),
            "Invalid schema configuration for axis 'z': axis is not part of cartesian"
        );
        assert_eq!(err.stage().to_string(), "InvalidSchemaConfiguration");
    }
}
