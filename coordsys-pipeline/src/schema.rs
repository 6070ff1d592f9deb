//! Schema maps as supplied by callers, and their validated per-series form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::calculations::{validate_operations, Operation};
use crate::coordinate::{AxisRole, CoordinateType, ENTITY_AXIS};
use crate::error::PipelineError;
use crate::field::{FieldDescriptor, RangeOverride};

/// One axis of a schema map: a single field, or one field per series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisBinding {
    Single(FieldDescriptor),
    Multi(Vec<FieldDescriptor>),
}

impl AxisBinding {
    pub fn is_multi(&self) -> bool {
        matches!(self, AxisBinding::Multi(_))
    }
}

impl From<FieldDescriptor> for AxisBinding {
    fn from(descriptor: FieldDescriptor) -> Self {
        AxisBinding::Single(descriptor)
    }
}

impl From<Vec<FieldDescriptor>> for AxisBinding {
    fn from(descriptors: Vec<FieldDescriptor>) -> Self {
        AxisBinding::Multi(descriptors)
    }
}

/// Caller-facing mapping from axis names to field descriptors.
///
/// In JSON the axes sit at the top level next to the optional `entity` and
/// `operations` keys:
///
/// ```json
/// {"x": {"key": "a", "type": "number"}, "y": [{"key": "b", "type": "number"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaMap {
    #[serde(flatten)]
    pub axes: IndexMap<String, AxisBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub operations: IndexMap<String, Operation>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a schema map, reporting malformed input as a schema error.
    pub fn from_json(value: &JsonValue) -> Result<Self, PipelineError> {
        serde_json::from_value(value.clone()).map_err(|err| {
            PipelineError::InvalidSchemaConfiguration {
                axis: None,
                reason: err.to_string(),
            }
        })
    }

    pub fn with_axis(mut self, axis: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.axes.insert(axis.into(), AxisBinding::Single(descriptor));
        self
    }

    pub fn with_series(mut self, axis: impl Into<String>, descriptors: Vec<FieldDescriptor>) -> Self {
        self.axes.insert(axis.into(), AxisBinding::Multi(descriptors));
        self
    }

    pub fn with_entity(mut self, descriptor: FieldDescriptor) -> Self {
        self.entity = Some(descriptor);
        self
    }

    pub fn with_operation(mut self, axis: impl Into<String>, operation: Operation) -> Self {
        self.operations.insert(axis.into(), operation);
        self
    }

    /// Names of the axes bound to more than one descriptor
    pub fn multi_axes(&self) -> Vec<String> {
        self.axes
            .iter()
            .filter(|(_, binding)| binding.is_multi())
            .map(|(axis, _)| axis.clone())
            .collect()
    }
}

/// A descriptor checked against its axis in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    pub descriptor: FieldDescriptor,
    pub role: AxisRole,
    pub inverted: bool,
    pub range: RangeOverride,
}

impl BoundField {
    /// Axis receives an extent and a scale
    pub fn is_measured(&self) -> bool {
        self.role == AxisRole::Coordinate
    }
}

/// Validated bindings for one series, in registry axis order with `entity`
/// last.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSchema {
    pub coordinate_type: CoordinateType,
    pub label: Option<String>,
    pub fields: IndexMap<String, BoundField>,
    pub operations: IndexMap<String, Operation>,
}

impl SeriesSchema {
    /// Checks `bindings` against the axes of `coordinate_type`.
    ///
    /// Rejects unknown axes, empty keys, value types the axis does not
    /// accept, missing required axes, range bounds that do not coerce, and
    /// operations that do not fit their axis.
    pub fn resolve(
        coordinate_type: CoordinateType,
        bindings: &IndexMap<String, FieldDescriptor>,
        operations: &IndexMap<String, Operation>,
        label: Option<String>,
    ) -> Result<Self, PipelineError> {
        let mut bound = IndexMap::with_capacity(bindings.len());
        for (axis, descriptor) in bindings {
            let spec = coordinate_type.axis(axis).ok_or_else(|| {
                PipelineError::schema(
                    axis.as_str(),
                    format!("axis is not part of the {coordinate_type} system"),
                )
            })?;
            if descriptor.key.trim().is_empty() {
                return Err(PipelineError::schema(axis.as_str(), "field key is empty"));
            }
            if let Some(kind) = descriptor.ty.kind() {
                if !spec.accepts.contains(&kind) {
                    return Err(PipelineError::schema(
                        axis.as_str(),
                        format!("{} fields are not accepted", descriptor.ty),
                    ));
                }
            }
            let range = descriptor.range_override().map_err(|err| {
                PipelineError::schema(axis.as_str(), format!("invalid range bound: {err}"))
            })?;
            bound.insert(
                axis.clone(),
                BoundField {
                    descriptor: descriptor.clone(),
                    role: spec.role,
                    inverted: spec.inverted,
                    range,
                },
            );
        }

        if let Some(missing) = coordinate_type
            .axes()
            .iter()
            .find(|spec| spec.required && !bound.contains_key(spec.name))
        {
            return Err(PipelineError::schema(missing.name, "required axis is missing"));
        }

        // registry order, entity last
        let mut fields = IndexMap::with_capacity(bound.len());
        let order = coordinate_type
            .axes()
            .iter()
            .map(|spec| spec.name)
            .chain(std::iter::once(ENTITY_AXIS));
        for name in order {
            if let Some((axis, field)) = bound.shift_remove_entry(name) {
                fields.insert(axis, field);
            }
        }

        validate_operations(operations, &fields)?;

        Ok(Self {
            coordinate_type,
            label,
            fields,
            operations: operations.clone(),
        })
    }

    /// Bound axes that receive an extent and a scale
    pub fn measured(&self) -> impl Iterator<Item = (&String, &BoundField)> {
        self.fields.iter().filter(|(_, field)| field.is_measured())
    }

    pub fn entity(&self) -> Option<&BoundField> {
        self.fields.get(ENTITY_AXIS)
    }

    /// Descriptors with their effective scale written out, excluding `entity`
    pub fn output_descriptors(&self) -> IndexMap<String, FieldDescriptor> {
        self.fields
            .iter()
            .filter(|(axis, _)| axis.as_str() != ENTITY_AXIS)
            .map(|(axis, field)| (axis.clone(), field.descriptor.resolved()))
            .collect()
    }

    /// Descriptors as bound, `entity` included
    pub fn descriptors(&self) -> IndexMap<String, FieldDescriptor> {
        self.fields
            .iter()
            .map(|(axis, field)| (axis.clone(), field.descriptor.clone()))
            .collect()
    }
}
