//! Single- versus multi-series requests.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use crate::coordinate::{CoordinateType, ENTITY_AXIS};
use crate::error::PipelineError;
use crate::extent::Extent;
use crate::field::FieldDescriptor;
use crate::schema::{AxisBinding, SchemaMap, SeriesSchema};

/// The shape of a pipeline run. `Multi` remaps the same raw records once per
/// series, each series binding its own field to `varying_axis`.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesRequest {
    Single(SeriesSchema),
    Multi {
        varying_axis: String,
        series: Vec<SeriesSchema>,
    },
}

impl SeriesRequest {
    pub fn coordinate_type(&self) -> Option<CoordinateType> {
        self.series().first().map(|series| series.coordinate_type)
    }

    pub fn series(&self) -> &[SeriesSchema] {
        match self {
            SeriesRequest::Single(series) => std::slice::from_ref(series),
            SeriesRequest::Multi { series, .. } => series,
        }
    }

    pub fn varying_axis(&self) -> Option<&str> {
        match self {
            SeriesRequest::Single(_) => None,
            SeriesRequest::Multi { varying_axis, .. } => Some(varying_axis),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, SeriesRequest::Multi { .. })
    }

    /// Rebuilds the caller-facing schema map this request describes.
    pub fn to_schema_map(&self) -> SchemaMap {
        let Some(first) = self.series().first() else {
            return SchemaMap::default();
        };
        let mut schema = SchemaMap {
            operations: first.operations.clone(),
            ..SchemaMap::default()
        };
        for (axis, field) in &first.fields {
            let binding = match self.varying_axis() {
                Some(varying) if varying == axis => AxisBinding::Multi(
                    self.series()
                        .iter()
                        .filter_map(|series| series.fields.get(axis))
                        .map(|field| field.descriptor.clone())
                        .collect(),
                ),
                _ => AxisBinding::Single(field.descriptor.clone()),
            };
            match binding {
                AxisBinding::Single(descriptor) if axis == ENTITY_AXIS => {
                    schema.entity = Some(descriptor)
                }
                binding => {
                    schema.axes.insert(axis.clone(), binding);
                }
            }
        }
        schema
    }
}

fn series_error(axes: Vec<String>, reason: &str) -> PipelineError {
    PipelineError::InvalidSeriesConfiguration {
        axes,
        reason: reason.to_string(),
    }
}

/// Infers the series shape of `schema` and validates every series against
/// `coordinate_type`.
///
/// At most one axis may map to an array of descriptors, the array must not
/// be empty, its descriptors must share one value kind, and `entity` never
/// varies.
pub fn classify(
    coordinate_type: CoordinateType,
    schema: &SchemaMap,
) -> Result<SeriesRequest, PipelineError> {
    let multi = schema.multi_axes();
    if multi.iter().any(|axis| axis == ENTITY_AXIS) {
        return Err(series_error(
            vec![ENTITY_AXIS.to_string()],
            "entity cannot vary across series",
        ));
    }
    if multi.len() > 1 {
        return Err(series_error(multi, "only one axis may vary across series"));
    }
    if schema.entity.is_some() && schema.axes.contains_key(ENTITY_AXIS) {
        return Err(PipelineError::schema(ENTITY_AXIS, "entity is bound twice"));
    }

    let mut shared: IndexMap<String, FieldDescriptor> = IndexMap::new();
    let mut varying: Option<(&String, &Vec<FieldDescriptor>)> = None;
    for (axis, binding) in &schema.axes {
        match binding {
            AxisBinding::Single(descriptor) => {
                shared.insert(axis.clone(), descriptor.clone());
            }
            AxisBinding::Multi(descriptors) => varying = Some((axis, descriptors)),
        }
    }
    if let Some(entity) = &schema.entity {
        shared.insert(ENTITY_AXIS.to_string(), entity.clone());
    }

    let Some((axis, descriptors)) = varying else {
        let series = SeriesSchema::resolve(coordinate_type, &shared, &schema.operations, None)?;
        return Ok(SeriesRequest::Single(series));
    };
    if descriptors.is_empty() {
        return Err(series_error(vec![axis.clone()], "varying axis has no series"));
    }
    // series share one scale, so their values must be comparable
    if !descriptors.iter().map(|descriptor| descriptor.ty.kind()).all_equal() {
        return Err(series_error(
            vec![axis.clone()],
            "varying axis mixes value kinds across series",
        ));
    }

    let series = descriptors
        .iter()
        .map(|descriptor| {
            let mut bindings = shared.clone();
            bindings.insert(axis.clone(), descriptor.clone());
            SeriesSchema::resolve(
                coordinate_type,
                &bindings,
                &schema.operations,
                Some(descriptor.display_label().to_string()),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SeriesRequest::Multi {
        varying_axis: axis.clone(),
        series,
    })
}

/// Result of one series in a loaded system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOutcome {
    pub index: usize,
    pub label: Option<String>,
    /// Position of the series' first record in the flat `data`
    pub offset: usize,
    pub record_count: usize,
    pub extent: IndexMap<String, Extent>,
    pub error: Option<PipelineError>,
}

impl SeriesOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}
