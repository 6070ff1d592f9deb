//! Runs the whole pipeline and packages the result as a `System`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use coordsys_common::time::Stopwatch;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use tracing::info_span;

use crate::calculations::apply_operations;
use crate::config::ChartConfig;
use crate::coordinate::{parse_coordinate_type, CoordinateType};
use crate::error::PipelineError;
use crate::extent::{compute_extents, union_extents, Extent};
use crate::field::FieldDescriptor;
use crate::geo::{to_feature_collection, FeatureCollection};
use crate::remap::{input_records, remap_staged, FieldWarning, TypedRecord};
use crate::scale::{compute_scales, AxisScale};
use crate::schema::SchemaMap;
use crate::series::{classify, SeriesOutcome, SeriesRequest};

/// Most field warnings kept in the metadata; the total is always reported.
pub const MAX_WARNINGS: usize = 100;

/// Which input checks passed before the run stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    pub coordinate_type: bool,
    pub input_data: bool,
    pub schema: bool,
    pub remap: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub record_count: usize,
    pub series_count: usize,
    pub multi_series: bool,
    pub varying_axis: Option<String>,
    pub warnings: Vec<FieldWarning>,
    pub warning_count: usize,
    /// Stage name to wall time in milliseconds, in execution order
    pub stage_durations: IndexMap<String, f64>,
    pub valid: Validity,
}

impl Metadata {
    fn add_warnings(&mut self, warnings: Vec<FieldWarning>) {
        self.warning_count += warnings.len();
        let room = MAX_WARNINGS.saturating_sub(self.warnings.len());
        self.warnings.extend(warnings.into_iter().take(room));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSchema {
    pub input: SchemaMap,
    pub output: IndexMap<String, FieldDescriptor>,
    pub entity: Option<FieldDescriptor>,
}

#[derive(Debug, Clone)]
pub struct LoadedSystem {
    pub id: String,
    pub coordinate_type: CoordinateType,
    pub data: Vec<TypedRecord>,
    pub schema: SystemSchema,
    /// Union over all successful series
    pub extent: IndexMap<String, Extent>,
    pub scale: IndexMap<String, AxisScale>,
    pub series: Vec<SeriesOutcome>,
    pub geojson: Option<FeatureCollection>,
    pub metadata: Metadata,
    pub config: ChartConfig,
}

#[derive(Debug, Clone)]
pub struct ErroredSystem {
    pub id: String,
    /// The name as requested, which may not be a known system
    pub coordinate_type: String,
    pub error: PipelineError,
    pub metadata: Metadata,
}

/// Outcome of a pipeline run. Either every stage succeeded or the first
/// failing stage is reported; there is no partially loaded state.
#[derive(Debug, Clone)]
pub enum System {
    Loaded(Box<LoadedSystem>),
    Errored(ErroredSystem),
}

impl System {
    pub fn success(&self) -> bool {
        matches!(self, System::Loaded(_))
    }

    pub fn id(&self) -> &str {
        match self {
            System::Loaded(system) => &system.id,
            System::Errored(system) => &system.id,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            System::Loaded(_) => None,
            System::Errored(system) => Some(&system.error),
        }
    }

    pub fn loaded(&self) -> Option<&LoadedSystem> {
        match self {
            System::Loaded(system) => Some(system),
            System::Errored(_) => None,
        }
    }

    /// Records of a loaded system, empty when errored
    pub fn data(&self) -> &[TypedRecord] {
        match self {
            System::Loaded(system) => &system.data,
            System::Errored(_) => &[],
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            System::Loaded(system) => &system.metadata,
            System::Errored(system) => &system.metadata,
        }
    }
}

impl Serialize for System {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            System::Loaded(system) => {
                map.serialize_entry("id", &system.id)?;
                map.serialize_entry("coordinateType", &system.coordinate_type)?;
                map.serialize_entry("data", &system.data)?;
                map.serialize_entry("schema", &system.schema)?;
                map.serialize_entry("extent", &system.extent)?;
                map.serialize_entry("scale", &system.scale)?;
                map.serialize_entry("series", &system.series)?;
                if let Some(geojson) = &system.geojson {
                    map.serialize_entry("geojson", geojson)?;
                }
                map.serialize_entry("metadata", &system.metadata)?;
                map.serialize_entry("config", &system.config)?;
                map.serialize_entry("error", &None::<PipelineError>)?;
            }
            System::Errored(system) => {
                map.serialize_entry("id", &system.id)?;
                map.serialize_entry("coordinateType", &system.coordinate_type)?;
                map.serialize_entry("data", &[] as &[TypedRecord])?;
                map.serialize_entry("metadata", &system.metadata)?;
                map.serialize_entry("error", &system.error)?;
            }
        }
        map.serialize_entry("success", &self.success())?;
        map.serialize_entry("loading", &false)?;
        map.end()
    }
}

/// Times each stage into the metadata and wraps it in a tracing span.
struct StageClock {
    watch: Stopwatch,
}

impl StageClock {
    fn new() -> Self {
        Self {
            watch: Stopwatch::start(),
        }
    }

    fn run<T>(&mut self, metadata: &mut Metadata, stage: &'static str, f: impl FnOnce() -> T) -> T {
        self.watch.lap_ms();
        let out = info_span!("stage", stage).in_scope(f);
        metadata
            .stage_durations
            .insert(stage.to_string(), self.watch.lap_ms());
        out
    }
}

fn json_len<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_string(value).map(|s| s.len()).unwrap_or(0)
}

/// `config.id`, or `"{coordinate}-{hash}"` derived from the inputs so the
/// same request always gets the same id.
fn system_id(
    coordinate_type: &str,
    raw: &JsonValue,
    schema: &SchemaMap,
    config: &ChartConfig,
) -> String {
    if let Some(id) = &config.id {
        return id.clone();
    }
    let mut hasher = DefaultHasher::new();
    coordinate_type.hash(&mut hasher);
    raw.to_string().hash(&mut hasher);
    serde_json::to_string(schema).unwrap_or_default().hash(&mut hasher);
    serde_json::to_string(config).unwrap_or_default().hash(&mut hasher);
    format!("{coordinate_type}-{:016x}", hasher.finish())
}

/// Runs the pipeline for a coordinate system by name:
/// coordinate type, input shape, series classification, remap, operations,
/// extents and scales.
///
/// Never panics on bad input; the first failing stage yields
/// [`System::Errored`].
#[tracing::instrument(skip_all, fields(coordinate_type = %coordinate_type))]
pub fn create_system(
    coordinate_type: &str,
    raw: &JsonValue,
    schema: &SchemaMap,
    config: &ChartConfig,
) -> System {
    let id = system_id(coordinate_type, raw, schema, config);
    let mut metadata = Metadata {
        input_bytes: json_len(raw),
        ..Default::default()
    };
    let mut clock = StageClock::new();

    let result = (|| {
        let ty = clock.run(&mut metadata, "coordinate_type", || {
            parse_coordinate_type(coordinate_type)
        })?;
        metadata.valid.coordinate_type = true;

        let rows = clock.run(&mut metadata, "input_data", || input_records(raw))?;
        metadata.valid.input_data = true;

        let request = clock.run(&mut metadata, "schema", || classify(ty, schema))?;
        metadata.valid.schema = true;

        load(&id, &request, schema.clone(), rows, config, &mut metadata, &mut clock)
    })();

    finish(id, coordinate_type.to_string(), result, metadata)
}

/// Runs the pipeline for an explicit series request, skipping inference.
#[tracing::instrument(skip_all)]
pub fn create_system_for_request(
    request: &SeriesRequest,
    raw: &JsonValue,
    config: &ChartConfig,
) -> System {
    let schema = request.to_schema_map();
    let name = request
        .coordinate_type()
        .map(|ty| ty.to_string())
        .unwrap_or_default();
    let id = system_id(&name, raw, &schema, config);
    let mut metadata = Metadata {
        input_bytes: json_len(raw),
        ..Default::default()
    };
    let mut clock = StageClock::new();

    let result = (|| {
        if request.series().is_empty() {
            return Err(PipelineError::InvalidSeriesConfiguration {
                axes: request.varying_axis().map(str::to_string).into_iter().collect(),
                reason: "request has no series".to_string(),
            });
        }
        metadata.valid.coordinate_type = true;
        metadata.valid.schema = true;

        let rows = clock.run(&mut metadata, "input_data", || input_records(raw))?;
        metadata.valid.input_data = true;

        load(&id, request, schema.clone(), rows, config, &mut metadata, &mut clock)
    })();

    finish(id, name, result, metadata)
}

fn finish(
    id: String,
    coordinate_type: String,
    result: Result<LoadedSystem, PipelineError>,
    metadata: Metadata,
) -> System {
    match result {
        Ok(system) => {
            tracing::info!(
                records = system.metadata.record_count,
                series = system.metadata.series_count,
                "system loaded"
            );
            System::Loaded(Box::new(system))
        }
        Err(error) => {
            tracing::warn!(stage = %error.stage(), "{error}");
            System::Errored(ErroredSystem {
                id,
                coordinate_type,
                error,
                metadata,
            })
        }
    }
}

/// Remap onwards, shared by both entry points.
fn load(
    id: &str,
    request: &SeriesRequest,
    input: SchemaMap,
    rows: &[JsonValue],
    config: &ChartConfig,
    metadata: &mut Metadata,
    clock: &mut StageClock,
) -> Result<LoadedSystem, PipelineError> {
    let series = request.series();
    let Some(first) = series.first() else {
        return Err(PipelineError::InvalidSeriesConfiguration {
            axes: Vec::new(),
            reason: "request has no series".to_string(),
        });
    };
    let coordinate_type = first.coordinate_type;
    metadata.series_count = series.len();
    metadata.multi_series = request.is_multi();
    metadata.varying_axis = request.varying_axis().map(str::to_string);

    // every series is remapped independently; one failing does not stop the rest
    let remapped: Vec<Result<Vec<TypedRecord>, PipelineError>> =
        clock.run(metadata, "remap", || {
            series
                .iter()
                .map(|schema| remap_staged(rows, schema))
                .collect::<Vec<_>>()
        })
        .into_iter()
        .map(|(records, warnings)| {
            metadata.add_warnings(warnings);
            records
        })
        .collect();

    if remapped.iter().all(Result::is_err) {
        if let Some(Err(err)) = remapped.first() {
            return Err(err.clone());
        }
    }
    metadata.valid.remap = true;

    let remapped: Vec<Result<Vec<TypedRecord>, PipelineError>> =
        clock.run(metadata, "operations", || {
            remapped
                .into_iter()
                .zip(series)
                .map(|(result, schema)| {
                    result.map(|records| apply_operations(records, &schema.operations))
                })
                .collect()
        });

    let (data, outcomes, measured) = clock.run(metadata, "extent", || {
        let mut data = Vec::new();
        let mut outcomes = Vec::with_capacity(series.len());
        // first successful series decides the scale families
        let mut measured = None;
        for (index, (result, schema)) in remapped.into_iter().zip(series).enumerate() {
            let (extent, record_count, error) = match result {
                Ok(records) => {
                    let extent = compute_extents(schema, &records);
                    let count = records.len();
                    measured.get_or_insert(schema);
                    data.extend(records);
                    (extent, count, None)
                }
                Err(err) => (IndexMap::new(), 0, Some(err)),
            };
            outcomes.push(SeriesOutcome {
                index,
                label: schema.label.clone(),
                offset: data.len() - record_count,
                record_count,
                extent,
                error,
            });
        }
        (data, outcomes, measured)
    });
    let extent = union_extents(outcomes.iter().map(|outcome| &outcome.extent));
    let scale_schema = measured.unwrap_or(first);

    let scale = clock.run(metadata, "scale", || {
        compute_scales(scale_schema, &extent, &data, config)
    })?;

    let geojson = (coordinate_type == CoordinateType::Geographic)
        .then(|| to_feature_collection(&data));

    metadata.record_count = data.len();
    metadata.output_bytes = json_len(&data);

    Ok(LoadedSystem {
        id: id.to_string(),
        coordinate_type,
        schema: SystemSchema {
            input,
            output: scale_schema.output_descriptors(),
            entity: scale_schema
                .entity()
                .map(|field| field.descriptor.clone()),
        },
        data,
        extent,
        scale,
        series: outcomes,
        geojson,
        metadata: std::mem::take(metadata),
        config: config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::value_type::{Value, ValueType};
    use serde_json::json;

    fn cartesian() -> SchemaMap {
        SchemaMap::new()
            .with_axis("x", FieldDescriptor::new("a", ValueType::Number))
            .with_axis("y", FieldDescriptor::new("b", ValueType::Number))
    }

    #[test]
    fn test_loaded_envelope() {
        let raw = json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}]);
        let system = create_system("cartesian", &raw, &cartesian(), &ChartConfig::default());
        assert!(system.success());
        assert_eq!(system.data().len(), 2);

        let json = serde_json::to_value(&system).unwrap();
        assert_eq!(json["success"], json!(true));
        assert_eq!(json["loading"], json!(false));
        assert_eq!(json["error"], JsonValue::Null);
        assert_eq!(json["coordinateType"], json!("cartesian"));
        assert_eq!(json["extent"]["x"], json!([1.0, 3.0]));
        assert_eq!(json["scale"]["y"]["range"], json!([450.0, 50.0]));
        assert_eq!(json["metadata"]["valid"]["remap"], json!(true));
        assert_eq!(json["data"][1]["y"], json!(4.0));
    }

    #[test]
    fn test_errored_envelope() {
        let raw = json!([{"a": 1}]);
        let system = create_system("cartesian", &raw, &cartesian(), &ChartConfig::default());
        assert!(!system.success());
        assert_eq!(system.error().map(|e| e.stage()), Some(Stage::InvalidRemapData));

        let json = serde_json::to_value(&system).unwrap();
        assert_eq!(json["data"], json!([]));
        assert_eq!(json["success"], json!(false));
        assert_eq!(json["error"]["stage"], json!("InvalidRemapData"));
        assert_eq!(json["error"]["detail"]["record"], json!(0));
        assert_eq!(json["metadata"]["valid"]["schema"], json!(true));
        assert_eq!(json["metadata"]["valid"]["remap"], json!(false));
        assert_eq!(json["metadata"]["warningCount"], json!(1));
    }

    #[test]
    fn test_deterministic_id() {
        let raw = json!([{"a": 1, "b": 2}]);
        let a = create_system("cartesian", &raw, &cartesian(), &ChartConfig::default());
        let b = create_system("cartesian", &raw, &cartesian(), &ChartConfig::default());
        assert_eq!(a.id(), b.id());
        assert!(a.id().starts_with("cartesian-"));

        let named = create_system(
            "cartesian",
            &raw,
            &cartesian(),
            &ChartConfig::default().with_id("chart-1"),
        );
        assert_eq!(named.id(), "chart-1");
    }

    #[test]
    fn test_warnings_are_capped() {
        let mut metadata = Metadata::default();
        let warning = FieldWarning {
            record: 0,
            axis: "x".to_string(),
            key: "a".to_string(),
            reason: "Missing value".to_string(),
        };
        metadata.add_warnings(vec![warning.clone(); 80]);
        metadata.add_warnings(vec![warning; 80]);
        assert_eq!(metadata.warnings.len(), MAX_WARNINGS);
        assert_eq!(metadata.warning_count, 160);
    }

    #[test]
    fn test_stage_durations_recorded() {
        let raw = json!([{"a": 1, "b": 2}]);
        let system = create_system("cartesian", &raw, &cartesian(), &ChartConfig::default());
        let stages: Vec<_> = system.metadata().stage_durations.keys().cloned().collect();
        assert_eq!(
            stages,
            vec!["coordinate_type", "input_data", "schema", "remap", "operations", "extent", "scale"]
        );
        assert!(system.data()[0].get("x") == Some(&Value::Number(1.0)));
    }
}
