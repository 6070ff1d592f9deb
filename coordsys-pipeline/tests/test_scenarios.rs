use coordsys_pipeline::calculations::Operation;
use coordsys_pipeline::extent::Extent;
use coordsys_pipeline::value_type::ValueKind;
use coordsys_pipeline::{
    axes_of, create_system, ChartConfig, CoordinateType, FieldDescriptor, ScaleKind, SchemaMap,
    Stage, System, Value, ValueType,
};
use float_cmp::assert_approx_eq;
use serde_json::{json, Value as JsonValue};

fn number(key: &str) -> FieldDescriptor {
    FieldDescriptor::new(key, ValueType::Number)
}

fn cartesian_schema() -> SchemaMap {
    SchemaMap::new()
        .with_axis("x", number("a"))
        .with_axis("y", number("b"))
}

fn loaded(system: &System) -> &coordsys_pipeline::system::LoadedSystem {
    match system.loaded() {
        Some(loaded) => loaded,
        None => panic!("expected a loaded system, got {:?}", system.error()),
    }
}

#[test]
fn test_cartesian_two_records() {
    let raw = json!([{"a": 1, "b": 10}, {"a": 5, "b": 30}]);
    let system = create_system("cartesian", &raw, &cartesian_schema(), &ChartConfig::default());
    let system = loaded(&system);

    assert_eq!(system.data.len(), 2);
    assert_eq!(system.extent["x"], Extent::Bounded { min: 1.0, max: 5.0 });
    assert_eq!(system.extent["y"], Extent::Bounded { min: 10.0, max: 30.0 });

    let x = &system.scale["x"];
    let y = &system.scale["y"];
    assert_approx_eq!(f64, x.apply(&Value::Number(1.0)).unwrap(), 50.0);
    assert_approx_eq!(f64, x.apply(&Value::Number(5.0)).unwrap(), 450.0);
    // y grows upwards
    assert_approx_eq!(f64, y.apply(&Value::Number(10.0)).unwrap(), 450.0);
    assert_approx_eq!(f64, y.apply(&Value::Number(30.0)).unwrap(), 50.0);
    assert_eq!(system.schema.output["x"].scale, Some(ScaleKind::Linear));
}

#[test]
fn test_missing_field_reports_record() {
    let raw = json!([{"a": 1, "b": 10}, {"a": 5}]);
    let system = create_system("cartesian", &raw, &cartesian_schema(), &ChartConfig::default());

    assert!(!system.success());
    assert!(system.data().is_empty());
    let json = serde_json::to_value(&system).unwrap();
    assert_eq!(json["error"]["stage"], json!("InvalidRemapData"));
    assert_eq!(json["error"]["detail"]["record"], json!(1));
    assert_eq!(json["error"]["detail"]["fields"][0]["axis"], json!("y"));
}

#[test]
fn test_ternary_single_record() {
    let schema = SchemaMap::new()
        .with_axis("A", number("a"))
        .with_axis("B", number("b"))
        .with_axis("C", number("c"));
    let raw = json!([{"a": 0.2, "b": 0.3, "c": 0.5}]);
    let system = create_system("ternary", &raw, &schema, &ChartConfig::default());
    let system = loaded(&system);

    for axis in ["A", "B", "C"] {
        let extent = system.extent[axis];
        let (min, max) = extent.bounds().unwrap();
        assert_eq!(min, max);
        // collapsed domains land on the middle of the range
        let position = system.scale[axis].apply(&system.data[0][axis]).unwrap();
        assert!(position.is_finite());
        assert_approx_eq!(f64, position, 250.0);
    }
}

#[test]
fn test_multi_series_isolates_failures() {
    let schema = SchemaMap::new()
        .with_axis("x", number("month"))
        .with_series("y", vec![number("sales"), number("returns")]);
    let raw = json!([
        {"month": 1, "sales": 10, "returns": "n/a"},
        {"month": 2, "sales": 20, "returns": 2}
    ]);
    let system = create_system("cartesian", &raw, &schema, &ChartConfig::default());
    let system = loaded(&system);

    assert_eq!(system.data.len(), 2);
    assert_eq!(system.series.len(), 2);
    assert!(system.series[0].success());
    assert_eq!(system.series[1].error.as_ref().map(|e| e.stage()), Some(Stage::InvalidRemapData));
    assert_eq!(system.metadata.series_count, 2);
    assert!(system.metadata.multi_series);
    assert_eq!(system.metadata.varying_axis.as_deref(), Some("y"));
    assert_eq!(system.metadata.warning_count, 1);
    assert_eq!(system.metadata.warnings[0].axis, "y");
}

#[test]
fn test_multi_series_concatenates() {
    let schema = SchemaMap::new()
        .with_axis("x", number("month"))
        .with_series("y", vec![number("sales"), number("costs")]);
    let raw = json!([
        {"month": 1, "sales": 10, "costs": 4},
        {"month": 2, "sales": 20, "costs": 8},
        {"month": 3, "sales": 15, "costs": 9}
    ]);
    let system = create_system("cartesian", &raw, &schema, &ChartConfig::default());
    let system = loaded(&system);

    assert_eq!(system.data.len(), 3 * 2);
    assert_eq!(system.series[1].offset, 3);
    assert_eq!(system.series[0].extent["y"], Extent::Bounded { min: 10.0, max: 20.0 });
    assert_eq!(system.series[1].extent["y"], Extent::Bounded { min: 4.0, max: 9.0 });
    assert_eq!(system.extent["y"], Extent::Bounded { min: 4.0, max: 20.0 });
}

#[test]
fn test_all_series_failing_errors_system() {
    let schema = SchemaMap::new()
        .with_axis("x", number("month"))
        .with_series("y", vec![number("missing"), number("absent")]);
    let raw = json!([{"month": 1}]);
    let system = create_system("cartesian", &raw, &schema, &ChartConfig::default());

    assert!(!system.success());
    assert_eq!(system.error().map(|e| e.stage()), Some(Stage::InvalidRemapData));
    assert_eq!(system.metadata().warning_count, 2);
}

#[test]
fn test_empty_data() {
    let schema = SchemaMap::new()
        .with_axis("r", number("r"))
        .with_axis("theta", number("t"));
    let system = create_system("polar", &json!([]), &schema, &ChartConfig::default());
    let system = loaded(&system);

    assert!(system.data.is_empty());
    assert!(system.extent.values().all(Extent::is_empty));
    let json = serde_json::to_value(&system.extent).unwrap();
    assert_eq!(json, json!({"r": null, "theta": null}));
    for scale in system.scale.values() {
        let position = scale.apply(&Value::Number(0.5)).unwrap();
        assert!(position.is_finite());
    }
}

#[test]
fn test_idempotent_apart_from_timings() {
    let raw = json!([{"a": 3, "b": 1}, {"a": -2, "b": 7}]);
    let strip = |system: System| -> JsonValue {
        let mut json = serde_json::to_value(&system).unwrap();
        json["metadata"]["stageDurations"] = JsonValue::Null;
        json
    };
    let first = strip(create_system("cartesian", &raw, &cartesian_schema(), &ChartConfig::default()));
    let second = strip(create_system("cartesian", &raw, &cartesian_schema(), &ChartConfig::default()));
    assert_eq!(first, second);
}

#[test]
fn test_outputs_satisfy_declared_kinds() {
    let schema = SchemaMap::new()
        .with_axis("x", FieldDescriptor::new("when", ValueType::DateIso))
        .with_axis("y", number("value"))
        .with_axis("label", FieldDescriptor::new("name", ValueType::String))
        .with_entity(FieldDescriptor::new("flag", ValueType::Boolean));
    let raw = json!([
        {"when": "2024-05-01T12:00:00Z", "value": 1.5, "name": "a", "flag": true},
        {"when": "2024-05-02", "value": 2, "name": "b", "flag": false}
    ]);
    let system = create_system("affine", &raw, &schema, &ChartConfig::default());
    let system = loaded(&system);

    for record in &system.data {
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["x", "y", "label", "entity"]);
        assert_eq!(record["x"].kind(), ValueKind::Date);
        assert_eq!(record["y"].kind(), ValueKind::Number);
        assert_eq!(record["label"].kind(), ValueKind::String);
        assert_eq!(record["entity"].kind(), ValueKind::Boolean);
    }
    // annotations and entity get neither extent nor scale
    assert_eq!(system.extent.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    assert_eq!(system.scale.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    assert_eq!(system.schema.entity.as_ref().map(|e| e.key.as_str()), Some("flag"));
}

#[test]
fn test_stage_taxonomy() {
    let config = ChartConfig::default();
    let raw = json!([{"a": 1, "b": 2}]);
    let cases = [
        (create_system("mercator", &raw, &cartesian_schema(), &config), Stage::InvalidCoordinateType),
        (create_system("cartesian", &json!("rows"), &cartesian_schema(), &config), Stage::InvalidInputData),
        (create_system("polar", &raw, &cartesian_schema(), &config), Stage::InvalidSchemaConfiguration),
        (
            create_system(
                "cartesian",
                &raw,
                &SchemaMap::new()
                    .with_series("x", vec![number("a")])
                    .with_series("y", vec![number("b")]),
                &config,
            ),
            Stage::InvalidSeriesConfiguration,
        ),
        (
            create_system(
                "cartesian",
                &json!([{"a": 0, "b": 2}, {"a": 10, "b": 3}]),
                &SchemaMap::new()
                    .with_axis("x", number("a").with_scale(ScaleKind::Log))
                    .with_axis("y", number("b")),
                &config,
            ),
            Stage::InvalidScaleConfiguration,
        ),
    ];
    for (system, stage) in cases {
        assert_eq!(system.error().map(|e| e.stage()), Some(stage), "{:?}", system.error());
        assert!(system.data().is_empty());
    }
}

#[test]
fn test_geographic_geojson() {
    let schema = SchemaMap::new()
        .with_axis("latitude", number("lat"))
        .with_axis("longitude", number("lon"))
        .with_axis("name", FieldDescriptor::new("city", ValueType::String));
    let raw = json!([
        {"lat": 48.85, "lon": 2.35, "city": "Paris"},
        {"lat": 51.5, "lon": -0.12, "city": "London"}
    ]);
    let system = create_system("geographic", &raw, &schema, &ChartConfig::default());
    let json = serde_json::to_value(&system).unwrap();

    assert_eq!(json["geojson"]["type"], json!("FeatureCollection"));
    assert_eq!(
        json["geojson"]["features"][1]["geometry"]["coordinates"],
        json!([-0.12, 51.5])
    );
    assert_eq!(json["geojson"]["features"][0]["properties"]["name"], json!("Paris"));
    assert_eq!(axes_of(CoordinateType::Geographic), vec!["latitude", "longitude", "name"]);
}

#[test]
fn test_sum_per_group() {
    let schema = SchemaMap::new()
        .with_axis("x", FieldDescriptor::new("region", ValueType::String))
        .with_axis("y", number("amount"))
        .with_operation("y", Operation::Sum);
    let raw = json!([
        {"region": "north", "amount": 5},
        {"region": "south", "amount": 2},
        {"region": "north", "amount": 7}
    ]);
    let system = create_system("cartesian", &raw, &schema, &ChartConfig::default());
    let system = loaded(&system);

    assert_eq!(system.data.len(), 2);
    assert_eq!(system.data[0]["x"], Value::String("north".to_string()));
    assert_eq!(system.data[0]["y"], Value::Number(12.0));
    assert_eq!(system.data[1]["y"], Value::Number(2.0));
    assert_eq!(system.extent["y"], Extent::Bounded { min: 2.0, max: 12.0 });
}

#[test]
fn test_operation_on_text_axis_rejected() {
    let schema = SchemaMap::new()
        .with_axis("x", FieldDescriptor::new("region", ValueType::String))
        .with_axis("y", number("amount"))
        .with_operation("x", Operation::Average);
    let system = create_system("cartesian", &json!([]), &schema, &ChartConfig::default());
    assert_eq!(system.error().map(|e| e.stage()), Some(Stage::InvalidOperation));
}

#[test]
fn test_count_keeps_declared_types() {
    let raw = json!([
        {"region": "north", "amount": 1},
        {"region": "north", "amount": 2},
        {"region": "south", "amount": 3}
    ]);

    // a count would replace the dates or strings of the axis with numbers
    let schema = SchemaMap::new()
        .with_axis("x", FieldDescriptor::new("region", ValueType::String))
        .with_axis("y", number("amount"))
        .with_operation("x", Operation::Count);
    let system = create_system("cartesian", &raw, &schema, &ChartConfig::default());
    assert_eq!(system.error().map(|e| e.stage()), Some(Stage::InvalidOperation));

    let schema = SchemaMap::new()
        .with_axis("x", FieldDescriptor::new("region", ValueType::String))
        .with_axis("y", number("amount"))
        .with_operation("y", Operation::Count);
    let system = create_system("cartesian", &raw, &schema, &ChartConfig::default());
    let counts: Vec<_> = loaded(&system)
        .data
        .iter()
        .map(|record| (record["x"].clone(), record["y"].clone()))
        .collect();
    assert_eq!(
        counts,
        vec![
            (Value::String("north".to_string()), Value::Number(2.0)),
            (Value::String("south".to_string()), Value::Number(1.0)),
        ]
    );
}

#[test]
fn test_schema_from_json() {
    let schema = SchemaMap::from_json(&json!({
        "x": {"key": "stats.w", "type": "number", "range": [0, null]},
        "y": {"key": "stats.h", "type": "number", "scale": "sqrt"}
    }))
    .unwrap();
    let config: ChartConfig = serde_json::from_value(json!({"width": 300, "height": 200, "margin": 0})).unwrap();
    let raw = json!([{"stats": {"w": 4, "h": 9}}, {"stats": {"w": 8, "h": 16}}]);
    let system = create_system("hexbin", &raw, &schema, &config);
    let system = loaded(&system);

    assert_eq!(system.extent["x"], Extent::Bounded { min: 0.0, max: 8.0 });
    assert_approx_eq!(f64, system.scale["x"].apply(&Value::Number(4.0)).unwrap(), 150.0);
    assert_eq!(system.scale["y"].pixel_range(), (200.0, 0.0));
    assert_eq!(system.config, config);
}
