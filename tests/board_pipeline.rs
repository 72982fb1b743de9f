//! End-to-end tests for the parse, normalise and validate pipeline.

use std::path::{Path, PathBuf};

use pcb_validator::board::{
    compute_stats, load_board, parse_board_data, validate, Board, Defect, DefectKind, Severity,
    CHECKS_RUN,
};
use pcb_validator::board::model::KeepoutShape;
use serde_json::{json, Value};

/// Helper to compare floats with tolerance.
fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A millimetre board with one net, a two-layer stackup and nothing placed.
fn base_document() -> Value {
    json!({
        "metadata": {"designUnits": "MILLIMETER"},
        "boundary": {"coordinates": [[0, 0], [10, 0], [10, 10], [0, 10]]},
        "stackup": {
            "layers": [
                {"name": "TOP", "layer_type": "TOP", "index": 0, "material": {}},
                {"name": "BOTTOM", "layer_type": "BOTTOM", "index": 1, "material": {}}
            ]
        },
        "nets": [{"name": "GND"}],
        "components": {},
        "traces": {},
        "vias": {}
    })
}

fn trace(id: &str, net: &str) -> Value {
    json!({
        "uid": id,
        "net_name": net,
        "layer_hash": "TOP",
        "path": {"coordinates": [[1, 1], [5, 1]]},
        "width": 0.2
    })
}

fn parse(document: Value) -> Board {
    let outcome = parse_board_data(document);
    assert!(outcome.errors.is_empty(), "unexpected errors: {:?}", outcome.errors);
    outcome.board.expect("board should be assembled")
}

fn kinds(defects: &[Defect]) -> Vec<DefectKind> {
    defects.iter().map(|d| d.kind).collect()
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn empty_board_reports_only_empty_board() {
    let board = parse(base_document());
    let defects = validate(&board);

    assert_eq!(kinds(&defects), [DefectKind::EmptyBoard]);
    assert_eq!(defects[0].json_path, "$");
    assert_eq!(defects[0].severity, Severity::Error);
}

#[test]
fn via_hole_equal_to_diameter() {
    let mut document = base_document();
    document["traces"]["t1"] = trace("t1", "GND");
    document["vias"]["v1"] = json!({
        "uid": "v1",
        "net_name": "GND",
        "center": [5, 5],
        "diameter": 0.6,
        "hole_size": 0.6,
        "span": {"start_layer": "TOP", "end_layer": "BOTTOM"}
    });

    let defects = validate(&parse(document));
    assert_eq!(kinds(&defects), [DefectKind::InvalidViaGeometry]);
    assert_eq!(defects[0].json_path, "$.vias.v1.hole_size");
}

#[test]
fn dangling_trace_lists_available_nets() {
    let mut document = base_document();
    document["nets"] = json!([{"name": "VCC"}, {"name": "GND"}]);
    document["traces"]["t7"] = trace("t7", "SDA");

    let defects = validate(&parse(document));
    assert_eq!(kinds(&defects), [DefectKind::DanglingTrace]);

    let defect = &defects[0];
    assert_eq!(defect.message, "Trace t7 references unknown net SDA");
    assert_eq!(defect.json_path, "$.traces.t7.net_name");
    let context = defect.context.as_ref().expect("context");
    assert_eq!(context["trace_id"], "t7");
    assert_eq!(context["available_nets"], json!(["GND", "VCC"]));
}

#[test]
fn stackup_gap_is_detected() {
    let mut document = base_document();
    document["traces"]["t1"] = trace("t1", "GND");
    document["stackup"]["layers"] = json!([
        {"name": "TOP", "layer_type": "TOP", "index": 0, "material": {}},
        {"name": "MID", "layer_type": "MID", "index": 1, "material": {}},
        {"name": "BOTTOM", "layer_type": "BOTTOM", "index": 3, "material": {}}
    ]);
    let defects = validate(&parse(document.clone()));
    assert_eq!(kinds(&defects), [DefectKind::MalformedStackup]);

    document["stackup"]["layers"][2]["index"] = json!(2);
    assert!(validate(&parse(document)).is_empty());
}

#[test]
fn stackup_with_extreme_index() {
    let mut document = base_document();
    document["stackup"]["layers"] = json!([
        {"name": "TOP", "layer_type": "TOP", "index": 9_223_372_036_854_775_807_i64, "material": {}}
    ]);

    let defects = validate(&parse(document));
    assert_eq!(kinds(&defects), [DefectKind::EmptyBoard]);
}

#[test]
fn stackup_indices_written_as_floats() {
    let mut document = base_document();
    document["traces"]["t1"] = trace("t1", "GND");
    document["stackup"]["layers"][0]["index"] = json!(0.0);
    document["stackup"]["layers"][1]["index"] = json!(1.0);
    assert!(validate(&parse(document.clone())).is_empty());

    document["stackup"]["layers"][1]["index"] = json!(1.5);
    let outcome = parse_board_data(document);
    assert_eq!(kinds(&outcome.errors), [DefectKind::ParseError]);
}

#[test]
fn validation_is_idempotent() {
    let mut document = base_document();
    document["traces"]["a"] = trace("a", "NOPE");
    document["traces"]["b"] = trace("b", "ALSO_NOPE");
    document["traces"]["b"]["width"] = json!(-1);
    let board = parse(document);

    let first = validate(&board);
    let second = validate(&board);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

// =============================================================================
// Ordering and gating
// =============================================================================

#[test]
fn defects_follow_document_order() {
    let mut document = base_document();
    document["traces"] = json!({
        "zeta": trace("zeta", "X"),
        "alpha": trace("alpha", "Y")
    });

    let defects = validate(&parse(document));
    let paths: Vec<&str> = defects.iter().map(|d| d.json_path.as_str()).collect();
    assert_eq!(paths, ["$.traces.zeta.net_name", "$.traces.alpha.net_name"]);
}

#[test]
fn component_checks_are_skipped_without_boundary() {
    let mut document = base_document();
    document.as_object_mut().unwrap().remove("boundary");
    document["components"]["U1"] = json!({
        "name": "U1",
        "reference": "U1",
        "footprint": "SOIC8",
        "outline": {"width": 5, "height": 4},
        "transform": {"position": [50, 50]},
        "pins": {
            "1": {"name": "1", "comp_name": "U9", "net_name": "NOPE", "shape": {}}
        }
    });

    let defects = validate(&parse(document));
    assert_eq!(kinds(&defects), [DefectKind::MissingBoundary]);
}

#[test]
fn component_and_pin_problems_with_boundary() {
    let mut document = base_document();
    document["components"]["U1"] = json!({
        "name": "U1",
        "reference": "U1",
        "footprint": "SOIC8",
        "outline": {"width": 5, "height": 4},
        "transform": {"position": [50, 50]},
        "pins": {
            "1": {"name": "1", "comp_name": "U9", "net_name": "GND", "shape": {}},
            "2": {"name": "2", "comp_name": "U1", "shape": {}}
        }
    });

    let defects = validate(&parse(document));
    assert_eq!(
        kinds(&defects),
        [
            DefectKind::ComponentOutsideBoundary,
            DefectKind::InvalidPinReference,
            DefectKind::NonexistentNet,
        ]
    );
    assert_eq!(defects[2].json_path, "$.components.U1.pins.2.net_name");
    assert_eq!(defects[2].context.as_ref().unwrap()["referenced_net"], Value::Null);
}

#[test]
fn out_of_range_rotation_fails_assembly() {
    let mut document = base_document();
    document["components"]["U1"] = json!({
        "name": "U1",
        "reference": "U1",
        "footprint": "SOIC8",
        "outline": {},
        "transform": {"position": [5, 5], "rotation": 400},
        "pins": {}
    });

    let outcome = parse_board_data(document);
    assert!(outcome.board.is_none());
    assert_eq!(outcome.errors[0].kind, DefectKind::ParseError);
    assert!(outcome.errors[0]
        .message
        .contains("$.components.U1.transform.rotation"));
}

// =============================================================================
// Permissive parsing
// =============================================================================

#[test]
fn malformed_sub_structures_degrade_with_warnings() {
    let mut document = base_document();
    document["boundary"]["coordinates"] = json!([[0, 0], [10, 0]]);
    document["traces"]["t1"] = trace("t1", "GND");
    document["traces"]["t1"]["path"]["coordinates"] = json!([1, 2, 3]);
    document["keepouts"] = json!([
        {"uid": "k1", "name": "k", "layer": "TOP", "keepout_type": "ROUTING",
         "shape": {"type": "polygon", "coordinates": "nope"}}
    ]);

    let outcome = parse_board_data(document);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.warnings.len(), 3);
    assert!(outcome
        .warnings
        .iter()
        .all(|w| w.kind == DefectKind::MalformedCoordinates && w.severity == Severity::Warning));

    let board = outcome.board.unwrap();
    assert!(board.boundary.is_none());
    assert!(board.keepouts[0].shape.is_absent());

    let defects = validate(&board);
    assert_eq!(
        kinds(&defects),
        [DefectKind::MissingBoundary, DefectKind::MalformedTrace]
    );
}

#[test]
fn invalid_units_halt_the_pipeline() {
    let mut document = base_document();
    document["metadata"]["designUnits"] = json!("MIL");

    let outcome = parse_board_data(document);
    assert!(outcome.board.is_none());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].kind, DefectKind::InvalidUnitSpecification);
    assert_eq!(outcome.errors[0].json_path, "$.metadata.designUnits");
}

// =============================================================================
// Fixture file
// =============================================================================

#[test]
fn fixture_board_is_valid_and_scaled() {
    let outcome = load_board(&fixture("valid_board.json"));
    assert!(outcome.is_success(), "errors: {:?}", outcome.errors);
    assert!(outcome.warnings.is_empty());

    let board = outcome.board.unwrap();
    assert!(validate(&board).is_empty());
    assert_eq!(board.metadata["designUnits"], "MILLIMETER");

    let r1 = &board.components["R1"];
    assert!(approx_eq(r1.transform.position.x(), 10.0, 1e-9));
    assert!(approx_eq(r1.outline.width, 1.0, 1e-9));

    let pin = r1.pin_position(&r1.pins["2"]).unwrap();
    assert!(approx_eq(pin.x(), 10.0, 1e-9));
    assert!(approx_eq(pin.y(), 10.5, 1e-9));

    assert!(board.components["U1"].user_preplaced);
    match board.keepouts[0].shape {
        KeepoutShape::Circle(ref circle) => assert!(approx_eq(circle.radius(), 2.0, 1e-9)),
        ref other => panic!("expected circle keepout, got {other:?}"),
    }
}

#[test]
fn fixture_board_statistics() {
    let board = load_board(&fixture("valid_board.json")).board.unwrap();
    let stats = compute_stats(&board);

    assert!(approx_eq(stats.dimensions[0], 50.0, 1e-9));
    assert!(approx_eq(stats.dimensions[1], 30.0, 1e-9));
    assert!(approx_eq(stats.area, 1500.0, 1e-9));
    assert_eq!(stats.num_components, 2);
    assert_eq!(stats.num_traces, 2);
    assert_eq!(stats.num_vias, 1);
    assert_eq!(stats.num_nets, 3);
    assert_eq!(stats.layer_count, 3);
    assert!(approx_eq(stats.trace_length_total, 25.0, 1e-9));
    assert_eq!(stats.total_thickness, Some(1600.0));
    assert!(approx_eq(stats.via_aspect_ratio.unwrap(), 1600.0 / 0.3, 1e-6));
}

#[test]
fn checks_run_names_every_group() {
    assert_eq!(
        CHECKS_RUN,
        ["boundary", "references", "geometry", "stackup", "rotation", "pins"]
    );
}

#[test]
fn missing_file_reports_file_io_error() {
    let outcome = load_board(&fixture("does_not_exist.json"));
    assert_eq!(kinds(&outcome.errors), [DefectKind::FileIoError]);
}
