//! Semantic validation.
//!
//! [`validate`] runs every check against a board and returns all defects in
//! one pass. It never fails; an empty list is the only clean result. Checks
//! run in a fixed order so the output is stable across runs.

use std::collections::BTreeSet;

use serde_json::Value;

use super::defect::{Defect, DefectKind};
use super::model::{Board, Component};

/// Names of the check groups run by [`validate`].
pub const CHECKS_RUN: [&str; 6] = ["boundary", "references", "geometry", "stackup", "rotation", "pins"];

/// Sorted, de-duplicated name lists for "available options" context.
struct NameSets<'a> {
    nets: BTreeSet<&'a str>,
    layers: BTreeSet<&'a str>,
}

impl<'a> NameSets<'a> {
    fn new(board: &'a Board) -> Self {
        Self {
            nets: board.net_names().collect(),
            layers: board.stackup.layer_names().collect(),
        }
    }

    fn has_net(&self, name: Option<&str>) -> bool {
        name.is_some_and(|n| self.nets.contains(n))
    }

    fn has_layer(&self, name: Option<&str>) -> bool {
        name.is_some_and(|n| self.layers.contains(n))
    }

    fn net_list(&self) -> Vec<&'a str> {
        self.nets.iter().copied().collect()
    }

    fn layer_list(&self) -> Vec<&'a str> {
        self.layers.iter().copied().collect()
    }
}

/// Validates `board`, returning every defect found.
#[must_use]
pub fn validate(board: &Board) -> Vec<Defect> {
    let names = NameSets::new(board);
    let mut defects = Vec::new();

    check_boundary_present(board, &mut defects);
    check_traces(board, &names, &mut defects);
    check_vias(board, &names, &mut defects);
    check_not_empty(board, &mut defects);
    check_boundary_simple(board, &mut defects);
    check_components(board, &names, &mut defects);
    check_stackup(board, &mut defects);

    tracing::debug!(count = defects.len(), "Validation finished");
    defects
}

fn check_boundary_present(board: &Board, defects: &mut Vec<Defect>) {
    if board.boundary.as_ref().map_or(true, |b| b.points().len() < 3) {
        defects.push(Defect::error(
            DefectKind::MissingBoundary,
            "Board has no boundary defined",
            "$.boundary",
        ));
    }
}

fn check_traces(board: &Board, names: &NameSets<'_>, defects: &mut Vec<Defect>) {
    for (id, trace) in &board.traces {
        let base = format!("$.traces.{id}");

        if trace.path.points.len() < 2 {
            defects.push(
                Defect::error(
                    DefectKind::MalformedTrace,
                    format!("Trace {id} must contain at least 2 points"),
                    format!("{base}.path.coordinates"),
                )
                .with_context("trace_id", id.as_str())
                .with_context("point_count", trace.path.points.len()),
            );
        }

        if !names.has_net(Some(&trace.net_name)) {
            defects.push(
                Defect::error(
                    DefectKind::DanglingTrace,
                    format!("Trace {id} references unknown net {}", trace.net_name),
                    format!("{base}.net_name"),
                )
                .with_context("trace_id", id.as_str())
                .with_context("referenced_net", trace.net_name.as_str())
                .with_context("available_nets", names.net_list()),
            );
        }

        if !names.has_layer(Some(&trace.layer)) {
            defects.push(
                Defect::error(
                    DefectKind::NonexistentLayer,
                    format!("Trace {id} references unknown layer {}", trace.layer),
                    format!("{base}.layer_hash"),
                )
                .with_context("trace_id", id.as_str())
                .with_context("referenced_layer", trace.layer.as_str())
                .with_context("available_layers", names.layer_list()),
            );
        }

        if trace.width <= 0.0 {
            defects.push(
                Defect::error(
                    DefectKind::NegativeWidth,
                    format!("Trace {id} width must be positive"),
                    format!("{base}.width"),
                )
                .with_context("trace_id", id.as_str())
                .with_context("width", trace.width),
            );
        }
    }
}

fn check_vias(board: &Board, names: &NameSets<'_>, defects: &mut Vec<Defect>) {
    for (id, via) in &board.vias {
        let base = format!("$.vias.{id}");

        if !names.has_net(Some(&via.net_name)) {
            defects.push(
                Defect::error(
                    DefectKind::NonexistentNet,
                    format!("Via {id} references unknown net {}", via.net_name),
                    format!("{base}.net_name"),
                )
                .with_context("via_id", id.as_str())
                .with_context("referenced_net", via.net_name.as_str())
                .with_context("available_nets", names.net_list()),
            );
        }

        if via.hole_size >= via.diameter {
            defects.push(
                Defect::error(
                    DefectKind::InvalidViaGeometry,
                    format!("Via {id} hole_size must be smaller than diameter"),
                    format!("{base}.hole_size"),
                )
                .with_context("via_id", id.as_str())
                .with_context("hole_size", via.hole_size)
                .with_context("diameter", via.diameter),
            );
        }

        let start = via.span.start_layer.as_deref();
        let end = via.span.end_layer.as_deref();
        if !names.has_layer(start) || !names.has_layer(end) {
            defects.push(
                Defect::error(
                    DefectKind::NonexistentLayer,
                    format!("Via {id} references unknown layer"),
                    format!("{base}.span"),
                )
                .with_context("via_id", id.as_str())
                .with_context("start_layer", start)
                .with_context("end_layer", end)
                .with_context("available_layers", names.layer_list()),
            );
        }
    }
}

fn check_not_empty(board: &Board, defects: &mut Vec<Defect>) {
    if board.components.is_empty() && board.traces.is_empty() {
        defects.push(Defect::error(
            DefectKind::EmptyBoard,
            "Board has no components or traces",
            "$",
        ));
    }
}

fn check_boundary_simple(board: &Board, defects: &mut Vec<Defect>) {
    if board.boundary.as_ref().is_some_and(|b| b.is_self_intersecting()) {
        defects.push(Defect::error(
            DefectKind::SelfIntersectingBoundary,
            "Board boundary self-intersects",
            "$.boundary.coordinates",
        ));
    }
}

/// Placement, rotation and pin checks.
///
/// The whole group is skipped when the board has no boundary, so rotation
/// and pin problems go unreported alongside `MISSING_BOUNDARY`. Rotation is
/// re-checked here even though [`Transform::new`](super::model::Transform::new)
/// enforces it, since a board can be patched after assembly.
fn check_components(board: &Board, names: &NameSets<'_>, defects: &mut Vec<Defect>) {
    let Some(ref boundary) = board.boundary else {
        return;
    };

    for (id, component) in &board.components {
        let base = format!("$.components.{id}");
        let position = component.transform.position;

        if !boundary.contains_point(&position) {
            defects.push(
                Defect::error(
                    DefectKind::ComponentOutsideBoundary,
                    format!("Component {id} lies outside boundary"),
                    format!("{base}.transform.position"),
                )
                .with_context("component", id.as_str())
                .with_context("position", vec![position.x(), position.y()]),
            );
        }

        let rotation = component.transform.rotation;
        if !(0.0..=360.0).contains(&rotation) {
            defects.push(
                Defect::error(
                    DefectKind::InvalidRotation,
                    format!("Component {id} rotation must be 0-360"),
                    format!("{base}.transform.rotation"),
                )
                .with_context("component", id.as_str())
                .with_context("rotation", rotation),
            );
        }

        check_pins(id, component, names, defects);
    }
}

fn check_pins(id: &str, component: &Component, names: &NameSets<'_>, defects: &mut Vec<Defect>) {
    for (pin_id, pin) in &component.pins {
        let base = format!("$.components.{id}.pins.{pin_id}");

        if pin.comp_name != component.name {
            defects.push(
                Defect::error(
                    DefectKind::InvalidPinReference,
                    format!(
                        "Pin {pin_id} references {} not {}",
                        pin.comp_name, component.name
                    ),
                    format!("{base}.comp_name"),
                )
                .with_context("component", id)
                .with_context("pin", pin_id.as_str())
                .with_context("comp_name", pin.comp_name.as_str()),
            );
        }

        let net = pin.net_name.as_deref();
        if !names.has_net(net) {
            defects.push(
                Defect::error(
                    DefectKind::NonexistentNet,
                    format!(
                        "Pin {pin_id} references unknown net {}",
                        net.unwrap_or("None")
                    ),
                    format!("{base}.net_name"),
                )
                .with_context("component", id)
                .with_context("pin", pin_id.as_str())
                .with_context("referenced_net", net.map_or(Value::Null, Value::from))
                .with_context("available_nets", names.net_list()),
            );
        }
    }
}

fn check_stackup(board: &Board, defects: &mut Vec<Defect>) {
    let layers = &board.stackup.layers;
    if layers.is_empty() {
        defects.push(Defect::error(
            DefectKind::MalformedStackup,
            "Stackup has no layers",
            "$.stackup.layers",
        ));
        return;
    }

    let mut indices: Vec<i64> = layers.iter().map(|l| l.index).collect();
    indices.sort_unstable();
    let contiguous = indices
        .windows(2)
        .all(|pair| pair[0].checked_add(1) == Some(pair[1]));

    if !contiguous {
        defects.push(
            Defect::error(
                DefectKind::MalformedStackup,
                "Stackup layer indices are not contiguous",
                "$.stackup.layers",
            )
            .with_context("indices", indices),
        );
    }
}
