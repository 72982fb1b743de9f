//! Board assembly.
//!
//! The normalised document is deserialised into loosely-typed raw records,
//! then each record is turned into its model type. Only intrinsic structural
//! invariants are enforced here (finite points, rotation range, required
//! fields); semantic soundness is the validator's job.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{BoardError, BoardResult};
use super::geometry::Point;
use super::model::{
    Board, Component, Keepout, Layer, Net, Outline, Pin, Side, Stackup, Trace, Transform, Via,
    ViaSpan,
};
use super::shapes::{required_point, ShapeBuilder};

#[derive(Debug, Deserialize)]
struct RawBoard {
    metadata: Map<String, Value>,
    #[serde(default)]
    boundary: Option<Value>,
    stackup: RawStackup,
    nets: Vec<Net>,
    components: IndexMap<String, RawComponent>,
    traces: IndexMap<String, RawTrace>,
    vias: IndexMap<String, RawVia>,
    #[serde(default = "empty_object")]
    pours: Value,
    #[serde(default)]
    keepouts: Vec<RawKeepout>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Deserialize)]
struct RawStackup {
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(rename = "totalThickness", default)]
    total_thickness: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTransform {
    #[serde(default)]
    position: Option<Value>,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    side: Side,
}

#[derive(Debug, Deserialize)]
struct RawPin {
    name: String,
    comp_name: String,
    #[serde(default)]
    net_name: Option<String>,
    shape: Map<String, Value>,
    #[serde(default)]
    position: Option<Value>,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    is_throughhole: bool,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    name: String,
    reference: String,
    footprint: String,
    outline: Outline,
    transform: RawTransform,
    pins: IndexMap<String, RawPin>,
    #[serde(default)]
    user_preplaced: bool,
}

#[derive(Debug, Deserialize)]
struct RawTrace {
    uid: String,
    net_name: String,
    layer_hash: String,
    path: Value,
    width: f64,
}

#[derive(Debug, Deserialize)]
struct RawVia {
    uid: String,
    net_name: String,
    center: Value,
    diameter: f64,
    hole_size: f64,
    span: ViaSpan,
}

#[derive(Debug, Deserialize)]
struct RawKeepout {
    uid: String,
    name: String,
    layer: String,
    #[serde(default)]
    shape: Option<Value>,
    keepout_type: String,
}

/// A missing position means the local origin.
fn position_or_origin(raw: Option<&Value>, path: &str) -> BoardResult<Point> {
    match raw {
        None | Some(Value::Null) => Ok(Point::origin()),
        Some(value) => required_point(value, path),
    }
}

impl RawPin {
    fn build(self, base: &str) -> BoardResult<Pin> {
        let position = position_or_origin(self.position.as_ref(), &format!("{base}.position"))?;
        Ok(Pin {
            name: self.name,
            comp_name: self.comp_name,
            net_name: self.net_name,
            shape: self.shape,
            position,
            rotation: self.rotation,
            is_throughhole: self.is_throughhole,
        })
    }
}

impl RawComponent {
    fn build(self, key: &str) -> BoardResult<Component> {
        let base = format!("$.components.{key}");
        let position = position_or_origin(
            self.transform.position.as_ref(),
            &format!("{base}.transform.position"),
        )?;
        let transform = Transform::new(position, self.transform.rotation, self.transform.side)
            .map_err(|e| BoardError::geometry(format!("{base}.transform.rotation"), e))?;

        let pins = self
            .pins
            .into_iter()
            .map(|(pin_key, pin)| {
                let pin = pin.build(&format!("{base}.pins.{pin_key}"))?;
                Ok((pin_key, pin))
            })
            .collect::<BoardResult<IndexMap<_, _>>>()?;

        Ok(Component {
            name: self.name,
            reference: self.reference,
            footprint: self.footprint,
            outline: self.outline,
            transform,
            pins,
            user_preplaced: self.user_preplaced,
        })
    }
}

impl RawVia {
    fn build(self, key: &str) -> BoardResult<Via> {
        let center = required_point(&self.center, &format!("$.vias.{key}.center"))?;
        Ok(Via {
            uid: self.uid,
            net_name: self.net_name,
            center,
            diameter: self.diameter,
            hole_size: self.hole_size,
            span: self.span,
        })
    }
}

/// Assembles a [`Board`] from a unit-normalised document.
///
/// Boundary, trace-path and keepout-shape problems are absorbed by `shapes`;
/// anything else that breaks a structural invariant is returned as an error.
///
/// # Errors
///
/// Returns [`BoardError::Json`] for missing or wrongly-typed fields,
/// [`BoardError::Coordinates`] for a malformed position or via centre, and
/// [`BoardError::Geometry`] for an out-of-range component rotation.
pub fn assemble_board(data: Value, shapes: &mut ShapeBuilder) -> BoardResult<Board> {
    let raw: RawBoard = serde_json::from_value(data)?;

    let boundary = shapes.boundary(raw.boundary.as_ref());

    let components = raw
        .components
        .into_iter()
        .map(|(key, component)| {
            let component = component.build(&key)?;
            Ok((key, component))
        })
        .collect::<BoardResult<IndexMap<_, _>>>()?;

    let traces = raw
        .traces
        .into_iter()
        .map(|(key, trace)| {
            let path = shapes.trace_path(&key, &trace.path);
            tracing::trace!(trace = %key, points = path.points.len(), "Built trace");
            let trace = Trace {
                uid: trace.uid,
                net_name: trace.net_name,
                layer: trace.layer_hash,
                path,
                width: trace.width,
            };
            (key, trace)
        })
        .collect();

    let vias = raw
        .vias
        .into_iter()
        .map(|(key, via)| {
            let via = via.build(&key)?;
            Ok((key, via))
        })
        .collect::<BoardResult<IndexMap<_, _>>>()?;

    let keepouts = raw
        .keepouts
        .into_iter()
        .enumerate()
        .map(|(index, keepout)| Keepout {
            shape: shapes.keepout_shape(index, keepout.shape.as_ref()),
            uid: keepout.uid,
            name: keepout.name,
            layer: keepout.layer,
            keepout_type: keepout.keepout_type,
        })
        .collect();

    let board = Board {
        metadata: raw.metadata,
        boundary,
        stackup: Stackup {
            layers: raw.stackup.layers,
            total_thickness: raw.stackup.total_thickness,
        },
        nets: raw.nets,
        components,
        traces,
        vias,
        pours: raw.pours,
        keepouts,
    };

    tracing::debug!(
        components = board.components.len(),
        traces = board.traces.len(),
        vias = board.vias.len(),
        keepouts = board.keepouts.len(),
        has_boundary = board.boundary.is_some(),
        "Assembled board"
    );
    Ok(board)
}
