//! Board data model.
//!
//! Everything here is built once by the assembler. Fields are public so a
//! caller can patch a single value (for instance to manufacture a defect in a
//! test); only [`Point`] refuses mutation.

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use super::error::GeometryError;
use super::geometry::{Circle, Point, Polygon, Polyline};
use super::transform::Affine;

/// Which side of the board a component is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Top side.
    #[default]
    Front,
    /// Bottom side; placement mirrors X.
    Back,
}

/// Physical role of a stackup layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Top copper.
    #[serde(rename = "TOP")]
    TopCopper,
    /// Bottom copper.
    #[serde(rename = "BOTTOM")]
    BottomCopper,
    /// Internal signal routing layer.
    #[serde(rename = "MID")]
    InternalSignal,
    /// Internal power/ground plane.
    #[serde(rename = "PLANE")]
    InternalPlane,
    /// Insulating layer between copper layers.
    #[serde(rename = "DIELECTRIC")]
    Dielectric,
}

impl LayerKind {
    /// Whether the layer carries copper.
    #[must_use]
    pub const fn is_copper(self) -> bool {
        !matches!(self, Self::Dielectric)
    }
}

/// A single stackup layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name, referenced by traces and via spans.
    pub name: String,

    /// Layer role.
    #[serde(rename = "layer_type")]
    pub kind: LayerKind,

    /// Position in the stack, 0 at the top.
    #[serde(deserialize_with = "integral_index")]
    pub index: i64,

    /// Material properties (thickness, dielectric constant, ...).
    pub material: Map<String, Value>,
}

/// Accepts an integer, or a float with no fractional part such as `2.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
fn integral_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = Number::deserialize(deserializer)?;
    if let Some(index) = number.as_i64() {
        return Ok(index);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(de::Error::custom(format!(
            "layer index must be an integer, got {number}"
        ))),
    }
}

/// Ordered layers plus overall thickness.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stackup {
    /// Layers in document order.
    pub layers: Vec<Layer>,

    /// Board thickness as given in the document (not unit-scaled).
    #[serde(rename = "totalThickness", skip_serializing_if = "Option::is_none")]
    pub total_thickness: Option<f64>,
}

impl Stackup {
    /// Names of all layers.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }
}

/// An electrical net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    /// Net name, e.g. "GND".
    pub name: String,

    /// Classification, "SIGNAL" unless stated.
    #[serde(rename = "class", default = "default_net_class")]
    pub net_class: String,
}

impl Net {
    /// Creates a SIGNAL net.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            net_class: default_net_class(),
        }
    }
}

fn default_net_class() -> String {
    "SIGNAL".to_string()
}

/// Component placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transform {
    /// Component origin in board coordinates.
    pub position: Point,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f64,
    /// Placement side.
    pub side: Side,
}

impl Transform {
    /// Creates a transform.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::RotationOutOfRange`] unless `rotation` is in [0, 360].
    pub fn new(position: Point, rotation: f64, side: Side) -> Result<Self, GeometryError> {
        if !(0.0..=360.0).contains(&rotation) {
            return Err(GeometryError::RotationOutOfRange { rotation });
        }
        Ok(Self {
            position,
            rotation,
            side,
        })
    }
}

/// A component pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    /// Pin name within its component.
    pub name: String,
    /// Name of the owning component; compared by value, never dereferenced.
    pub comp_name: String,
    /// Connected net, if any.
    pub net_name: Option<String>,
    /// Pad shape descriptor, kept as given.
    pub shape: Map<String, Value>,
    /// Position relative to the component origin.
    pub position: Point,
    /// Rotation relative to the component, degrees.
    pub rotation: f64,
    /// Through-hole rather than SMD.
    pub is_throughhole: bool,
}

/// Component body dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Body width in mm.
    #[serde(default)]
    pub width: f64,
    /// Body height in mm.
    #[serde(default)]
    pub height: f64,
}

/// A placed component. Owns its pins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Internal name, the key pins refer back to.
    pub name: String,
    /// Reference designator, e.g. "R1".
    pub reference: String,
    /// Footprint identifier.
    pub footprint: String,
    /// Body size.
    pub outline: Outline,
    /// Placement.
    pub transform: Transform,
    /// Pins keyed by pin name.
    pub pins: IndexMap<String, Pin>,
    /// Position fixed by the user.
    pub user_preplaced: bool,
}

impl Component {
    /// Affine map from component-local to board coordinates.
    #[must_use]
    pub fn placement(&self) -> Affine {
        Affine::for_component(self)
    }

    /// Board-space position of `pin`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the mapped coordinates overflow.
    pub fn pin_position(&self, pin: &Pin) -> Result<Point, GeometryError> {
        self.placement().apply(&pin.position)
    }
}

/// A routed copper path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Unique trace id.
    pub uid: String,
    /// Net the trace belongs to.
    pub net_name: String,
    /// Layer the trace is routed on.
    #[serde(rename = "layer_hash")]
    pub layer: String,
    /// Centre-line path.
    pub path: Polyline,
    /// Copper width in mm.
    pub width: f64,
}

/// Start and end layers of a via.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaSpan {
    /// First layer the via connects.
    #[serde(default)]
    pub start_layer: Option<String>,
    /// Last layer the via connects.
    #[serde(default)]
    pub end_layer: Option<String>,
}

/// A plated hole between layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Via {
    /// Unique via id.
    pub uid: String,
    /// Net the via belongs to.
    pub net_name: String,
    /// Via centre.
    pub center: Point,
    /// Outer pad diameter in mm.
    pub diameter: f64,
    /// Drill diameter in mm.
    pub hole_size: f64,
    /// Layer span.
    pub span: ViaSpan,
}

/// Geometry of a keepout region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeepoutShape {
    /// Polygonal region.
    Polygon(Polygon),
    /// Circular region.
    Circle(Circle),
    /// The document's shape was missing or malformed.
    Absent,
}

impl KeepoutShape {
    /// Returns `true` if no usable shape was parsed.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether `point` falls inside the region. An absent shape contains nothing.
    #[must_use]
    pub fn contains_point(&self, point: &Point) -> bool {
        match self {
            Self::Polygon(polygon) => polygon.contains_point(point),
            Self::Circle(circle) => circle.contains_point(point),
            Self::Absent => false,
        }
    }
}

/// A region where placement or routing is disallowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keepout {
    /// Unique keepout id.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Layer the restriction applies to.
    pub layer: String,
    /// Region geometry.
    pub shape: KeepoutShape,
    /// What is disallowed, e.g. "ROUTING".
    pub keepout_type: String,
}

/// The assembled board.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Board {
    /// Free-form metadata; `designUnits` is "MILLIMETER" after parsing.
    pub metadata: Map<String, Value>,
    /// Board outline, absent when missing or malformed in the document.
    pub boundary: Option<Polygon>,
    /// Layer stackup.
    pub stackup: Stackup,
    /// All nets.
    pub nets: Vec<Net>,
    /// Components keyed by name.
    pub components: IndexMap<String, Component>,
    /// Traces keyed by id.
    pub traces: IndexMap<String, Trace>,
    /// Vias keyed by id.
    pub vias: IndexMap<String, Via>,
    /// Copper pours, kept opaque.
    pub pours: Value,
    /// Keepout regions.
    pub keepouts: Vec<Keepout>,
}

impl Board {
    /// Names of all nets.
    pub fn net_names(&self) -> impl Iterator<Item = &str> {
        self.nets.iter().map(|n| n.name.as_str())
    }
}
