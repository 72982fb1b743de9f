//! Coordinate parsing and permissive shape building.
//!
//! Two coordinate encodings are accepted:
//!
//! ```text
//! flat:   [x1, y1, x2, y2, ...]
//! paired: [[x1, y1], [x2, y2], ...]
//! ```
//!
//! Risky sub-structures (the boundary, trace paths, keepout shapes) never
//! abort a parse. [`ShapeBuilder`] degrades them to an absent or empty value
//! and records a `MALFORMED_COORDINATES` warning explaining why.

use serde_json::Value;

use super::defect::{Defect, DefectKind};
use super::error::{BoardError, CoordinateError};
use super::geometry::{Circle, Point, Polygon, Polyline};
use super::model::KeepoutShape;

/// Parses a coordinate array in either encoding.
///
/// # Errors
///
/// - [`CoordinateError::Empty`] for an empty array or a non-array
/// - [`CoordinateError::OddLength`] for a flat array of odd length
/// - [`CoordinateError::Unrecognized`] for mixed or malformed nesting
/// - [`CoordinateError::Geometry`] if a number does not form a finite point
pub fn parse_coordinates(raw: &Value) -> Result<Vec<Point>, CoordinateError> {
    let items = match raw {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) | Value::Null => return Err(CoordinateError::Empty),
        _ => return Err(CoordinateError::Unrecognized),
    };

    if items.iter().all(Value::is_number) {
        if items.len() % 2 != 0 {
            return Err(CoordinateError::OddLength { len: items.len() });
        }
        return items
            .chunks_exact(2)
            .map(|pair| point_from_numbers(&pair[0], &pair[1]))
            .collect();
    }

    items
        .iter()
        .map(|item| match item.as_array().map(Vec::as_slice) {
            Some([x, y]) if x.is_number() && y.is_number() => point_from_numbers(x, y),
            _ => Err(CoordinateError::Unrecognized),
        })
        .collect()
}

/// Parses a single `[x, y]` pair.
///
/// # Errors
///
/// Returns [`CoordinateError::Unrecognized`] unless `raw` is a two-element
/// numeric array.
pub fn parse_point(raw: &Value) -> Result<Point, CoordinateError> {
    match raw.as_array().map(Vec::as_slice) {
        Some([x, y]) => point_from_numbers(x, y),
        _ => Err(CoordinateError::Unrecognized),
    }
}

fn point_from_numbers(x: &Value, y: &Value) -> Result<Point, CoordinateError> {
    match (x.as_f64(), y.as_f64()) {
        (Some(x), Some(y)) => Ok(Point::new(x, y)?),
        _ => Err(CoordinateError::Unrecognized),
    }
}

/// Parses a required point field, locating failures at `path`.
///
/// # Errors
///
/// Returns [`BoardError::Coordinates`] if the value is not a valid pair.
pub fn required_point(raw: &Value, path: &str) -> Result<Point, BoardError> {
    parse_point(raw).map_err(|e| BoardError::coordinates(path, e))
}

/// Builds risky shapes, degrading failures instead of propagating them.
#[derive(Debug, Default)]
pub struct ShapeBuilder {
    warnings: Vec<Defect>,
}

impl ShapeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings recorded so far, in build order.
    #[must_use]
    pub fn warnings(&self) -> &[Defect] {
        &self.warnings
    }

    /// Consumes the builder, returning its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Defect> {
        self.warnings
    }

    fn degrade(&mut self, path: &str, what: &str, cause: &dyn std::fmt::Display) {
        tracing::warn!(path, %cause, "Malformed {what}, treating as absent");
        self.warnings.push(
            Defect::warning(
                DefectKind::MalformedCoordinates,
                format!("Malformed {what}: {cause}"),
                path,
            )
            .with_context("cause", cause.to_string()),
        );
    }

    /// Builds the board outline from the `boundary` section.
    ///
    /// A section without `coordinates` yields `None` silently; the validator
    /// reports it as a missing boundary.
    pub fn boundary(&mut self, raw: Option<&Value>) -> Option<Polygon> {
        let coords = raw?.get("coordinates")?;
        let path = "$.boundary.coordinates";
        match parse_coordinates(coords) {
            Ok(points) => match Polygon::new(points) {
                Ok(polygon) => Some(polygon),
                Err(e) => {
                    self.degrade(path, "boundary", &e);
                    None
                }
            },
            Err(e) => {
                self.degrade(path, "boundary", &e);
                None
            }
        }
    }

    /// Builds a trace centre-line. Failures give an empty path.
    pub fn trace_path(&mut self, trace_id: &str, raw: &Value) -> Polyline {
        let path = format!("$.traces.{trace_id}.path.coordinates");
        let Some(coords) = raw.get("coordinates") else {
            self.degrade(&path, "trace path", &CoordinateError::Empty);
            return Polyline::default();
        };
        match parse_coordinates(coords) {
            Ok(points) => Polyline::new(points),
            Err(e) => {
                self.degrade(&path, "trace path", &e);
                Polyline::default()
            }
        }
    }

    /// Builds a keepout region from its `shape` descriptor.
    ///
    /// `{"type": "circle", "center": [x, y], "radius": r}` gives a circle;
    /// any other object with `coordinates` gives a polygon. Everything else,
    /// including a missing shape, is [`KeepoutShape::Absent`].
    pub fn keepout_shape(&mut self, index: usize, raw: Option<&Value>) -> KeepoutShape {
        let path = format!("$.keepouts[{index}].shape");
        let Some(shape) = raw.and_then(Value::as_object) else {
            if raw.is_some_and(|v| !v.is_null()) {
                self.degrade(&path, "keepout shape", &"shape is not an object");
            }
            return KeepoutShape::Absent;
        };

        let kind = shape
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();

        if kind == "circle" {
            let center = shape.get("center").map(parse_point);
            let radius = shape.get("radius").and_then(Value::as_f64);
            let built = match (center, radius) {
                (Some(Ok(center)), Some(radius)) => {
                    Circle::new(center, radius).map_err(|e| e.to_string())
                }
                (Some(Err(e)), _) => Err(format!("center: {e}")),
                (None, _) => Err("missing center".to_string()),
                (_, None) => Err("missing or non-numeric radius".to_string()),
            };
            return match built {
                Ok(circle) => KeepoutShape::Circle(circle),
                Err(cause) => {
                    self.degrade(&path, "circle keepout", &cause);
                    KeepoutShape::Absent
                }
            };
        }

        let Some(coords) = shape.get("coordinates") else {
            self.degrade(&path, "keepout shape", &format!("unsupported shape type '{kind}'"));
            return KeepoutShape::Absent;
        };
        let built = parse_coordinates(coords)
            .map_err(|e| e.to_string())
            .and_then(|points| Polygon::new(points).map_err(|e| e.to_string()));
        match built {
            Ok(polygon) => KeepoutShape::Polygon(polygon),
            Err(cause) => {
                self.degrade(&path, "polygon keepout", &cause);
                KeepoutShape::Absent
            }
        }
    }
}
