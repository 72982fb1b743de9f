//! Structured defects shared by the parser and the validator.
//!
//! Parse-time failures and semantic findings use one closed [`DefectKind`]
//! enumeration, so consumers always match on a single discriminated type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every defect the pipeline can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectKind {
    /// Board has no boundary, or one with fewer than three points.
    MissingBoundary,
    /// A coordinate array could not be parsed.
    MalformedCoordinates,
    /// Component rotation outside [0, 360].
    InvalidRotation,
    /// Trace references a net that does not exist.
    DanglingTrace,
    /// Trace width is zero or negative.
    NegativeWidth,
    /// Board has neither components nor traces.
    EmptyBoard,
    /// Via hole is not smaller than its diameter.
    InvalidViaGeometry,
    /// Trace or via references a layer missing from the stackup.
    NonexistentLayer,
    /// Via or pin references a net that does not exist.
    NonexistentNet,
    /// Boundary polygon crosses itself.
    SelfIntersectingBoundary,
    /// Component origin lies outside the boundary.
    ComponentOutsideBoundary,
    /// Pin's owning-component name does not match its component.
    InvalidPinReference,
    /// Stackup is empty or its layer indices have gaps.
    MalformedStackup,
    /// `metadata.designUnits` is not a supported unit.
    InvalidUnitSpecification,
    /// Trace path has fewer than two points.
    MalformedTrace,
    /// Input is not valid JSON.
    MalformedJson,
    /// Input file could not be read.
    FileIoError,
    /// Board could not be assembled from the document.
    ParseError,
}

impl DefectKind {
    /// Returns the wire name, e.g. `"DANGLING_TRACE"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingBoundary => "MISSING_BOUNDARY",
            Self::MalformedCoordinates => "MALFORMED_COORDINATES",
            Self::InvalidRotation => "INVALID_ROTATION",
            Self::DanglingTrace => "DANGLING_TRACE",
            Self::NegativeWidth => "NEGATIVE_WIDTH",
            Self::EmptyBoard => "EMPTY_BOARD",
            Self::InvalidViaGeometry => "INVALID_VIA_GEOMETRY",
            Self::NonexistentLayer => "NONEXISTENT_LAYER",
            Self::NonexistentNet => "NONEXISTENT_NET",
            Self::SelfIntersectingBoundary => "SELF_INTERSECTING_BOUNDARY",
            Self::ComponentOutsideBoundary => "COMPONENT_OUTSIDE_BOUNDARY",
            Self::InvalidPinReference => "INVALID_PIN_REFERENCE",
            Self::MalformedStackup => "MALFORMED_STACKUP",
            Self::InvalidUnitSpecification => "INVALID_UNIT_SPECIFICATION",
            Self::MalformedTrace => "MALFORMED_TRACE",
            Self::MalformedJson => "MALFORMED_JSON",
            Self::FileIoError => "FILE_IO_ERROR",
            Self::ParseError => "PARSE_ERROR",
        }
    }
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a defect is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks downstream use under a strict policy.
    Error,
    /// Degraded input that was recovered from.
    Warning,
    /// Informational only.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARNING"),
            Self::Info => write!(f, "INFO"),
        }
    }
}

/// A single structured finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    /// What went wrong.
    #[serde(rename = "code")]
    pub kind: DefectKind,

    /// How serious it is.
    pub severity: Severity,

    /// Human-readable description.
    pub message: String,

    /// JSON path of the offending field, e.g. `$.traces.t1.net_name`.
    pub json_path: String,

    /// Auxiliary machine-readable fields (offending id, available options, ...).
    pub context: Option<Map<String, Value>>,
}

impl Defect {
    /// Creates an ERROR-severity defect without context.
    pub fn error(kind: DefectKind, message: impl Into<String>, json_path: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            json_path: json_path.into(),
            context: None,
        }
    }

    /// Creates a WARNING-severity defect without context.
    pub fn warning(
        kind: DefectKind,
        message: impl Into<String>,
        json_path: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message, json_path)
        }
    }

    /// Attaches a context entry, creating the map on first use.
    #[must_use]
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Returns `true` for ERROR severity.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} at {}",
            self.severity, self.kind, self.message, self.json_path
        )?;
        if let Some(ref context) = self.context {
            write!(f, " context={}", Value::Object(context.clone()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serialises_to_wire_name() {
        let json = serde_json::to_string(&DefectKind::InvalidViaGeometry).unwrap();
        assert_eq!(json, "\"INVALID_VIA_GEOMETRY\"");
        assert_eq!(DefectKind::FileIoError.to_string(), "FILE_IO_ERROR");
    }

    #[test]
    fn defect_display_without_context() {
        let defect = Defect::error(DefectKind::EmptyBoard, "Board has no components or traces", "$");
        assert_eq!(
            defect.to_string(),
            "[ERROR] EMPTY_BOARD: Board has no components or traces at $"
        );
    }

    #[test]
    fn context_is_built_incrementally() {
        let defect = Defect::error(DefectKind::DanglingTrace, "msg", "$.traces.t1.net_name")
            .with_context("trace_id", "t1")
            .with_context("available_nets", vec!["GND"]);
        let context = defect.context.unwrap();
        assert_eq!(context["trace_id"], "t1");
        assert_eq!(context["available_nets"], serde_json::json!(["GND"]));
    }

    #[test]
    fn defect_serialises_kind_as_code() {
        let defect = Defect::warning(DefectKind::MalformedCoordinates, "bad", "$.boundary");
        let value = serde_json::to_value(&defect).unwrap();
        assert_eq!(value["code"], "MALFORMED_COORDINATES");
        assert_eq!(value["severity"], "WARNING");
        assert!(value["context"].is_null());
    }
}
