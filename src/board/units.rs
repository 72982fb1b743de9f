//! Unit normalisation.
//!
//! Board documents declare their linear unit in `metadata.designUnits`.
//! Every number under the spatial sections is rescaled to millimetres and the
//! declaration is rewritten to `"MILLIMETER"`, so later stages never rescale.

use std::fmt;

use serde_json::{Number, Value};

use super::defect::{Defect, DefectKind};

/// Top-level sections whose numbers are lengths.
pub const SPATIAL_SECTIONS: [&str; 6] =
    ["boundary", "components", "traces", "vias", "pours", "keepouts"];

/// Millimetres per micron.
pub const MICRON_TO_MM: f64 = 0.001;

/// JSON path of the unit declaration.
pub const DESIGN_UNITS_PATH: &str = "$.metadata.designUnits";

/// Supported source units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignUnits {
    /// Micrometres.
    Micron,
    /// Millimetres (canonical).
    Millimeter,
}

impl DesignUnits {
    /// Parses the exact document spelling; anything else is rejected.
    #[must_use]
    pub fn from_declaration(s: &str) -> Option<Self> {
        match s {
            "MICRON" => Some(Self::Micron),
            "MILLIMETER" => Some(Self::Millimeter),
            _ => None,
        }
    }

    /// Multiplier converting this unit to millimetres.
    #[must_use]
    pub const fn scale(self) -> f64 {
        match self {
            Self::Micron => MICRON_TO_MM,
            Self::Millimeter => 1.0,
        }
    }
}

impl fmt::Display for DesignUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Micron => write!(f, "MICRON"),
            Self::Millimeter => write!(f, "MILLIMETER"),
        }
    }
}

/// Reads the declared unit. A missing declaration means microns.
fn declared_units(data: &Value) -> Result<DesignUnits, Defect> {
    let Some(raw) = data.get("metadata").and_then(|m| m.get("designUnits")) else {
        tracing::debug!("No designUnits declared, assuming MICRON");
        return Ok(DesignUnits::Micron);
    };

    raw.as_str()
        .and_then(DesignUnits::from_declaration)
        .ok_or_else(|| {
            let shown = raw.as_str().map_or_else(|| raw.to_string(), str::to_string);
            Defect::error(
                DefectKind::InvalidUnitSpecification,
                format!("Unknown designUnits: {shown}"),
                DESIGN_UNITS_PATH,
            )
            .with_context("design_units", raw.clone())
            .with_context("supported_units", vec!["MICRON", "MILLIMETER"])
        })
}

/// Multiplies every number inside `value` by `scale`, in place.
///
/// Booleans and strings are left alone. A product that is not representable
/// as a JSON number keeps its original value.
pub fn scale_value(value: &mut Value, scale: f64) {
    match value {
        Value::Number(n) => {
            if let Some(scaled) = n.as_f64().and_then(|f| Number::from_f64(f * scale)) {
                *n = scaled;
            }
        }
        Value::Array(items) => {
            for item in items {
                scale_value(item, scale);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                scale_value(item, scale);
            }
        }
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

/// Normalises all spatial values of a raw board document to millimetres.
///
/// # Errors
///
/// Returns a single `INVALID_UNIT_SPECIFICATION` defect, leaving `data`
/// untouched, if the declared unit is not `MICRON` or `MILLIMETER`.
pub fn normalize_units(data: &mut Value) -> Result<DesignUnits, Defect> {
    let units = declared_units(data)?;
    let scale = units.scale();

    if let Value::Object(root) = data {
        for section in SPATIAL_SECTIONS {
            if let Some(value) = root.get_mut(section) {
                scale_value(value, scale);
            }
        }
        if let Some(Value::Object(metadata)) = root.get_mut("metadata") {
            metadata.insert(
                "designUnits".to_string(),
                Value::String(DesignUnits::Millimeter.to_string()),
            );
        }
    }

    tracing::debug!(%units, scale, "Normalised board units");
    Ok(units)
}
