//! Structured JSON export of a pipeline run.
//!
//! The payload layout is a public contract for downstream tooling; any
//! incompatible change must bump [`SCHEMA_VERSION`].

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::defect::Defect;
use super::error::{BoardError, BoardResult};
use super::model::Board;
use super::stats::{compute_stats, BoardStats};
use super::validate::CHECKS_RUN;
use super::ParseOutcome;

/// Version of the export layout.
pub const SCHEMA_VERSION: &str = "1.0";

/// Parsing half of the payload.
#[derive(Debug, Serialize)]
pub struct ParseSection<'a> {
    /// Whether a board was produced.
    pub success: bool,
    /// Fatal parse defects.
    pub errors: &'a [Defect],
    /// Degraded sub-structures.
    pub warnings: &'a [Defect],
    /// The parsed board, when parsing succeeded.
    pub board: Option<&'a Board>,
    /// Board statistics, when parsing succeeded.
    pub stats: Option<BoardStats>,
}

/// Validation half of the payload.
#[derive(Debug, Serialize)]
pub struct ValidationSection<'a> {
    /// Parsing succeeded and validation found no errors.
    pub valid: bool,
    /// Number of error-severity defects.
    pub error_count: usize,
    /// Number of other defects.
    pub warning_count: usize,
    /// Error-severity defects.
    pub errors: Vec<&'a Defect>,
    /// Other defects.
    pub warnings: Vec<&'a Defect>,
    /// Check groups that ran; empty when parsing failed.
    pub checks_run: &'static [&'static str],
}

/// Everything known about one board after parsing and validation.
#[derive(Debug, Serialize)]
pub struct ExportPayload<'a> {
    /// Always [`SCHEMA_VERSION`].
    pub schema_version: &'static str,
    /// The board file as given by the caller.
    pub input_file: String,
    /// Parse stage result.
    pub parse_result: ParseSection<'a>,
    /// Validation stage result.
    pub validation_result: ValidationSection<'a>,
}

impl<'a> ExportPayload<'a> {
    /// Builds the payload from the parse outcome and the validation defects.
    #[must_use]
    pub fn build(input_file: &Path, outcome: &'a ParseOutcome, validation: &'a [Defect]) -> Self {
        let success = outcome.is_success();
        let board = outcome.board.as_ref().filter(|_| success);
        let (errors, warnings): (Vec<&Defect>, Vec<&Defect>) =
            validation.iter().partition(|d| d.is_error());
        let checks_run: &'static [&'static str] = if success { &CHECKS_RUN } else { &[] };

        Self {
            schema_version: SCHEMA_VERSION,
            input_file: input_file.display().to_string(),
            parse_result: ParseSection {
                success,
                errors: &outcome.errors,
                warnings: &outcome.warnings,
                board,
                stats: board.map(compute_stats),
            },
            validation_result: ValidationSection {
                valid: success && errors.is_empty(),
                error_count: errors.len(),
                warning_count: warnings.len(),
                errors,
                warnings,
                checks_run,
            },
        }
    }
}

/// Writes `payload` as JSON to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`BoardError::Json`] if serialisation fails and
/// [`BoardError::FileWrite`] if the file or its directory cannot be written.
pub fn write_export(path: &Path, payload: &ExportPayload<'_>, pretty: bool) -> BoardResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BoardError::file_write(parent, e))?;
    }
    fs::write(path, json).map_err(|e| BoardError::file_write(path, e))?;

    tracing::debug!(path = %path.display(), "Wrote export payload");
    Ok(())
}
