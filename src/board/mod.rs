//! ECAD board parsing and validation.
//!
//! A board document goes through four stages:
//!
//! 1. [`read_board_file`] / [`parse_board_json`]: bytes to a JSON value
//! 2. [`units::normalize_units`]: every spatial number rescaled to millimetres
//! 3. [`assemble::assemble_board`]: raw document to a typed [`Board`]
//! 4. [`validate::validate`]: semantic checks
//!
//! Nothing in this pipeline returns an error. Each stage reports its problems
//! as [`Defect`] values so a caller can show everything at once; a stage that
//! produces an error-severity defect stops the stages after it.

pub mod assemble;
pub mod defect;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod shapes;
pub mod stats;
pub mod transform;
pub mod units;
pub mod validate;

use std::error::Error as _;
use std::fs;
use std::path::Path;

use serde_json::Value;

pub use defect::{Defect, DefectKind, Severity};
pub use error::{BoardError, BoardResult, CoordinateError, GeometryError};
pub use export::{write_export, ExportPayload};
pub use model::Board;
pub use stats::{compute_stats, BoardStats};
pub use validate::{validate, CHECKS_RUN};

use shapes::ShapeBuilder;

/// Result of the parsing half of the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// The assembled board, present only when `errors` is empty.
    pub board: Option<Board>,
    /// Fatal defects.
    pub errors: Vec<Defect>,
    /// Degraded sub-structures that did not stop parsing.
    pub warnings: Vec<Defect>,
}

impl ParseOutcome {
    /// An outcome that failed with the given defects.
    #[must_use]
    pub const fn failed(errors: Vec<Defect>) -> Self {
        Self {
            board: None,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Returns `true` if a board was produced.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.board.is_some()
    }
}

/// Reads a board file as UTF-8 text.
///
/// An unreadable file yields one `FILE_IO_ERROR` defect at `$`.
#[must_use]
pub fn read_board_file(path: &Path) -> (Option<String>, Vec<Defect>) {
    match read_text(path) {
        Ok(text) => {
            tracing::debug!(path = %path.display(), bytes = text.len(), "Read board file");
            (Some(text), Vec::new())
        }
        Err(err) => {
            tracing::debug!(error = %err, "Board file unreadable");
            let cause = err
                .source()
                .map_or_else(|| err.to_string(), ToString::to_string);
            let defect = Defect::error(
                DefectKind::FileIoError,
                format!("Cannot read file: {cause}"),
                "$",
            );
            (None, vec![defect])
        }
    }
}

fn read_text(path: &Path) -> BoardResult<String> {
    fs::read_to_string(path).map_err(|e| BoardError::file_read(path, e))
}

/// Parses board text as JSON.
///
/// A syntax error yields one `MALFORMED_JSON` defect at `$`.
#[must_use]
pub fn parse_board_json(text: &str) -> (Option<Value>, Vec<Defect>) {
    match serde_json::from_str(text) {
        Ok(value) => (Some(value), Vec::new()),
        Err(err) => (
            None,
            vec![Defect::error(
                DefectKind::MalformedJson,
                format!("Invalid JSON: {err}"),
                "$",
            )],
        ),
    }
}

/// Normalises units and assembles a board from a parsed document.
#[must_use]
pub fn parse_board_data(mut data: Value) -> ParseOutcome {
    if let Err(defect) = units::normalize_units(&mut data) {
        tracing::debug!(%defect, "Unit normalisation failed");
        return ParseOutcome::failed(vec![defect]);
    }

    let mut shapes = ShapeBuilder::new();
    match assemble::assemble_board(data, &mut shapes) {
        Ok(board) => ParseOutcome {
            board: Some(board),
            errors: Vec::new(),
            warnings: shapes.into_warnings(),
        },
        Err(err) => ParseOutcome {
            board: None,
            errors: vec![parse_error(&err)],
            warnings: shapes.into_warnings(),
        },
    }
}

/// Runs the whole parsing half of the pipeline on a file.
#[must_use]
pub fn load_board(path: &Path) -> ParseOutcome {
    let (text, errors) = read_board_file(path);
    let Some(text) = text else {
        return ParseOutcome::failed(errors);
    };

    let (data, errors) = parse_board_json(&text);
    let Some(data) = data else {
        return ParseOutcome::failed(errors);
    };

    parse_board_data(data)
}

fn parse_error(err: &BoardError) -> Defect {
    tracing::debug!(error = %err, "Board assembly failed");
    Defect::error(
        DefectKind::ParseError,
        format!("Failed to parse board: {err}"),
        "$",
    )
}
