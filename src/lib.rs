//! pcb-validator: parser, unit normaliser and semantic validator for ECAD
//! JSON printed-circuit-board descriptions.
//!
//! A board document is read, rescaled to millimetres, assembled into a typed
//! [`board::Board`] and checked. Every problem along the way is reported as a
//! structured [`board::Defect`] carrying a kind, a severity, a message, the
//! JSON path of the offending field and optional context.
//!
//! ```no_run
//! use std::path::Path;
//! use pcb_validator::board::{load_board, validate};
//!
//! let outcome = load_board(Path::new("board.json"));
//! if let Some(ref board) = outcome.board {
//!     for defect in validate(board) {
//!         eprintln!("{defect}");
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`board`]: Parsing pipeline, board model, validation, statistics, export
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Configuration error type

pub mod board;
pub mod config;
pub mod error;
