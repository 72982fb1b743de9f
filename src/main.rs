//! pcb-validator: parse, normalise and validate ECAD JSON board files.
//!
//! Defects go to stderr, statistics (with `--stats`) to stdout. The exit code
//! is 0 for a usable board and 1 otherwise.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, Level};
use tracing_subscriber::EnvFilter;

use pcb_validator::board::{self, compute_stats, validate, write_export, Defect, ExportPayload};
use pcb_validator::config;

/// Parse, normalise and validate an ECAD JSON board file.
#[derive(Parser, Debug)]
#[command(name = "pcb-validator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board JSON file to check
    #[arg(value_name = "BOARD")]
    board: PathBuf,

    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Succeed even if validation finds errors
    #[arg(long)]
    permissive: bool,

    /// Write the structured result to this JSON file
    #[arg(long, value_name = "FILE")]
    export_json: Option<PathBuf>,

    /// Print board statistics as JSON on stdout
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_defects(defects: &[Defect]) {
    for defect in defects {
        eprintln!("{defect}");
    }
}

fn print_stats(board: &board::Board) {
    match serde_json::to_string_pretty(&compute_stats(board)) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Failed to serialise statistics"),
    }
}

fn summary(path: &Path, error_count: usize) -> String {
    if error_count == 0 {
        format!("Board is valid: {}", path.display())
    } else {
        format!(
            "Board has {error_count} validation error(s), accepted in permissive mode: {}",
            path.display()
        )
    }
}

/// Entry point for the pcb-validator CLI.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    let permissive = args.permissive || cfg.validation.permissive;
    info!(board = %args.board.display(), permissive, "Checking board");

    let outcome = board::load_board(&args.board);
    print_defects(&outcome.errors);
    print_defects(&outcome.warnings);

    let defects = outcome.board.as_ref().map(validate).unwrap_or_default();
    print_defects(&defects);
    let error_count = defects.iter().filter(|d| d.is_error()).count();
    debug!(
        parse_errors = outcome.errors.len(),
        parse_warnings = outcome.warnings.len(),
        validation_errors = error_count,
        "Pipeline finished"
    );

    if args.stats {
        if let Some(ref parsed) = outcome.board {
            print_stats(parsed);
        }
    }

    if let Some(ref export_path) = args.export_json {
        let payload = ExportPayload::build(&args.board, &outcome, &defects);
        if let Err(e) = write_export(export_path, &payload, cfg.export.pretty) {
            error!(error = %e, "Failed to write export");
            eprintln!("Export error: {e}");
            return ExitCode::FAILURE;
        }
        info!(path = %export_path.display(), "Export written");
    }

    if !outcome.is_success() || (error_count > 0 && !permissive) {
        return ExitCode::FAILURE;
    }

    if !args.quiet {
        println!("{}", summary(&args.board, error_count));
    }
    ExitCode::SUCCESS
}
