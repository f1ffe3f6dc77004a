//! Verdict CLI entry point.
//!
//! Provides the `verdict` binary with subcommands for rendering verification
//! reports to HTML, browsing them in the terminal, and summarizing them.

mod cli_contract;
mod cli_handlers;
mod cli_normalize;

use clap::error::{Error as ClapError, ErrorKind};
use clap::Parser;
use cli_contract::{AppExit, Cli, OutputMode, QUICK_HELP};
use cli_handlers::{emit_json_error, emit_json_success, handle_command};
use cli_normalize::{normalize_args, sniff_output_mode};
use serde_json::json;
use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    run(env::args().collect()).code()
}

fn run(raw_args: Vec<String>) -> AppExit {
    let stdout_is_tty = io::stdout().is_terminal();
    if raw_args.len() <= 1 {
        return quick_help(sniff_output_mode(&raw_args, stdout_is_tty));
    }

    let early_mode = sniff_output_mode(&raw_args, stdout_is_tty);
    let (args, repair_notes) = normalize_args(raw_args);
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            let mode = OutputMode::resolve(cli.json, cli.human, stdout_is_tty);
            handle_command(cli, mode, &repair_notes)
        }
        // --help and --version surface as parse "errors" in clap.
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            AppExit::Success
        }
        Err(err) => reject_args(&err, early_mode, &repair_notes),
    }
}

fn quick_help(mode: OutputMode) -> AppExit {
    match mode {
        OutputMode::Json => emit_json_success(
            "OK",
            "Quick help emitted.",
            Some("help"),
            AppExit::Success as u8,
            &[],
            json!({ "quick_help": QUICK_HELP }),
        ),
        OutputMode::Human => println!("{QUICK_HELP}"),
    }
    AppExit::Success
}

fn reject_args(err: &ClapError, mode: OutputMode, repair_notes: &[String]) -> AppExit {
    let (message, suggestions) = parse_error_guidance(err.kind());
    match mode {
        OutputMode::Json => emit_json_error(
            "INVALID_ARGS",
            message,
            &suggestions,
            repair_notes,
            AppExit::InvalidArgs as u8,
        ),
        OutputMode::Human => {
            for note in repair_notes {
                eprintln!("Note: {note}");
            }
            eprintln!("{err}");
            for (n, suggestion) in suggestions.iter().enumerate() {
                eprintln!("Hint {}: {suggestion}", n + 1);
            }
        }
    }
    AppExit::InvalidArgs
}

/// Logs go to stderr so robot JSON on stdout stays parseable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn parse_error_guidance(kind: ErrorKind) -> (&'static str, Vec<String>) {
    match kind {
        ErrorKind::InvalidSubcommand => (
            "Unknown subcommand.",
            vec![
                "Use one of: `verdict render`, `verdict view`, or `verdict summary`.".to_string(),
                "Run `verdict --help` for full command syntax.".to_string(),
            ],
        ),
        ErrorKind::UnknownArgument => (
            "Unknown flag or option.",
            vec![
                "Run `verdict --help` for global flags.".to_string(),
                "Run `verdict <command> --help` to inspect command-specific flags.".to_string(),
            ],
        ),
        ErrorKind::MissingRequiredArgument => (
            "Missing required argument.",
            vec![
                "Example: `verdict view <report.json>`.".to_string(),
                "Example: `verdict render <index-url> --output dashboard.html`.".to_string(),
            ],
        ),
        ErrorKind::ArgumentConflict => (
            "Conflicting flags or arguments.",
            vec![
                "Use either `--json` or `--human`, but not both.".to_string(),
                "Run `verdict --help` to review valid flag combinations.".to_string(),
            ],
        ),
        ErrorKind::InvalidValue => (
            "Invalid value for an option.",
            vec![
                "`--mode` accepts auto, single, or index.".to_string(),
                "`--timeout-secs` takes a whole number of seconds.".to_string(),
            ],
        ),
        _ => (
            "Invalid command syntax.",
            vec![
                "Run `verdict --help` for command syntax.".to_string(),
                "Run `verdict <command> --help` for command-specific args.".to_string(),
            ],
        ),
    }
}
