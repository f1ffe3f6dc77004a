use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

/// Verdict: dashboards for bounded model checker verification reports.
#[derive(Parser)]
#[command(name = "verdict")]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Emit machine-readable JSON output.
    #[arg(long, global = true, conflicts_with = "human")]
    pub(crate) json: bool,

    /// Force human-readable output (overrides auto JSON in piped mode).
    #[arg(long, global = true)]
    pub(crate) human: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum UiProfileArg {
    Standard,
    Showcase,
}

/// How to read the document at the given location.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Detect index vs. report document by shape.
    Auto,
    /// The location is one report document.
    Single,
    /// The location is an index listing report documents.
    Index,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Write a self-contained HTML dashboard.
    #[command(alias = "html")]
    Render {
        /// Report or index location (http(s) URL, file:// URL, or path).
        location: String,

        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,

        /// Output HTML path.
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,

        /// Per-request timeout in seconds (default: wait indefinitely).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Open the terminal dashboard.
    #[command(alias = "viewer")]
    View {
        /// Report or index location (http(s) URL, file:// URL, or path).
        location: String,

        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,

        /// Presentation profile (style/layout only).
        #[arg(long, value_enum, default_value = "standard")]
        profile: UiProfileArg,

        /// Per-request timeout in seconds (default: wait indefinitely).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print status, counters and view-model hash per report.
    #[command(alias = "summarize")]
    Summary {
        /// Report or index location (http(s) URL, file:// URL, or path).
        location: String,

        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,

        /// Per-request timeout in seconds (default: wait indefinitely).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    /// Explicit flags win; otherwise a terminal gets text and a pipe gets JSON.
    pub(crate) fn resolve(json: bool, human: bool, stdout_is_tty: bool) -> Self {
        match (json, human, stdout_is_tty) {
            (true, _, _) => OutputMode::Json,
            (false, true, _) | (false, false, true) => OutputMode::Human,
            (false, false, false) => OutputMode::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AppExit {
    Success = 0,
    NotFound = 1,
    InvalidArgs = 2,
    ReportFailed = 3,
    RuntimeError = 4,
}

impl AppExit {
    pub(crate) fn code(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

pub(crate) const QUICK_HELP: &str = "\
verdict: verification report dashboards
Usage: verdict [--json|--human] <command> [args]
Commands:
  render <location> [--mode auto|single|index] [--output <dashboard.html>] [--timeout-secs <n>]
  view <location> [--mode auto|single|index] [--profile standard|showcase]
  summary <location> [--mode auto|single|index]
Tips:
  verdict --help
  verdict <command> --help";

pub(crate) const ROBOT_SCHEMA_VERSION: &str = "verdict-cli-robot-v1";
