use crate::cli_contract::{
    AppExit, Cli, Commands, ModeArg, OutputMode, UiProfileArg, ROBOT_SCHEMA_VERSION,
};
use crate::cli_normalize::FailureNotice;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;
use verdict_core::normalize::viewmodel_hash;
use verdict_core::session::{ReportSession, SessionError};
use verdict_core::ReportError;
use verdict_import::{LoaderConfig, LoaderMode, ReportLoader, ReportLocation};
use verdict_tui::html::{render_failure_page, render_session_page};
use verdict_tui::{run_failure_viewer, run_viewer, UiProfile};

fn emit_json(value: Value) {
    match serde_json::to_string(&value) {
        Ok(line) => println!("{line}"),
        Err(err) => {
            // Last-resort envelope to avoid panicking in robot mode.
            let fallback = json!({
                "schema_version": ROBOT_SCHEMA_VERSION,
                "ok": false,
                "code": "RUNTIME_ERROR",
                "message": format!("failed to serialize JSON response: {err}"),
                "suggestions": [],
                "exit_code": AppExit::RuntimeError as u8,
            });
            println!("{fallback}");
        }
    }
}

pub(crate) fn emit_json_success(
    code: &str,
    message: &str,
    command: Option<&str>,
    exit_code: u8,
    notes: &[String],
    mut data: Value,
) {
    if data.is_null() {
        data = json!({});
    }
    let mut obj = json!({
        "schema_version": ROBOT_SCHEMA_VERSION,
        "ok": true,
        "code": code,
        "message": message,
        "suggestions": [],
        "exit_code": exit_code,
        "data": data,
    });
    if let Some(command) = command {
        obj["command"] = json!(command);
    }
    if !notes.is_empty() {
        obj["notes"] = json!(notes);
    }
    emit_json(obj);
}

pub(crate) fn emit_json_error(
    code: &str,
    message: &str,
    suggestions: &[String],
    notes: &[String],
    exit_code: u8,
) {
    let mut obj = json!({
        "schema_version": ROBOT_SCHEMA_VERSION,
        "ok": false,
        "code": code,
        "message": message,
        "suggestions": suggestions,
        "exit_code": exit_code,
    });
    if !notes.is_empty() {
        obj["notes"] = json!(notes);
    }
    emit_json(obj);
}

/// Loaded, but at least one report is malformed: error envelope with data.
fn emit_json_report_failed(command: &str, message: &str, notes: &[String], data: Value) {
    let mut obj = json!({
        "schema_version": ROBOT_SCHEMA_VERSION,
        "ok": false,
        "code": "REPORT_FAILED",
        "message": message,
        "suggestions": [],
        "exit_code": AppExit::ReportFailed as u8,
        "command": command,
        "data": data,
    });
    if !notes.is_empty() {
        obj["notes"] = json!(notes);
    }
    emit_json(obj);
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum LoadFailure {
    NotFound(String),
    Report(ReportError),
    Runtime(String),
}

impl LoadFailure {
    fn exit(&self) -> AppExit {
        match self {
            LoadFailure::NotFound(_) => AppExit::NotFound,
            LoadFailure::Report(_) => AppExit::ReportFailed,
            LoadFailure::Runtime(_) => AppExit::RuntimeError,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            LoadFailure::NotFound(_) => "NOT_FOUND",
            LoadFailure::Report(err) => err.kind(),
            LoadFailure::Runtime(_) => "RUNTIME_ERROR",
        }
    }

    fn likely_cause(&self) -> &'static str {
        match self {
            LoadFailure::NotFound(_) => "Input path does not exist.",
            LoadFailure::Report(ReportError::Fetch { .. }) => {
                "A report or index document could not be fetched (network error, non-success status, or unreadable file)."
            }
            LoadFailure::Report(ReportError::EmptyReport { .. }) => {
                "The document holds no report, or the index lists no usable documents."
            }
            LoadFailure::Report(ReportError::MalformedReport { .. }) => {
                "The document is not valid verifier JSON."
            }
            LoadFailure::Runtime(_) => "The async runtime could not be started.",
        }
    }

    fn message(&self) -> String {
        match self {
            LoadFailure::NotFound(msg) | LoadFailure::Runtime(msg) => msg.clone(),
            LoadFailure::Report(err) => err.to_string(),
        }
    }
}

fn loader_mode(mode: ModeArg) -> LoaderMode {
    match mode {
        ModeArg::Auto => LoaderMode::Auto,
        ModeArg::Single => LoaderMode::Single,
        ModeArg::Index => LoaderMode::Index,
    }
}

fn load_session(
    location: &str,
    mode: ModeArg,
    timeout_secs: Option<u64>,
) -> Result<ReportSession, LoadFailure> {
    if let Ok(ReportLocation::Local(path)) = ReportLocation::parse(location) {
        if !path.exists() {
            return Err(LoadFailure::NotFound(format!(
                "report file not found: {}",
                path.display()
            )));
        }
    }

    let config = LoaderConfig::default()
        .with_mode(loader_mode(mode))
        .with_timeout(timeout_secs.map(Duration::from_secs));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LoadFailure::Runtime(format!("failed to start async runtime: {e}")))?;

    runtime
        .block_on(async {
            let loader = ReportLoader::new(config)?;
            loader.load(location).await
        })
        .map_err(LoadFailure::Report)
}

fn report_load_failure(
    command: &str,
    location: &str,
    failure: &LoadFailure,
    mode: OutputMode,
    repair_notes: &[String],
) -> AppExit {
    tracing::error!(command, location, error = %failure.message(), "load failed");
    let exit = failure.exit();
    let suggestions = vec![
        format!("Check that `{location}` is reachable and holds verifier JSON."),
        format!("verdict summary {location} --mode single"),
        "RUST_LOG=debug verdict <command> ... for fetch details".to_string(),
    ];
    if mode == OutputMode::Json {
        emit_json_error(
            failure.code(),
            &format!("{command} failed: {}", failure.message()),
            &suggestions,
            repair_notes,
            exit as u8,
        );
    } else {
        let what = format!("{command} failed: {}", failure.message());
        eprintln!(
            "{}",
            FailureNotice {
                what: &what,
                likely_cause: failure.likely_cause(),
                next_commands: &suggestions,
                location,
            }
        );
    }
    exit
}

fn report_runtime_error(
    what: &str,
    cause: &str,
    evidence: &str,
    mode: OutputMode,
    repair_notes: &[String],
) -> AppExit {
    let suggestions = vec!["verdict --help".to_string()];
    if mode == OutputMode::Json {
        emit_json_error(
            "RUNTIME_ERROR",
            what,
            &suggestions,
            repair_notes,
            AppExit::RuntimeError as u8,
        );
    } else {
        eprintln!(
            "{}",
            FailureNotice {
                what,
                likely_cause: cause,
                next_commands: &suggestions,
                location: evidence,
            }
        );
    }
    AppExit::RuntimeError
}

fn write_page(path: &Path, html: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
    }
    fs::write(path, html).map_err(|e| format!("failed to write {}: {e}", path.display()))
}

fn error_code(err: &SessionError) -> &'static str {
    match err {
        SessionError::Report(report) => report.kind(),
        SessionError::OutOfRange { .. } => "OUT_OF_RANGE",
    }
}

/// One summary row per report; malformed reports carry an `error` object.
fn summary_rows(session: &ReportSession) -> Vec<Value> {
    session
        .reports()
        .iter()
        .enumerate()
        .map(|(index, loaded)| match session.view_model(index) {
            Ok(vm) => json!({
                "index": index,
                "title": loaded.title,
                "location": loaded.location,
                "status": vm.status,
                "total_steps": vm.metrics.total_steps,
                "violation_count": vm.metrics.violation_count,
                "viewmodel_hash": viewmodel_hash(&vm),
            }),
            Err(err) => json!({
                "index": index,
                "title": loaded.title,
                "location": loaded.location,
                "error": {
                    "code": error_code(&err),
                    "message": err.to_string(),
                },
            }),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub(crate) fn handle_command(cli: Cli, mode: OutputMode, repair_notes: &[String]) -> AppExit {
    let map_profile = |profile: UiProfileArg| match profile {
        UiProfileArg::Standard => UiProfile::Standard,
        UiProfileArg::Showcase => UiProfile::Showcase,
    };

    match cli.command {
        Commands::Render {
            location,
            mode: load_mode,
            output,
            timeout_secs,
        } => {
            let session = match load_session(&location, load_mode, timeout_secs) {
                Ok(session) => session,
                Err(failure) => {
                    if let Err(msg) = write_page(&output, &render_failure_page()) {
                        tracing::warn!(error = %msg, "failure page not written");
                    }
                    return report_load_failure("render", &location, &failure, mode, repair_notes);
                }
            };

            let page = render_session_page(&session);
            if let Err(msg) = write_page(&output, &page.html) {
                return report_runtime_error(
                    &format!("render failed: {msg}"),
                    "Output path is not writable.",
                    &output.display().to_string(),
                    mode,
                    repair_notes,
                );
            }

            let data = json!({
                "origin": session.origin(),
                "output": output.display().to_string(),
                "output_blake3": blake3::hash(page.html.as_bytes()).to_hex().to_string(),
                "report_count": session.len(),
                "failed_reports": page.failed,
            });

            if page.failed.is_empty() {
                if mode == OutputMode::Json {
                    emit_json_success(
                        "OK",
                        "Dashboard written.",
                        Some("render"),
                        AppExit::Success as u8,
                        repair_notes,
                        data,
                    );
                } else {
                    println!("Dashboard written: {}", output.display());
                    println!("  Reports: {}", session.len());
                }
                return AppExit::Success;
            }

            if mode == OutputMode::Json {
                emit_json_report_failed(
                    "render",
                    &format!("{} report(s) could not be rendered.", page.failed.len()),
                    repair_notes,
                    data,
                );
            } else {
                println!("Dashboard written: {}", output.display());
                println!("  Reports: {}", session.len());
                eprintln!("Some reports show the failure screen:");
                for index in &page.failed {
                    eprintln!("  - {}", session.reports()[*index].title);
                }
            }
            AppExit::ReportFailed
        }

        Commands::View {
            location,
            mode: load_mode,
            profile,
            timeout_secs,
        } => {
            let session = match load_session(&location, load_mode, timeout_secs) {
                Ok(session) => session,
                Err(failure) => {
                    // Robot callers get the envelope only; a human sees the failure screen first.
                    if mode == OutputMode::Human {
                        if let Err(e) = run_failure_viewer(&location, map_profile(profile)) {
                            tracing::warn!(error = %e, "could not show the failure screen");
                        }
                    }
                    return report_load_failure("view", &location, &failure, mode, repair_notes);
                }
            };
            if let Err(e) = run_viewer(session, map_profile(profile)) {
                return report_runtime_error(
                    &format!("view failed: {e}"),
                    "The terminal could not be put into raw mode.",
                    &location,
                    mode,
                    repair_notes,
                );
            }
            AppExit::Success
        }

        Commands::Summary {
            location,
            mode: load_mode,
            timeout_secs,
        } => {
            let session = match load_session(&location, load_mode, timeout_secs) {
                Ok(session) => session,
                Err(failure) => {
                    return report_load_failure("summary", &location, &failure, mode, repair_notes)
                }
            };

            let rows = summary_rows(&session);
            let failed = rows.iter().filter(|row| row.get("error").is_some()).count();
            let data = json!({
                "origin": session.origin(),
                "reports": rows,
            });

            if mode == OutputMode::Json {
                if failed == 0 {
                    emit_json_success(
                        "OK",
                        "Summary computed.",
                        Some("summary"),
                        AppExit::Success as u8,
                        repair_notes,
                        data,
                    );
                } else {
                    emit_json_report_failed(
                        "summary",
                        &format!("{failed} report(s) are malformed."),
                        repair_notes,
                        data,
                    );
                }
            } else {
                println!("Reports from {}:", session.origin());
                for row in &rows {
                    println!("  {}", summary_line(row));
                }
            }

            if failed == 0 {
                AppExit::Success
            } else {
                AppExit::ReportFailed
            }
        }
    }
}

fn summary_line(row: &Value) -> String {
    let title = row["title"].as_str().unwrap_or("?");
    if let Some(error) = row.get("error") {
        return format!(
            "{title}: {} ({})",
            error["code"].as_str().unwrap_or("ERROR"),
            error["message"].as_str().unwrap_or("")
        );
    }
    let hash = row["viewmodel_hash"].as_str().unwrap_or("");
    format!(
        "{title}: {} steps={} violations={} hash={}",
        row["status"].as_str().unwrap_or("?"),
        row["total_steps"],
        row["violation_count"],
        &hash[..hash.len().min(16)]
    )
}
