//! Terminal dashboard snapshots.
//!
//! Exercises the full pipeline: fixture → session → renderer → ratatui buffer.
//! If a region stops reaching the screen, these fail.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use verdict_core::report::RawReport;
use verdict_core::session::{LoadedReport, ReportSession};
use verdict_tui::{render_after_keys, render_failure_to_buffer, render_to_buffer};

const OVERFLOW_FIXTURE: &str = include_str!("../../verdict-core/tests/fixtures/mul-overflow.json");

fn fixture_report(title: &str) -> LoadedReport {
    let documents: Vec<RawReport> = serde_json::from_str(OVERFLOW_FIXTURE).unwrap();
    LoadedReport {
        title: title.to_string(),
        location: format!("fixtures/{title}"),
        report: documents.into_iter().next().unwrap(),
    }
}

fn success_report(title: &str) -> LoadedReport {
    LoadedReport {
        title: title.to_string(),
        location: format!("fixtures/{title}"),
        report: serde_json::from_str(r#"{"status": "success", "steps": []}"#).unwrap(),
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

#[test]
fn fixture_dashboard_shows_every_region() {
    let session = ReportSession::new("fixtures/mul-overflow.json", vec![fixture_report("mul-overflow.json")]).unwrap();
    let text = render_to_buffer(session, 120, 60).unwrap();

    assert!(text.contains("VERIFICATION FAILED (1 VIOLATION(S))"));
    assert!(text.contains("Steps: 5"));
    assert!(text.contains("Violations: 1"));
    assert!(text.contains("mul-overflow.json (1/1)"));
    for title in ["Violations", "Initial values", "Source code", "Execution trace"] {
        assert!(text.contains(title), "missing panel {title}");
    }
    assert!(text.contains("lib/lib.c | mul | 9 | arithmetic overflow on mul"));
    assert!(text.contains("a = 4611686018427387904"));
    assert!(text.contains("[Step 1] ASSIGNMENT @ bench/main.c:6 -> a = 4611686018427387904"));
}

#[test]
fn success_report_hides_empty_panels() {
    let session = ReportSession::new("ok.json", vec![success_report("ok.json")]).unwrap();
    let text = render_to_buffer(session, 100, 20).unwrap();
    assert!(text.contains("VERIFICATION SUCCESSFUL"));
    assert!(!text.contains("Execution trace"));
    assert!(text.contains("nothing to show"));
}

#[test]
fn switching_reports_redraws_from_scratch() {
    let session = ReportSession::new(
        "index.json",
        vec![fixture_report("joao.json"), success_report("maria.json")],
    )
    .unwrap();
    let text = render_after_keys(session, &[key(KeyCode::Right)], 120, 40).unwrap();
    assert!(text.contains("maria.json (2/2)"));
    assert!(text.contains("VERIFICATION SUCCESSFUL"));
    assert!(!text.contains("arithmetic overflow"));
    assert!(text.contains("←/→ report"));
}

#[test]
fn malformed_report_shows_only_failure_banner() {
    let broken = LoadedReport {
        title: "broken.json".to_string(),
        location: "fixtures/broken.json".to_string(),
        report: serde_json::from_str(r#"{"status": "violation"}"#).unwrap(),
    };
    let session = ReportSession::new("broken.json", vec![broken]).unwrap();
    let text = render_to_buffer(session, 100, 20).unwrap();
    assert!(text.contains("Error loading report data. See the log output for details."));
    assert!(text.contains("Steps: 0"));
    assert!(!text.contains("File | Function"));
}

#[test]
fn unloadable_location_shows_failure_screen() {
    let text = render_failure_to_buffer("https://ci.example/idx.json", 100, 20).unwrap();
    assert!(text.contains("Error loading report data. See the log output for details."));
    assert!(text.contains("Steps: 0"));
    assert!(text.contains("Report: https://ci.example/idx.json"));
    assert!(text.contains("nothing to show"));
    assert!(!text.contains("←/→ report"));
}
