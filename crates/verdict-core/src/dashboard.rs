//! Dashboard renderer: ViewModel → display regions.
//!
//! # Contract
//!
//! [`render`] first resets every region it may populate (all panels hidden
//! and emptied), then repopulates. Rendering report B after report A never
//! leaves A's content behind, even when B lacks a section A had.
//!
//! Sub-renders are skipped when their input is empty; a skipped panel stays
//! hidden.
//!
//! # Escaping
//!
//! Source lines are HTML-escaped before they reach a surface
//! ([`SourceLineView::markup`]). This is an injection-safety requirement:
//! verifier reports embed arbitrary source text.

use crate::display_path::{display_path, NOT_AVAILABLE};
use crate::normalize::{
    resolve_violation_message, scalar_text, InitialValue, LineRef, SourceFile, ViewModel,
    Violation,
};
use crate::report::{Step, StepKind};
use crate::surface::{
    DisplaySurface, Panel, SourceBlock, SourceLineView, StatusTone, TraceLine, TraceTone,
    ViolationCells,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Banner text for a successful run.
pub const SUCCESS_BANNER: &str = "VERIFICATION SUCCESSFUL";

/// Banner text shown by the top-level error handler.
pub const FAILURE_BANNER: &str = "Error loading report data. See the log output for details.";

/// Hide and empty every detail panel.
pub fn reset<S: DisplaySurface + ?Sized>(surface: &mut S) {
    for panel in Panel::ALL {
        surface.set_visible(panel, false);
        surface.clear(panel);
    }
}

/// Project a ViewModel onto the surface.
pub fn render<S: DisplaySurface + ?Sized>(vm: &ViewModel, surface: &mut S) {
    reset(surface);

    let (tone, banner) = status_banner(vm);
    surface.set_status(tone, &banner);
    surface.set_counters(vm.metrics.total_steps, vm.metrics.violation_count);

    if !vm.violations.is_empty() {
        for violation in &vm.violations {
            surface.push_violation_row(violation_cells(violation));
        }
        surface.set_visible(Panel::Violations, true);
    }

    if !vm.initial_values.is_empty() {
        surface.set_initial_values(&initial_values_text(&vm.initial_values));
        surface.set_visible(Panel::InitialValues, true);
    }

    if !vm.sources.is_empty() {
        for file in &vm.sources {
            surface.push_source_block(source_block(file, vm.coverage.get(&file.filename)));
        }
        surface.set_visible(Panel::SourceCode, true);
    }

    if !vm.trace.is_empty() {
        for step in &vm.trace {
            surface.push_trace_line(trace_line(step));
        }
        surface.set_visible(Panel::Trace, true);
    }

    tracing::debug!(
        status = %vm.status,
        total_steps = vm.metrics.total_steps,
        violations = vm.metrics.violation_count,
        "dashboard rendered"
    );
}

/// Generic failure screen: failure banner, zeroed counters, no detail panels.
pub fn render_failure<S: DisplaySurface + ?Sized>(surface: &mut S) {
    reset(surface);
    surface.set_status(StatusTone::Failure, FAILURE_BANNER);
    surface.set_counters(0, 0);
}

pub fn status_banner(vm: &ViewModel) -> (StatusTone, String) {
    if vm.is_failure() {
        (
            StatusTone::Failure,
            format!(
                "VERIFICATION FAILED ({} VIOLATION(S))",
                vm.metrics.violation_count
            ),
        )
    } else {
        (StatusTone::Success, SUCCESS_BANNER.to_string())
    }
}

pub fn violation_cells(violation: &Violation) -> ViolationCells {
    [
        violation.file.clone(),
        violation.func.clone(),
        violation.line.to_string(),
        violation.message.clone(),
    ]
}

/// One `name = value` line per entry.
pub fn initial_values_text(values: &[InitialValue]) -> String {
    let mut text = String::new();
    for entry in values {
        let _ = writeln!(text, "{} = {}", entry.name, entry.value);
    }
    text
}

pub fn source_block(file: &SourceFile, coverage: Option<&BTreeMap<u64, String>>) -> SourceBlock {
    let lines = file
        .lines
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let number = index + 1;
            SourceLineView {
                number,
                classification: coverage.and_then(|c| c.get(&(number as u64))).cloned(),
                text: text.clone(),
                markup: escape_markup(text),
            }
        })
        .collect();
    SourceBlock {
        filename: file.filename.clone(),
        lines,
    }
}

/// HTML-escape text for insertion into markup.
pub fn escape_markup(text: &str) -> String {
    v_htmlescape::escape(text).to_string()
}

/// `[Step N] TYPE @ path:line`, plus ` -> message` for violations and
/// ` -> lhs = rhs` for assignments.
pub fn trace_line(step: &Step) -> TraceLine {
    let number = step
        .step_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let mut text = format!(
        "[Step {number}] {} @ {}:{}",
        step.kind.label(),
        display_path(step.file.as_deref()),
        LineRef::from_raw(step.line),
    );

    let tone = match step.kind {
        StepKind::Violation => {
            let _ = write!(text, " -> {}", resolve_violation_message(step));
            TraceTone::Violation
        }
        StepKind::Assignment => {
            if let Some(assignment) = &step.assignment {
                let _ = write!(
                    text,
                    " -> {} = {}",
                    assignment.lhs,
                    scalar_text(&assignment.rhs)
                );
            }
            TraceTone::Assignment
        }
        _ => TraceTone::Plain,
    };

    TraceLine { tone, text }
}
