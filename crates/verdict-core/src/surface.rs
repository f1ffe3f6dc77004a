//! Display surface contract.
//!
//! The renderer addresses a fixed set of abstract regions:
//!
//! - status banner (text + tone) and two counters (total steps, violations)
//! - four toggleable detail panels: violations table, initial values,
//!   source code, execution trace
//!
//! Concrete surfaces (static HTML page, terminal dashboard) either implement
//! [`DisplaySurface`] directly or read a [`RegionBuffer`], the in-memory
//! surface the renderer writes into.

use serde::Serialize;
use std::collections::BTreeSet;

/// Column headers of the violations table.
pub const VIOLATION_COLUMNS: [&str; 4] = ["File", "Function", "Line", "Message"];

/// One violations-table row: `[file, function, line, message]`.
pub type ViolationCells = [String; 4];

/// A detail region with its own visibility toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Violations,
    InitialValues,
    SourceCode,
    Trace,
}

impl Panel {
    /// All panels in display order.
    pub const ALL: [Panel; 4] = [
        Panel::Violations,
        Panel::InitialValues,
        Panel::SourceCode,
        Panel::Trace,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Violations => "Violations",
            Panel::InitialValues => "Initial values",
            Panel::SourceCode => "Source code",
            Panel::Trace => "Execution trace",
        }
    }

    /// Stable identifier; the HTML page uses it as class and id prefix.
    pub fn element_id(&self) -> &'static str {
        match self {
            Panel::Violations => "violations-panel",
            Panel::InitialValues => "initial-values-panel",
            Panel::SourceCode => "source-code-panel",
            Panel::Trace => "trace-panel",
        }
    }
}

/// Status banner styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    /// Nothing rendered yet.
    #[default]
    Pending,
    Success,
    Failure,
}

impl StatusTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusTone::Pending => "status-box",
            StatusTone::Success => "status-box success",
            StatusTone::Failure => "status-box failure",
        }
    }
}

/// One rendered source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLineView {
    /// 1-based.
    pub number: usize,
    /// Coverage classification, `None` when the line is untagged.
    pub classification: Option<String>,
    /// Raw line text, for non-HTML surfaces.
    pub text: String,
    /// HTML-escaped line text; the only form an HTML surface may insert.
    pub markup: String,
}

impl SourceLineView {
    pub fn css_class(&self) -> String {
        match &self.classification {
            Some(class) => format!("line {class}"),
            None => "line".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBlock {
    pub filename: String,
    pub lines: Vec<SourceLineView>,
}

/// Trace entry kind; drives styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceTone {
    Plain,
    Violation,
    Assignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceLine {
    pub tone: TraceTone,
    pub text: String,
}

impl TraceLine {
    pub fn css_class(&self) -> &'static str {
        match self.tone {
            TraceTone::Plain => "trace-step",
            TraceTone::Violation => "trace-step violation",
            TraceTone::Assignment => "trace-step assignment",
        }
    }
}

/// Side-effecting target of [`crate::dashboard::render`].
pub trait DisplaySurface {
    fn set_status(&mut self, tone: StatusTone, text: &str);
    fn set_counters(&mut self, total_steps: usize, violation_count: usize);
    fn set_visible(&mut self, panel: Panel, visible: bool);
    /// Remove all content from a panel. Visibility is untouched.
    fn clear(&mut self, panel: Panel);
    fn push_violation_row(&mut self, cells: ViolationCells);
    fn set_initial_values(&mut self, text: &str);
    fn push_source_block(&mut self, block: SourceBlock);
    fn push_trace_line(&mut self, line: TraceLine);
}

/// In-memory display surface.
///
/// Two buffers compare equal exactly when they would display the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionBuffer {
    pub status_tone: StatusTone,
    pub status_text: String,
    pub total_steps: usize,
    pub violation_count: usize,
    pub visible: BTreeSet<Panel>,
    pub violation_rows: Vec<ViolationCells>,
    pub initial_values: String,
    pub source_blocks: Vec<SourceBlock>,
    pub trace_lines: Vec<TraceLine>,
}

impl RegionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visible.contains(&panel)
    }

    /// Visible panels in display order.
    pub fn visible_panels(&self) -> Vec<Panel> {
        Panel::ALL
            .into_iter()
            .filter(|panel| self.is_visible(*panel))
            .collect()
    }
}

impl DisplaySurface for RegionBuffer {
    fn set_status(&mut self, tone: StatusTone, text: &str) {
        self.status_tone = tone;
        self.status_text = text.to_string();
    }

    fn set_counters(&mut self, total_steps: usize, violation_count: usize) {
        self.total_steps = total_steps;
        self.violation_count = violation_count;
    }

    fn set_visible(&mut self, panel: Panel, visible: bool) {
        if visible {
            self.visible.insert(panel);
        } else {
            self.visible.remove(&panel);
        }
    }

    fn clear(&mut self, panel: Panel) {
        match panel {
            Panel::Violations => self.violation_rows.clear(),
            Panel::InitialValues => self.initial_values.clear(),
            Panel::SourceCode => self.source_blocks.clear(),
            Panel::Trace => self.trace_lines.clear(),
        }
    }

    fn push_violation_row(&mut self, cells: ViolationCells) {
        self.violation_rows.push(cells);
    }

    fn set_initial_values(&mut self, text: &str) {
        self.initial_values = text.to_string();
    }

    fn push_source_block(&mut self, block: SourceBlock) {
        self.source_blocks.push(block);
    }

    fn push_trace_line(&mut self, line: TraceLine) {
        self.trace_lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_leaves_visibility_alone() {
        let mut buf = RegionBuffer::new();
        buf.set_visible(Panel::Trace, true);
        buf.push_trace_line(TraceLine {
            tone: TraceTone::Plain,
            text: "x".into(),
        });
        buf.clear(Panel::Trace);
        assert!(buf.trace_lines.is_empty());
        assert!(buf.is_visible(Panel::Trace));
    }

    #[test]
    fn visible_panels_follow_display_order() {
        let mut buf = RegionBuffer::new();
        buf.set_visible(Panel::Trace, true);
        buf.set_visible(Panel::Violations, true);
        assert_eq!(buf.visible_panels(), vec![Panel::Violations, Panel::Trace]);
        buf.set_visible(Panel::Violations, false);
        assert_eq!(buf.visible_panels(), vec![Panel::Trace]);
    }

    #[test]
    fn css_classes() {
        let line = SourceLineView {
            number: 1,
            classification: Some("violation".into()),
            text: String::new(),
            markup: String::new(),
        };
        assert_eq!(line.css_class(), "line violation");
        assert_eq!(StatusTone::Failure.css_class(), "status-box failure");
    }
}
