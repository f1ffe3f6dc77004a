//! Report normalization: deterministic RawReport → ViewModel.
//!
//! # Overview
//!
//! [`normalize`] turns one loosely shaped [`RawReport`] into the canonical
//! [`ViewModel`] every renderer consumes. Format quirks stop here: nothing
//! downstream looks at raw JSON.
//!
//! # Purity contract
//!
//! - No IO, no clock, no randomness.
//! - Same RawReport always yields the same ViewModel, byte for byte once
//!   serialized ([`viewmodel_hash`] makes that checkable).
//! - The ViewModel is rebuilt from scratch for every report switch.
//!
//! # Required fields
//!
//! `steps` is the single required field. Everything else defaults to empty
//! or absent instead of failing.
//!
//! # Known limitation
//!
//! Two raw source paths that shorten to the same display path share one
//! coverage entry; the later file in document order wins.
//!
//! # Coverage classes
//!
//! A coverage `type` becomes a style class on every surface, so only
//! classifications made of ASCII letters, digits, `-` and `_` survive.
//! Anything else leaves the line untagged.

use crate::display_path::{display_path, NOT_AVAILABLE};
use crate::error::ReportError;
use crate::report::{RawReport, Step};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Table/trace text for a violation with no message and no assertion comment.
pub const MISSING_DETAILS: &str = "No details";

// ---------------------------------------------------------------------------
// ViewModel
// ---------------------------------------------------------------------------

/// Overall verdict. Derived from the raw `status` only, never from the
/// violation count; the two may disagree and both are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Success,
    Failure,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::Success => write!(f, "SUCCESS"),
            VerificationStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub total_steps: usize,
    pub violation_count: usize,
}

/// A line number, or the `N/A` sentinel when the step had none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRef {
    Number(u64),
    NotAvailable,
}

impl LineRef {
    /// Zero is not a valid 1-based line and reads as missing.
    pub fn from_raw(line: Option<u64>) -> Self {
        match line {
            Some(n) if n > 0 => LineRef::Number(n),
            _ => LineRef::NotAvailable,
        }
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRef::Number(n) => write!(f, "{n}"),
            LineRef::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for LineRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LineRef::Number(n) => serializer.serialize_u64(*n),
            LineRef::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub file: String,
    pub func: String,
    pub line: LineRef,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Display path, not the raw path.
    pub filename: String,
    pub lines: Vec<String>,
}

/// display path → 1-based line → classification (`"violation"`, `"execution"`, ...).
pub type CoverageMap = BTreeMap<String, BTreeMap<u64, String>>;

/// Renderer-ready projection of one report.
///
/// Field order is the canonical serialization order for [`viewmodel_hash`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub status: VerificationStatus,
    pub metrics: Metrics,
    pub violations: Vec<Violation>,
    pub initial_values: Vec<InitialValue>,
    pub sources: Vec<SourceFile>,
    pub coverage: CoverageMap,
    /// The raw steps, unmodified and in original order.
    pub trace: Vec<Step>,
}

impl ViewModel {
    pub fn is_failure(&self) -> bool {
        self.status == VerificationStatus::Failure
    }

    /// Classification for one source line, if coverage recorded it.
    pub fn line_classification(&self, filename: &str, line_number: u64) -> Option<&str> {
        self.coverage
            .get(filename)?
            .get(&line_number)
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Build the ViewModel for one report.
///
/// Fails with [`ReportError::MalformedReport`] only when `steps` is absent.
pub fn normalize(raw: &RawReport) -> Result<ViewModel, ReportError> {
    let steps = raw
        .steps
        .as_ref()
        .ok_or_else(|| ReportError::malformed("report has no `steps` sequence"))?;

    let status = if raw.is_violation() {
        VerificationStatus::Failure
    } else {
        VerificationStatus::Success
    };

    let violations: Vec<Violation> = steps
        .iter()
        .filter(|step| step.is_violation())
        .map(violation_row)
        .collect();

    let metrics = Metrics {
        total_steps: steps.len(),
        violation_count: violations.len(),
    };

    let initial_values = raw
        .initial_values
        .iter()
        .flat_map(|values| values.iter())
        .map(|(name, entry)| InitialValue {
            name: name.to_string(),
            value: initial_value_text(entry),
        })
        .collect();

    let (sources, coverage) = sources_and_coverage(raw);

    Ok(ViewModel {
        status,
        metrics,
        violations,
        initial_values,
        sources,
        coverage,
        trace: steps.clone(),
    })
}

/// Message for a violation step, in resolution order:
/// explicit `message`, then `assertion.comment`, then [`MISSING_DETAILS`].
/// Empty strings count as missing.
pub fn resolve_violation_message(step: &Step) -> &str {
    let comment = step
        .assertion
        .as_ref()
        .and_then(|assertion| assertion.comment.as_deref());
    [step.message.as_deref(), comment]
        .into_iter()
        .flatten()
        .find(|text| !text.is_empty())
        .unwrap_or(MISSING_DETAILS)
}

fn violation_row(step: &Step) -> Violation {
    Violation {
        file: display_path(step.file.as_deref()),
        func: step
            .function
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        line: LineRef::from_raw(step.line),
        message: resolve_violation_message(step).to_string(),
    }
}

/// Scalar display text for an `initial_values` entry.
///
/// Entries are normally `{"value": ...}`; bare scalars are accepted too.
fn initial_value_text(entry: &Value) -> String {
    let scalar = match entry {
        Value::Object(fields) => fields.get("value").unwrap_or(entry),
        other => other,
    };
    scalar_text(scalar)
}

/// Strings as-is, everything else as JSON text.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn sources_and_coverage(raw: &RawReport) -> (Vec<SourceFile>, CoverageMap) {
    let mut sources = Vec::new();
    let mut coverage = CoverageMap::new();

    let Some(files) = raw.source_files.as_ref() else {
        return (sources, coverage);
    };

    for (raw_path, lines) in files.iter() {
        let filename = display_path(Some(raw_path));

        if let Some(covered) = raw.covered_lines(raw_path) {
            let classified: BTreeMap<u64, String> = covered
                .iter()
                .filter_map(|(line, entry)| {
                    let number = line.trim().parse::<u64>().ok().filter(|n| *n > 0)?;
                    let kind = entry.kind.as_deref().filter(|k| is_class_token(k))?;
                    Some((number, kind.to_string()))
                })
                .collect();
            coverage.insert(filename.clone(), classified);
        }

        sources.push(SourceFile {
            filename,
            lines: lines.clone(),
        });
    }

    (sources, coverage)
}

fn is_class_token(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// ---------------------------------------------------------------------------
// viewmodel.hash
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest of the ViewModel's canonical JSON.
pub fn viewmodel_hash(vm: &ViewModel) -> String {
    // Plain data plus BTreeMaps; serialization cannot fail.
    let bytes = serde_json::to_vec(vm).expect("ViewModel serialization should never fail");
    blake3::hash(&bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: Value) -> RawReport {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_success_report() {
        let vm = normalize(&report(json!({"status": "success", "steps": []}))).unwrap();
        assert_eq!(vm.status, VerificationStatus::Success);
        assert_eq!(vm.metrics, Metrics::default());
        assert!(vm.violations.is_empty());
        assert!(vm.initial_values.is_empty());
        assert!(vm.sources.is_empty());
        assert!(vm.trace.is_empty());
    }

    #[test]
    fn single_violation_row() {
        let vm = normalize(&report(json!({
            "status": "violation",
            "steps": [{"type": "violation", "file": "/a/b/c.c", "line": 5, "message": "oops", "step_number": 1}]
        })))
        .unwrap();
        assert_eq!(vm.status, VerificationStatus::Failure);
        assert_eq!(
            vm.metrics,
            Metrics {
                total_steps: 1,
                violation_count: 1
            }
        );
        assert_eq!(
            vm.violations,
            vec![Violation {
                file: "b/c.c".into(),
                func: "N/A".into(),
                line: LineRef::Number(5),
                message: "oops".into(),
            }]
        );
    }

    #[test]
    fn missing_steps_is_malformed() {
        let err = normalize(&report(json!({"status": "violation"}))).unwrap_err();
        assert!(matches!(err, ReportError::MalformedReport { .. }));
    }

    #[test]
    fn status_and_violation_count_are_not_reconciled() {
        let vm = normalize(&report(json!({
            "status": "success",
            "steps": [{"type": "violation", "message": "still here"}]
        })))
        .unwrap();
        assert_eq!(vm.status, VerificationStatus::Success);
        assert_eq!(vm.metrics.violation_count, 1);

        let vm = normalize(&report(json!({"status": "violation", "steps": []}))).unwrap();
        assert_eq!(vm.status, VerificationStatus::Failure);
        assert_eq!(vm.metrics.violation_count, 0);
    }

    #[test]
    fn message_resolution_order() {
        let steps: Vec<Step> = serde_json::from_value(json!([
            {"type": "violation", "message": "explicit", "assertion": {"comment": "comment"}},
            {"type": "violation", "message": "", "assertion": {"comment": "comment"}},
            {"type": "violation", "assertion": {}},
            {"type": "violation"}
        ]))
        .unwrap();
        let resolved: Vec<&str> = steps.iter().map(resolve_violation_message).collect();
        assert_eq!(resolved, vec!["explicit", "comment", MISSING_DETAILS, MISSING_DETAILS]);
    }

    #[test]
    fn violations_preserve_step_order_and_skip_other_kinds() {
        let vm = normalize(&report(json!({
            "status": "violation",
            "steps": [
                {"type": "violation", "message": "first", "line": 3},
                {"type": "assignment", "assignment": {"lhs": "x", "rhs": "1"}},
                {"type": "violation", "message": "second", "line": 0, "function": "mul"}
            ]
        })))
        .unwrap();
        let messages: Vec<&str> = vm.violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(vm.violations[1].line, LineRef::NotAvailable);
        assert_eq!(vm.violations[1].func, "mul");
        assert_eq!(vm.metrics.total_steps, 3);
    }

    #[test]
    fn initial_values_keep_order_and_unwrap_value() {
        let vm = normalize(&report(json!({
            "steps": [],
            "initial_values": {"b": {"value": "-1"}, "a": {"value": 42}, "c": true}
        })))
        .unwrap();
        let pairs: Vec<(&str, &str)> = vm
            .initial_values
            .iter()
            .map(|iv| (iv.name.as_str(), iv.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("b", "-1"), ("a", "42"), ("c", "true")]);
    }

    #[test]
    fn sources_without_coverage_have_no_classification() {
        let vm = normalize(&report(json!({
            "steps": [],
            "source_files": {"/w/src/main.c": ["int main() {", "}"]}
        })))
        .unwrap();
        assert_eq!(vm.sources.len(), 1);
        assert_eq!(vm.sources[0].filename, "src/main.c");
        assert!(vm.coverage.is_empty());
        assert_eq!(vm.line_classification("src/main.c", 1), None);
    }

    #[test]
    fn coverage_is_keyed_by_display_path_and_line_number() {
        let vm = normalize(&report(json!({
            "steps": [],
            "source_files": {"/w/src/main.c": ["a", "b", "c"]},
            "coverage": {"files": {"/w/src/main.c": {"covered_lines": {
                "2": {"type": "execution"},
                "3": {"type": "violation"},
                "x": {"type": "execution"},
                "0": {"type": "execution"}
            }}}}
        })))
        .unwrap();
        assert_eq!(vm.line_classification("src/main.c", 2), Some("execution"));
        assert_eq!(vm.line_classification("src/main.c", 3), Some("violation"));
        assert_eq!(vm.coverage["src/main.c"].len(), 2);
    }

    #[test]
    fn coverage_types_outside_class_alphabet_are_dropped() {
        let vm = normalize(&report(json!({
            "steps": [],
            "source_files": {"/w/m.c": ["a", "b", "c"]},
            "coverage": {"files": {"/w/m.c": {"covered_lines": {
                "1": {"type": "x\"><img src=x onerror=alert(1)>"},
                "2": {"type": "partial_hit-2"},
                "3": {"type": ""}
            }}}}
        })))
        .unwrap();
        assert_eq!(vm.line_classification("m.c", 1), None);
        assert_eq!(vm.line_classification("m.c", 2), Some("partial_hit-2"));
        assert_eq!(vm.line_classification("m.c", 3), None);
    }

    #[test]
    fn colliding_display_paths_last_write_wins() {
        let vm = normalize(&report(json!({
            "steps": [],
            "source_files": {"/one/src/main.c": ["a"], "/two/src/main.c": ["b"]},
            "coverage": {"files": {
                "/one/src/main.c": {"covered_lines": {"1": {"type": "execution"}}},
                "/two/src/main.c": {"covered_lines": {"1": {"type": "violation"}}}
            }}
        })))
        .unwrap();
        assert_eq!(vm.sources.len(), 2);
        assert_eq!(vm.line_classification("src/main.c", 1), Some("violation"));
    }

    #[test]
    fn trace_is_the_unmodified_step_sequence() {
        let raw = report(json!({
            "steps": [
                {"step_number": 2, "type": "assignment", "assignment": {"lhs": "r", "rhs": {"a": 1}}},
                {"step_number": 1, "type": "violation"}
            ]
        }));
        let vm = normalize(&raw).unwrap();
        assert_eq!(&vm.trace, raw.steps.as_ref().unwrap());
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = report(json!({
            "status": "violation",
            "steps": [{"type": "violation", "file": "/a/b/c.c", "line": 5, "message": "oops"}],
            "initial_values": {"a": {"value": "1"}},
            "source_files": {"/a/b/c.c": ["x < y"]},
            "coverage": {"files": {"/a/b/c.c": {"covered_lines": {"1": {"type": "violation"}}}}}
        }));
        let first = normalize(&raw).unwrap();
        let second = normalize(&raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(viewmodel_hash(&first), viewmodel_hash(&second));
        assert_eq!(viewmodel_hash(&first).len(), 64);
    }

    #[test]
    fn line_ref_serializes_number_or_sentinel() {
        assert_eq!(serde_json::to_value(LineRef::Number(5)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(LineRef::NotAvailable).unwrap(), json!("N/A"));
    }
}
