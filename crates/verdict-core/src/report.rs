//! Raw verification report schema.
//!
//! # Overview
//!
//! A [`RawReport`] is one run of an external verifier (bounded model checker
//! or symbolic executor) as it appears on the wire. The shape is loose and
//! inconsistently populated across verifier versions, so every field except
//! `steps` is optional here, and `steps` itself is only checked by the
//! normalizer (see [`crate::normalize`]).
//!
//! ```text
//! { status, steps: [Step], initial_values?, source_files?, coverage? }
//! ```
//!
//! # Ordering
//!
//! `source_files` and `initial_values` keep document order via
//! [`OrderedMap`]. Unknown step fields are retained in [`Step::extra`] so a
//! trace serializes back unmodified.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Raw `status` value that marks a failed verification run.
pub const STATUS_VIOLATION: &str = "violation";

// ---------------------------------------------------------------------------
// RawReport
// ---------------------------------------------------------------------------

/// One verifier run, exactly as decoded from the report document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// The only field the normalizer requires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_values: Option<OrderedMap<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_files: Option<OrderedMap<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
}

impl RawReport {
    /// True when the verifier itself declared the run a violation.
    pub fn is_violation(&self) -> bool {
        self.status.as_deref() == Some(STATUS_VIOLATION)
    }

    /// Per-line coverage entries for one raw source path, if recorded.
    pub fn covered_lines(&self, raw_path: &str) -> Option<&BTreeMap<String, LineCoverage>> {
        self.coverage
            .as_ref()?
            .files
            .get(raw_path)?
            .covered_lines
            .as_ref()
    }
}

/// `coverage` block: per-file executed/violating line markers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coverage {
    #[serde(default)]
    pub files: OrderedMap<FileCoverage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileCoverage {
    /// Keyed by 1-based line number as text, the way verifiers emit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered_lines: Option<BTreeMap<String, LineCoverage>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineCoverage {
    /// Classification such as `"violation"` or `"execution"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One trace event. The `type` tag decides which optional payload is
/// meaningful; the struct stays flat so unrecognised tags still round-trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Step {
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub step_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "StepKind::is_unspecified")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Assertion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn is_violation(&self) -> bool {
        self.kind == StepKind::Violation
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assertion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub lhs: String,
    /// Plain text or a structured value (struct/array literal).
    #[serde(default)]
    pub rhs: Value,
}

/// Step `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StepKind {
    Violation,
    Assignment,
    /// Any other tag, kept verbatim. Empty means the tag was absent.
    Other(String),
    #[default]
    Unspecified,
}

impl StepKind {
    pub fn as_str(&self) -> &str {
        match self {
            StepKind::Violation => "violation",
            StepKind::Assignment => "assignment",
            StepKind::Other(tag) => tag,
            StepKind::Unspecified => "",
        }
    }

    pub fn is_unspecified(&self) -> bool {
        *self == StepKind::Unspecified
    }

    /// Upper-case label used in trace lines.
    pub fn label(&self) -> String {
        match self {
            StepKind::Unspecified => "UNKNOWN".to_string(),
            other => other.as_str().to_uppercase(),
        }
    }
}

impl From<&str> for StepKind {
    fn from(tag: &str) -> Self {
        match tag {
            "violation" => StepKind::Violation,
            "assignment" => StepKind::Assignment,
            "" => StepKind::Unspecified,
            other => StepKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StepKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map(StepKind::from).unwrap_or_default())
    }
}

/// Accept `12`, `"12"`, or nothing. Anything else reads as absent.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// OrderedMap
// ---------------------------------------------------------------------------

/// String-keyed map that keeps document order.
///
/// Duplicate keys keep their first position and take the last value, which
/// matches how a JSON object is read by most producers.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> OrderedMap<T> {
    pub fn new() -> Self {
        OrderedMap {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for OrderedMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<T: Serialize> Serialize for OrderedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

struct OrderedMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<T> {
    type Value = OrderedMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
