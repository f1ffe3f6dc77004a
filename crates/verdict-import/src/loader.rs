//! Load orchestration: location → [`ReportSession`].
//!
//! # Document shapes
//!
//! | Shape | Meaning |
//! |-------|---------|
//! | `[report, ...]` | report document; element 0 is the report |
//! | `{"steps": ..., "status": ...}` | a bare report |
//! | `{"arquivos_participantes": [url, ...]}` | index of report documents |
//!
//! [`LoaderMode::Auto`] picks by shape; the other modes force one reading.
//!
//! # Index loads
//!
//! Every entry is fetched concurrently on a [`JoinSet`]. Results are tagged
//! with their index position and re-associated in index order, so the
//! selector order never depends on completion order. The first failed fetch
//! aborts all outstanding ones and fails the load.
//!
//! An entry whose document holds no report (empty array) is skipped with a
//! warning. The load fails with `EmptyReport` only when no entry is usable.

use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinSet;
use verdict_core::report::RawReport;
use verdict_core::session::{LoadedReport, ReportSession};
use verdict_core::ReportError;

use crate::fetch::Fetcher;
use crate::location::ReportLocation;

/// Key listing the report documents in an index.
pub const INDEX_KEY: &str = "arquivos_participantes";

pub const DEFAULT_USER_AGENT: &str = concat!("verdict/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderMode {
    #[default]
    Auto,
    Single,
    Index,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub mode: LoaderMode,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub use_system_proxy: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            mode: LoaderMode::Auto,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            use_system_proxy: true,
        }
    }
}

impl LoaderConfig {
    pub fn with_mode(mut self, mode: LoaderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ignore `HTTP_PROXY` and friends. Tests talking to loopback use this.
    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentShape {
    Index,
    Report,
}

impl DocumentShape {
    fn of(document: &Value) -> Self {
        match document {
            Value::Object(map) if map.contains_key(INDEX_KEY) => DocumentShape::Index,
            _ => DocumentShape::Report,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportLoader {
    fetcher: Fetcher,
    mode: LoaderMode,
}

impl ReportLoader {
    pub fn new(config: LoaderConfig) -> Result<Self, ReportError> {
        Ok(ReportLoader {
            fetcher: Fetcher::new(&config)?,
            mode: config.mode,
        })
    }

    pub fn mode(&self) -> LoaderMode {
        self.mode
    }

    /// Load every report reachable from `location`.
    ///
    /// On success the session holds at least one report, in index order.
    pub async fn load(&self, location: &str) -> Result<ReportSession, ReportError> {
        let origin = ReportLocation::parse(location)?;
        tracing::info!(location = %origin, mode = ?self.mode, "loading reports");

        let document = self.fetcher.fetch_document(&origin).await?;
        let index_shaped = DocumentShape::of(&document) == DocumentShape::Index;

        let reports = match self.mode {
            LoaderMode::Index => self.load_index(&origin, &document).await?,
            LoaderMode::Auto if index_shaped => self.load_index(&origin, &document).await?,
            LoaderMode::Auto | LoaderMode::Single => {
                let report = first_report(&document, &origin)?
                    .ok_or_else(|| ReportError::empty(origin.to_string()))?;
                vec![LoadedReport {
                    title: origin.title(),
                    location: origin.to_string(),
                    report,
                }]
            }
        };

        tracing::info!(location = %origin, reports = reports.len(), "reports loaded");
        ReportSession::new(origin.to_string(), reports)
    }

    async fn load_index(
        &self,
        origin: &ReportLocation,
        document: &Value,
    ) -> Result<Vec<LoadedReport>, ReportError> {
        let entries = index_entries(document, origin)?;
        if entries.is_empty() {
            return Err(ReportError::empty(origin.to_string()));
        }
        tracing::debug!(location = %origin, entries = entries.len(), "index resolved");

        let documents = fetch_all(&self.fetcher, &entries).await?;

        let mut reports = Vec::with_capacity(entries.len());
        for (location, document) in entries.into_iter().zip(documents) {
            match first_report(&document, &location)? {
                Some(report) => reports.push(LoadedReport {
                    title: location.title(),
                    location: location.to_string(),
                    report,
                }),
                None => tracing::warn!(%location, "document holds no report; skipped"),
            }
        }
        if reports.is_empty() {
            return Err(ReportError::empty(origin.to_string()));
        }
        Ok(reports)
    }
}

/// Resolve the entry list of an index document, in listed order.
///
/// Non-string entries are skipped with a warning.
pub fn index_entries(
    document: &Value,
    origin: &ReportLocation,
) -> Result<Vec<ReportLocation>, ReportError> {
    let Some(listed) = document.get(INDEX_KEY).and_then(Value::as_array) else {
        return Err(ReportError::empty(origin.to_string()));
    };

    let mut entries = Vec::with_capacity(listed.len());
    for (position, entry) in listed.iter().enumerate() {
        match entry.as_str() {
            Some(text) => entries.push(origin.resolve(text)?),
            None => tracing::warn!(location = %origin, position, "index entry is not a string; skipped"),
        }
    }
    Ok(entries)
}

/// Fetch all documents concurrently, returned in `entries` order.
///
/// Fail-fast: the first error aborts every outstanding fetch.
async fn fetch_all(
    fetcher: &Fetcher,
    entries: &[ReportLocation],
) -> Result<Vec<Value>, ReportError> {
    let mut tasks = JoinSet::new();
    for (position, location) in entries.iter().cloned().enumerate() {
        let fetcher = fetcher.clone();
        tasks.spawn(async move { (position, fetcher.fetch_document(&location).await) });
    }

    let mut slots: Vec<Option<Value>> = vec![None; entries.len()];
    while let Some(joined) = tasks.join_next().await {
        let (position, result) = match joined {
            Ok(tagged) => tagged,
            Err(e) => {
                tasks.abort_all();
                return Err(ReportError::fetch("<task>", format!("fetch task failed: {e}")));
            }
        };
        match result {
            Ok(document) => slots[position] = Some(document),
            Err(err) => {
                tracing::warn!(location = %entries[position], error = %err, "fetch failed; aborting load");
                tasks.abort_all();
                return Err(err);
            }
        }
    }

    slots
        .into_iter()
        .zip(entries)
        .map(|(slot, location)| {
            slot.ok_or_else(|| ReportError::fetch(location.to_string(), "fetch did not complete"))
        })
        .collect()
}

/// Extract the report from one fetched document.
///
/// `Ok(None)` means the document holds no report at all. A present but
/// non-object report is malformed. Whether `steps` is present is checked
/// later, at normalization.
pub fn first_report(
    document: &Value,
    location: &ReportLocation,
) -> Result<Option<RawReport>, ReportError> {
    let candidate = match document {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return Ok(None),
        },
        Value::Object(map) if map.contains_key("steps") || map.contains_key("status") => document,
        Value::Object(_) | Value::Null => return Ok(None),
        _ => {
            return Err(ReportError::malformed(format!(
                "{location} is neither a report array nor a report object"
            )))
        }
    };

    if !candidate.is_object() {
        return Err(ReportError::malformed(format!(
            "{location}: report entry is not an object"
        )));
    }
    serde_json::from_value(candidate.clone())
        .map(Some)
        .map_err(|e| ReportError::malformed(format!("{location}: {e}")))
}
