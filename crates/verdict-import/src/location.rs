//! Report locations.
//!
//! Anything with a `scheme://` prefix is parsed as a URL. `http` and `https`
//! stay remote, `file` becomes a local path, every other scheme is refused.
//! Everything else is a filesystem path.

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;
use verdict_core::ReportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLocation {
    Remote(Url),
    Local(PathBuf),
}

impl ReportLocation {
    pub fn parse(text: &str) -> Result<Self, ReportError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReportError::fetch(text, "empty location"));
        }
        if !text.contains("://") {
            return Ok(ReportLocation::Local(PathBuf::from(text)));
        }

        let url = Url::parse(text)
            .map_err(|e| ReportError::fetch(text, format!("invalid URL: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(ReportLocation::Remote(url)),
            "file" => url
                .to_file_path()
                .map(ReportLocation::Local)
                .map_err(|()| ReportError::fetch(text, "file URL has no local path")),
            other => Err(ReportError::fetch(
                text,
                format!("unsupported scheme `{other}`"),
            )),
        }
    }

    /// Resolve an index entry against this location.
    ///
    /// Absolute URLs and absolute paths are taken as-is. Relative entries
    /// are joined onto the directory holding this document.
    pub fn resolve(&self, entry: &str) -> Result<Self, ReportError> {
        let entry = entry.trim();
        if entry.contains("://") {
            return ReportLocation::parse(entry);
        }
        match self {
            ReportLocation::Remote(base) => base
                .join(entry)
                .map(ReportLocation::Remote)
                .map_err(|e| ReportError::fetch(entry, format!("cannot resolve against {base}: {e}"))),
            ReportLocation::Local(path) => {
                let candidate = Path::new(entry);
                if candidate.is_absolute() {
                    return Ok(ReportLocation::Local(candidate.to_path_buf()));
                }
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(ReportLocation::Local(dir.join(candidate)))
            }
        }
    }

    /// Selector label: the trailing path segment.
    pub fn title(&self) -> String {
        match self {
            ReportLocation::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| url.to_string()),
            ReportLocation::Local(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

impl fmt::Display for ReportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLocation::Remote(url) => write!(f, "{url}"),
            ReportLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
