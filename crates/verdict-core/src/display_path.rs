//! Display paths: shortened source paths for tables and trace lines.
//!
//! Verifiers report absolute build-machine paths. The dashboard shows only
//! the last two `/`-separated segments, which needs no deployment-specific
//! prefix and still disambiguates the common `dir/file.c` case.

/// Shown wherever a path (or other positional field) is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Shorten a raw source path for display.
///
/// Pure and total: `None` or an empty string yields [`NOT_AVAILABLE`];
/// otherwise the last two segments joined by `/` (or everything, when there
/// are fewer than two).
pub fn display_path(full_path: Option<&str>) -> String {
    match full_path {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(path) => {
            let segments: Vec<&str> = path.split('/').collect();
            let start = segments.len().saturating_sub(2);
            segments[start..].join("/")
        }
    }
}
