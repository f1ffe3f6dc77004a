//! Verdict import: fetch verification reports and assemble a
//! [`verdict_core::session::ReportSession`].
//!
//! # Overview
//!
//! A load starts from one location, a URL or a local path, and resolves to
//! either a single report or an index document listing several reports.
//!
//! | Location kind | Read with |
//! |---------------|-----------|
//! | `http://`, `https://` | `reqwest` GET |
//! | `file://`, bare path | `tokio::fs::read` |
//!
//! Index entries are fetched concurrently. The first failure aborts the
//! remaining fetches and fails the whole load; nothing is retried.
//!
//! - [`location`]: location parsing, titles, relative resolution.
//! - [`fetch`]: one document → parsed JSON.
//! - [`loader`]: single/index orchestration and report extraction.

pub mod fetch;
pub mod loader;
pub mod location;

pub use loader::{LoaderConfig, LoaderMode, ReportLoader};
pub use location::ReportLocation;
