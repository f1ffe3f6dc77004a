//! Verdict core: verification report model, normalization and rendering.
//!
//! # Pipeline
//!
//! ```text
//! RawReport ──normalize──▶ ViewModel ──render──▶ DisplaySurface regions
//!                                     ▲
//!                     ReportSession ──┘ (selection, re-render on switch)
//! ```
//!
//! - [`report`]: raw verifier document schema.
//! - [`display_path`]: path shortening for display.
//! - [`normalize`]: RawReport → ViewModel, plus `viewmodel_hash`.
//! - [`surface`]: the abstract region set renderers write into.
//! - [`dashboard`]: ViewModel → regions, and the failure screen.
//! - [`session`]: loaded reports and the report selector.
//!
//! Nothing in this crate performs IO; fetching lives in `verdict-import`.

pub mod dashboard;
pub mod display_path;
pub mod error;
pub mod normalize;
pub mod report;
pub mod session;
pub mod surface;

pub use error::ReportError;
