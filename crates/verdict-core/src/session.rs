//! Loaded-report session and report selector.
//!
//! A [`ReportSession`] is written once, after every fetch has resolved, and
//! only read afterwards. It is owned by the top-level load orchestration and
//! passed explicitly to whatever renders it. Switching reports re-normalizes
//! the chosen report from its raw form and never touches the others.

use crate::dashboard::{render, render_failure};
use crate::error::ReportError;
use crate::normalize::{normalize, ViewModel};
use crate::report::RawReport;
use crate::surface::DisplaySurface;
use serde::Serialize;
use thiserror::Error;

/// One fetched report document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedReport {
    /// Display title, e.g. the document's file name.
    pub title: String,
    /// Where the document came from.
    pub location: String,
    pub report: RawReport,
}

/// Selector entry: `value` is the report index, `label` its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportChoice {
    pub value: usize,
    pub label: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no report at index {index} ({count} loaded)")]
    OutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone)]
pub struct ReportSession {
    origin: String,
    reports: Vec<LoadedReport>,
    selected: usize,
}

impl ReportSession {
    /// Fails with [`ReportError::EmptyReport`] when nothing was loaded.
    pub fn new(origin: impl Into<String>, reports: Vec<LoadedReport>) -> Result<Self, ReportError> {
        let origin = origin.into();
        if reports.is_empty() {
            return Err(ReportError::empty(origin));
        }
        Ok(ReportSession {
            origin,
            reports,
            selected: 0,
        })
    }

    /// The location the session was loaded from (report or index document).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn reports(&self) -> &[LoadedReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// More than one report: a choice control is worth showing.
    pub fn is_multi(&self) -> bool {
        self.reports.len() > 1
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> &LoadedReport {
        &self.reports[self.selected]
    }

    /// One entry per report, in load order.
    pub fn choices(&self) -> Vec<ReportChoice> {
        self.reports
            .iter()
            .enumerate()
            .map(|(value, loaded)| ReportChoice {
                value,
                label: loaded.title.clone(),
            })
            .collect()
    }

    pub fn view_model(&self, index: usize) -> Result<ViewModel, SessionError> {
        let loaded = self.get(index)?;
        Ok(normalize(&loaded.report)?)
    }

    /// Render one report without changing the selection.
    ///
    /// A report that fails to normalize leaves the failure screen on the
    /// surface and returns the error. An out-of-range index leaves the
    /// surface untouched.
    pub fn render_report<S: DisplaySurface + ?Sized>(
        &self,
        index: usize,
        surface: &mut S,
    ) -> Result<(), SessionError> {
        let loaded = self.get(index)?;
        match normalize(&loaded.report) {
            Ok(vm) => {
                render(&vm, surface);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    title = %loaded.title,
                    location = %loaded.location,
                    error = %err,
                    "report failed to normalize"
                );
                render_failure(surface);
                Err(err.into())
            }
        }
    }

    pub fn render_selected<S: DisplaySurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> Result<(), SessionError> {
        self.render_report(self.selected, surface)
    }

    /// Switch to another report and render it.
    ///
    /// The selection moves even when the new report is malformed, so the
    /// user can switch away again.
    pub fn select<S: DisplaySurface + ?Sized>(
        &mut self,
        index: usize,
        surface: &mut S,
    ) -> Result<(), SessionError> {
        self.get(index)?;
        self.selected = index;
        self.render_selected(surface)
    }

    /// Select the following report, wrapping around.
    pub fn select_next<S: DisplaySurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<(), SessionError> {
        let next = (self.selected + 1) % self.reports.len();
        self.select(next, surface)
    }

    /// Select the preceding report, wrapping around.
    pub fn select_previous<S: DisplaySurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<(), SessionError> {
        let count = self.reports.len();
        let previous = (self.selected + count - 1) % count;
        self.select(previous, surface)
    }

    fn get(&self, index: usize) -> Result<&LoadedReport, SessionError> {
        self.reports.get(index).ok_or(SessionError::OutOfRange {
            index,
            count: self.reports.len(),
        })
    }
}
