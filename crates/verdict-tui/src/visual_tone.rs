//! Shared visual tone tokens for the Verdict terminal dashboard.
//!
//! These helpers keep status semantics consistent across panels:
//! - success: verification passed, executed lines
//! - error: violations, failed loads
//! - warning: coverage kinds without a dedicated color
//! - info: assignments, report identifiers
//! - muted: helper text and metadata chrome

use crate::UiProfile;
use ratatui::style::{Color, Modifier, Style};
use verdict_core::surface::{StatusTone, TraceTone};

pub fn success() -> Style {
    Style::default().fg(Color::Green)
}

pub fn warning() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red)
}

pub fn info() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn header() -> Style {
    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn status(tone: StatusTone) -> Style {
    match tone {
        StatusTone::Pending => muted(),
        StatusTone::Success => success().add_modifier(Modifier::BOLD),
        StatusTone::Failure => error().add_modifier(Modifier::BOLD),
    }
}

/// Style for a source line given its coverage classification.
pub fn coverage(classification: Option<&str>) -> Style {
    match classification {
        None => Style::default(),
        Some("violation") => error().add_modifier(Modifier::BOLD),
        Some("execution") => success(),
        Some(_) => warning(),
    }
}

pub fn trace(tone: TraceTone) -> Style {
    match tone {
        TraceTone::Plain => Style::default(),
        TraceTone::Violation => error(),
        TraceTone::Assignment => info(),
    }
}

pub fn panel_border_for(profile: UiProfile) -> Style {
    match profile {
        UiProfile::Standard => Style::default().fg(Color::Gray),
        UiProfile::Showcase => Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
    }
}

/// Border of the panel that currently receives scroll keys.
pub fn focused_border_for(profile: UiProfile) -> Style {
    match profile {
        UiProfile::Standard => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        UiProfile::Showcase => Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD),
    }
}

pub fn info_for(profile: UiProfile) -> Style {
    match profile {
        UiProfile::Standard => info(),
        UiProfile::Showcase => Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD),
    }
}

pub fn muted_for(profile: UiProfile) -> Style {
    match profile {
        UiProfile::Standard => muted(),
        UiProfile::Showcase => Style::default().fg(Color::Gray),
    }
}
