//! Status strip: always-visible verdict banner, counters and report position.
//!
//! The strip is the terminal rendering of the status region. It stays on
//! screen in every state, including the failure screen where all detail
//! panels are hidden.

use crate::{visual_tone, UiProfile};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use verdict_core::surface::RegionBuffer;

/// Which report the strip describes.
#[derive(Debug, Clone, Copy)]
pub struct ReportPosition<'a> {
    pub title: &'a str,
    /// 0-based.
    pub index: usize,
    /// 0 when no report could be loaded.
    pub count: usize,
}

pub fn render_status_strip(
    frame: &mut Frame,
    area: Rect,
    regions: &RegionBuffer,
    position: ReportPosition<'_>,
    profile: UiProfile,
) {
    let status_line = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            regions.status_text.clone(),
            visual_tone::status(regions.status_tone),
        ),
    ]);

    let violations_style = if regions.violation_count > 0 {
        visual_tone::error()
    } else {
        visual_tone::success()
    };
    let mut counters = vec![
        Span::styled(" Steps: ", Style::default().fg(Color::White)),
        Span::raw(regions.total_steps.to_string()),
        Span::raw(" | "),
        Span::styled("Violations: ", Style::default().fg(Color::White)),
        Span::styled(regions.violation_count.to_string(), violations_style),
        Span::raw(" | "),
        Span::styled("Report: ", Style::default().fg(Color::White)),
        Span::styled(position.title.to_string(), visual_tone::info_for(profile)),
    ];
    // Nothing loaded: the title is the requested location.
    if position.count > 0 {
        counters.push(Span::styled(
            format!(" ({}/{})", position.index + 1, position.count),
            visual_tone::muted_for(profile),
        ));
    }
    let counters_line = Line::from(counters);

    let block = Block::default()
        .title(match profile {
            UiProfile::Standard => " Verdict ",
            UiProfile::Showcase => " Verdict · verification dashboard ",
        })
        .borders(Borders::ALL)
        .border_type(match profile {
            UiProfile::Standard => BorderType::Plain,
            UiProfile::Showcase => BorderType::Rounded,
        })
        .border_style(visual_tone::panel_border_for(profile));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(vec![status_line, counters_line]), inner);
}
