//! Detail panels: violations, initial values, source code, execution trace.
//!
//! Each panel is a scrollable paragraph built from the matching region of a
//! [`RegionBuffer`]. Only panels the renderer marked visible are laid out.

use crate::{visual_tone, UiProfile};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use verdict_core::surface::{Panel, RegionBuffer, VIOLATION_COLUMNS};

/// Content lines of one panel, before scrolling.
pub fn panel_lines(regions: &RegionBuffer, panel: Panel) -> Vec<Line<'static>> {
    match panel {
        Panel::Violations => violation_lines(regions),
        Panel::InitialValues => regions
            .initial_values
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect(),
        Panel::SourceCode => source_lines(regions),
        Panel::Trace => regions
            .trace_lines
            .iter()
            .map(|line| Line::from(Span::styled(line.text.clone(), visual_tone::trace(line.tone))))
            .collect(),
    }
}

/// Largest useful scroll offset for a panel.
pub fn max_scroll(regions: &RegionBuffer, panel: Panel) -> u16 {
    let count = panel_lines(regions, panel).len();
    u16::try_from(count.saturating_sub(1)).unwrap_or(u16::MAX)
}

fn violation_lines(regions: &RegionBuffer) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(regions.violation_rows.len() + 1);
    lines.push(Line::from(Span::styled(
        VIOLATION_COLUMNS.join(" | "),
        visual_tone::header(),
    )));
    for [file, func, line, message] in &regions.violation_rows {
        lines.push(Line::from(vec![
            Span::styled(file.clone(), visual_tone::info()),
            Span::raw(" | "),
            Span::raw(func.clone()),
            Span::raw(" | "),
            Span::raw(line.clone()),
            Span::raw(" | "),
            Span::styled(message.clone(), visual_tone::error()),
        ]));
    }
    lines
}

fn source_lines(regions: &RegionBuffer) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in &regions.source_blocks {
        lines.push(Line::from(Span::styled(
            block.filename.clone(),
            visual_tone::header(),
        )));
        for line in &block.lines {
            let style = visual_tone::coverage(line.classification.as_deref());
            lines.push(Line::from(vec![
                Span::styled(format!("{:>5} ", line.number), visual_tone::muted()),
                Span::styled(line.text.clone(), style),
            ]));
        }
    }
    lines
}

/// Lay out and draw every visible panel, stacked top to bottom.
pub fn render_detail_panels(
    frame: &mut Frame,
    area: Rect,
    regions: &RegionBuffer,
    focus: Option<Panel>,
    scroll_of: impl Fn(Panel) -> u16,
    profile: UiProfile,
) {
    let visible = regions.visible_panels();
    if visible.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  (nothing to show for this report)",
            visual_tone::muted_for(profile),
        )));
        frame.render_widget(empty, area);
        return;
    }

    let count = visible.len() as u32;
    let constraints: Vec<Constraint> = visible.iter().map(|_| Constraint::Ratio(1, count)).collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (panel, row) in visible.iter().zip(rows.iter()) {
        render_panel(
            frame,
            *row,
            regions,
            *panel,
            focus == Some(*panel),
            scroll_of(*panel),
            profile,
        );
    }
}

fn render_panel(
    frame: &mut Frame,
    area: Rect,
    regions: &RegionBuffer,
    panel: Panel,
    focused: bool,
    scroll: u16,
    profile: UiProfile,
) {
    let border_style: Style = if focused {
        visual_tone::focused_border_for(profile)
    } else {
        visual_tone::panel_border_for(profile)
    };
    let title = if focused {
        format!(" {} · j/k ", panel.title())
    } else {
        format!(" {} ", panel.title())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(match profile {
            UiProfile::Standard => BorderType::Plain,
            UiProfile::Showcase => BorderType::Rounded,
        })
        .border_style(border_style);

    let paragraph = Paragraph::new(panel_lines(regions, panel))
        .block(block)
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use verdict_core::dashboard::render;
    use verdict_core::normalize::normalize;
    use verdict_core::report::RawReport;

    fn buffer_text(terminal: &Terminal<TestBackend>, area: Rect) -> String {
        let buf = terminal.backend().buffer();
        let mut text = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                text.push(buf[(x, y)].symbol().chars().next().unwrap_or(' '));
            }
        }
        text
    }

    fn regions_for(json: &str) -> RegionBuffer {
        let raw: RawReport = serde_json::from_str(json).unwrap();
        let mut regions = RegionBuffer::new();
        render(&normalize(&raw).unwrap(), &mut regions);
        regions
    }

    const REPORT: &str = r#"{
        "status": "violation",
        "steps": [
            {"step_number": 1, "type": "assignment", "file": "/w/src/main.c", "line": 3,
             "assignment": {"lhs": "x", "rhs": "7"}},
            {"step_number": 2, "type": "violation", "file": "/w/src/main.c", "line": 4,
             "function": "main", "message": "division by zero"}
        ],
        "initial_values": {"x": {"value": "0"}},
        "source_files": {"/w/src/main.c": ["int main() {", "  int y;", "  x = 7;", "  y = 1 / 0;", "}"]},
        "coverage": {"files": {"/w/src/main.c": {"covered_lines": {"4": {"type": "violation"}}}}}
    }"#;

    #[test]
    fn violation_panel_has_header_and_row() {
        let lines = panel_lines(&regions_for(REPORT), Panel::Violations);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "File | Function | Line | Message");
        assert_eq!(
            lines[1].to_string(),
            "src/main.c | main | 4 | division by zero"
        );
    }

    #[test]
    fn source_panel_numbers_lines_under_filename() {
        let lines = panel_lines(&regions_for(REPORT), Panel::SourceCode);
        assert_eq!(lines[0].to_string(), "src/main.c");
        assert_eq!(lines[4].to_string(), "    4   y = 1 / 0;");
        assert_eq!(lines[4].spans[1].style, visual_tone::coverage(Some("violation")));
    }

    #[test]
    fn max_scroll_tracks_content() {
        let regions = regions_for(REPORT);
        assert_eq!(max_scroll(&regions, Panel::Trace), 1);
        assert_eq!(max_scroll(&RegionBuffer::new(), Panel::Trace), 0);
    }

    #[test]
    fn only_visible_panels_are_drawn() {
        let regions = regions_for(r#"{"status": "success", "steps": [], "initial_values": {"n": 3}}"#);
        let area = Rect::new(0, 0, 80, 10);
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal
            .draw(|frame| {
                render_detail_panels(frame, area, &regions, None, |_| 0, UiProfile::Standard)
            })
            .unwrap();
        let text = buffer_text(&terminal, area);
        assert!(text.contains("Initial values"));
        assert!(text.contains("n = 3"));
        assert!(!text.contains("Violations"));
        assert!(!text.contains("Execution trace"));
    }

    #[test]
    fn empty_regions_show_placeholder() {
        let area = Rect::new(0, 0, 60, 3);
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal
            .draw(|frame| {
                render_detail_panels(
                    frame,
                    area,
                    &RegionBuffer::new(),
                    None,
                    |_| 0,
                    UiProfile::Standard,
                )
            })
            .unwrap();
        assert!(buffer_text(&terminal, area).contains("nothing to show"));
    }
}
