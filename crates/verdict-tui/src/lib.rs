//! Verdict TUI: terminal and HTML surfaces for verification reports.
//!
//! # Overview
//!
//! Two concrete display surfaces sit on top of the same renderer:
//! - **Terminal dashboard** ([`run_viewer`]): status strip plus the visible
//!   detail panels, with keyboard report switching.
//! - **Static HTML page** ([`html`]): one self-contained file, one section
//!   per report, a choice control when more than one report is loaded.
//!
//! # Architecture
//!
//! ```text
//! ReportSession ──render_report──▶ RegionBuffer ──▶ status strip
//!       ▲                                       └──▶ detail panels
//!       └── ←/→ switch report (re-normalizes from raw)
//! ```
//!
//! The viewer never fetches. It is handed a fully loaded session, or
//! nothing at all when loading failed ([`run_failure_viewer`]), in which case
//! it shows the failure screen until dismissed.

pub mod html;

mod detail_panels;
mod status_strip;
mod visual_tone;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use status_strip::ReportPosition;
use std::collections::BTreeMap;
use std::io::{self, stdout};
use std::time::Duration;
use verdict_core::dashboard::render_failure;
use verdict_core::session::ReportSession;
use verdict_core::surface::{Panel, RegionBuffer};

/// Presentation profile for UI rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiProfile {
    #[default]
    Standard,
    Showcase,
}

const KEY_HINTS: &str = " ←/→ report · Tab panel · j/k scroll · q quit";

/// Application state for the terminal dashboard.
struct App {
    /// `None` when loading failed; only the failure screen is shown.
    session: Option<ReportSession>,
    /// Location the dashboard was opened on.
    origin: String,
    /// What the renderer last wrote for the selected report.
    regions: RegionBuffer,
    /// Panel receiving scroll keys; `None` when nothing is visible.
    focus: Option<Panel>,
    scroll: BTreeMap<Panel, u16>,
    should_quit: bool,
    ui_profile: UiProfile,
}

impl App {
    fn new(session: ReportSession) -> Self {
        let mut app = App::blank(session.origin().to_string(), Some(session));
        // A malformed first report leaves the failure screen in `regions`.
        if let Some(session) = &app.session {
            let _ = session.render_selected(&mut app.regions);
        }
        app.reset_view();
        app
    }

    fn failed(origin: &str) -> Self {
        let mut app = App::blank(origin.to_string(), None);
        render_failure(&mut app.regions);
        app
    }

    fn blank(origin: String, session: Option<ReportSession>) -> Self {
        App {
            session,
            origin,
            regions: RegionBuffer::new(),
            focus: None,
            scroll: BTreeMap::new(),
            should_quit: false,
            ui_profile: UiProfile::Standard,
        }
    }

    fn is_multi(&self) -> bool {
        self.session.as_ref().is_some_and(ReportSession::is_multi)
    }

    /// Handle a key event. Accepts the full KeyEvent to support modifier keys (Ctrl-C).
    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Right | KeyCode::Char(']') if self.is_multi() => {
                if let Some(session) = self.session.as_mut() {
                    let _ = session.select_next(&mut self.regions);
                }
                self.reset_view();
            }
            KeyCode::Left | KeyCode::Char('[') if self.is_multi() => {
                if let Some(session) = self.session.as_mut() {
                    let _ = session.select_previous(&mut self.regions);
                }
                self.reset_view();
            }
            KeyCode::Tab => {
                self.focus = next_focus(self.focus, &self.regions.visible_panels());
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_focused(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_focused(-1),
            _ => {}
        }
    }

    fn scroll_focused(&mut self, delta: i32) {
        let Some(panel) = self.focus else {
            return;
        };
        let max = detail_panels::max_scroll(&self.regions, panel);
        let offset = self.scroll.entry(panel).or_insert(0);
        *offset = if delta < 0 {
            offset.saturating_sub(1)
        } else {
            offset.saturating_add(1).min(max)
        };
    }

    fn scroll_of(&self, panel: Panel) -> u16 {
        self.scroll.get(&panel).copied().unwrap_or(0)
    }

    /// After a report switch: scroll to top, focus the first visible panel.
    fn reset_view(&mut self) {
        self.scroll.clear();
        self.focus = self.regions.visible_panels().first().copied();
    }

    fn position(&self) -> ReportPosition<'_> {
        match &self.session {
            Some(session) => ReportPosition {
                title: &session.selected().title,
                index: session.selected_index(),
                count: session.len(),
            },
            None => ReportPosition {
                title: &self.origin,
                index: 0,
                count: 0,
            },
        }
    }
}

/// Cycle focus through the visible panels in display order.
fn next_focus(current: Option<Panel>, visible: &[Panel]) -> Option<Panel> {
    let first = visible.first().copied();
    let Some(current) = current else {
        return first;
    };
    match visible.iter().position(|panel| *panel == current) {
        Some(at) => visible.get((at + 1) % visible.len()).copied(),
        None => first,
    }
}

/// Render a session's selected report to a buffer string for snapshot testing.
#[doc(hidden)]
pub fn render_to_buffer(session: ReportSession, width: u16, height: u16) -> io::Result<String> {
    let app = App::new(session);
    render_multiline(&app, width, height, UiProfile::Standard)
}

/// Like [`render_to_buffer`], after replaying key presses.
#[doc(hidden)]
pub fn render_after_keys(
    session: ReportSession,
    keys: &[KeyEvent],
    width: u16,
    height: u16,
) -> io::Result<String> {
    let mut app = App::new(session);
    for key in keys {
        app.handle_key(*key);
    }
    render_multiline(&app, width, height, UiProfile::Standard)
}

fn render_multiline(app: &App, width: u16, height: u16, profile: UiProfile) -> io::Result<String> {
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).map_err(infallible_to_io)?;
    terminal
        .draw(|frame| render(frame, app, profile))
        .map_err(infallible_to_io)?;

    let buf = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..height {
        for x in 0..width {
            text.push(buf[(x, y)].symbol().chars().next().unwrap_or(' '));
        }
        if y + 1 < height {
            text.push('\n');
        }
    }
    Ok(text)
}

/// Render the load-failure screen to a buffer string for snapshot testing.
#[doc(hidden)]
pub fn render_failure_to_buffer(origin: &str, width: u16, height: u16) -> io::Result<String> {
    render_multiline(&App::failed(origin), width, height, UiProfile::Standard)
}

/// Run the terminal dashboard over a loaded session.
pub fn run_viewer(session: ReportSession, profile: UiProfile) -> io::Result<()> {
    run_app(App::new(session), profile)
}

/// Show the failure screen for a location that could not be loaded.
pub fn run_failure_viewer(origin: &str, profile: UiProfile) -> io::Result<()> {
    run_app(App::failed(origin), profile)
}

fn run_app(mut app: App, profile: UiProfile) -> io::Result<()> {
    // Set up panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    app.ui_profile = profile;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|frame| render(frame, &app, app.ui_profile))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

fn infallible_to_io(err: std::convert::Infallible) -> io::Error {
    match err {}
}

/// Render the application to a frame.
fn render(frame: &mut Frame, app: &App, profile: UiProfile) {
    let area = frame.area();

    // Status strip on top (2 borders + banner + counters), key hints at the bottom.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    status_strip::render_status_strip(frame, chunks[0], &app.regions, app.position(), profile);
    detail_panels::render_detail_panels(
        frame,
        chunks[1],
        &app.regions,
        app.focus,
        |panel| app.scroll_of(panel),
        profile,
    );

    let hints = if app.is_multi() {
        KEY_HINTS
    } else {
        " Tab panel · j/k scroll · q quit"
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hints, visual_tone::muted_for(profile)))),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_core::dashboard::FAILURE_BANNER;
    use verdict_core::session::LoadedReport;
    use verdict_core::surface::StatusTone;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn ctrl_key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn loaded(title: &str, value: serde_json::Value) -> LoadedReport {
        LoadedReport {
            title: title.to_string(),
            location: format!("out/{title}"),
            report: serde_json::from_value(value).unwrap(),
        }
    }

    fn test_app() -> App {
        let trace: Vec<_> = (1..=20)
            .map(|n| json!({"step_number": n, "type": "function_call", "file": "/w/a.c", "line": n}))
            .chain(std::iter::once(
                json!({"step_number": 21, "type": "violation", "file": "/w/a.c", "line": 21, "message": "overflow"}),
            ))
            .collect();
        let session = ReportSession::new(
            "out/index.json",
            vec![
                loaded("first.json", json!({"status": "violation", "steps": trace})),
                loaded("second.json", json!({"status": "success", "steps": []})),
                loaded("broken.json", json!({"status": "success"})),
            ],
        )
        .unwrap();
        App::new(session)
    }

    #[test]
    fn handle_key_q_quits() {
        let mut app = test_app();
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn handle_key_esc_quits() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn handle_key_ctrl_c_quits() {
        let mut app = test_app();
        app.handle_key(ctrl_key('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn focus_starts_on_first_visible_panel() {
        let app = test_app();
        assert_eq!(app.focus, Some(Panel::Violations));
    }

    #[test]
    fn tab_cycles_visible_panels_only() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Some(Panel::Trace));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Some(Panel::Violations));
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Tab));
        for _ in 0..50 {
            app.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(app.scroll_of(Panel::Trace), 20);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.scroll_of(Panel::Trace), 19);
    }

    #[test]
    fn right_and_left_switch_reports_with_wrap() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.as_ref().unwrap().selected_index(), 1);
        assert_eq!(app.regions.status_tone, StatusTone::Success);
        assert_eq!(app.focus, None);

        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.session.as_ref().unwrap().selected_index(), 2);
        assert_eq!(app.regions.status_text, FAILURE_BANNER);
    }

    #[test]
    fn switching_resets_scroll() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.scroll_of(Panel::Violations), 1);
        app.handle_key(key(KeyCode::Char(']')));
        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.scroll_of(Panel::Violations), 0);
    }

    #[test]
    fn single_report_ignores_switch_keys() {
        let session = ReportSession::new(
            "r.json",
            vec![loaded("r.json", json!({"status": "success", "steps": []}))],
        )
        .unwrap();
        let mut app = App::new(session);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.as_ref().unwrap().selected_index(), 0);
    }

    #[test]
    fn failed_load_shows_failure_screen_and_quits() {
        let mut app = App::failed("https://ci.example/idx.json");
        assert_eq!(app.regions.status_text, FAILURE_BANNER);
        assert!(app.regions.visible_panels().is_empty());
        assert_eq!(app.focus, None);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('j')));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn next_focus_handles_stale_panel() {
        assert_eq!(
            next_focus(Some(Panel::SourceCode), &[Panel::Trace]),
            Some(Panel::Trace)
        );
        assert_eq!(next_focus(Some(Panel::Trace), &[]), None);
    }
}
