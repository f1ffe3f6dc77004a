//! Static HTML dashboard.
//!
//! Generates one self-contained page (inline CSS and script, works offline).
//! Every report in the session is rendered by the shared dashboard renderer
//! into a [`RegionBuffer`] and written out as its own `<section>`. With more
//! than one report, a `<select>` choice control shows one section at a time.
//!
//! All text taken from a report is escaped before it reaches the page.
//! Source lines are inserted from their pre-escaped `markup` form only.

use std::fmt::Write as _;

use verdict_core::dashboard::{escape_markup, render_failure};
use verdict_core::session::ReportSession;
use verdict_core::surface::{Panel, RegionBuffer, VIOLATION_COLUMNS};

/// A rendered page plus the reports that fell back to the failure screen.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    pub html: String,
    /// Indices of reports that failed to normalize.
    pub failed: Vec<usize>,
}

/// Render every report in the session into one page.
pub fn render_session_page(session: &ReportSession) -> HtmlPage {
    let mut sections = String::new();
    let mut failed = Vec::new();

    for (index, loaded) in session.reports().iter().enumerate() {
        let mut regions = RegionBuffer::new();
        if session.render_report(index, &mut regions).is_err() {
            failed.push(index);
        }
        let hidden = index != session.selected_index();
        sections.push_str(&render_section(index, &regions, hidden));
        tracing::debug!(index, title = %loaded.title, "section rendered");
    }

    let selector = if session.is_multi() {
        render_selector(session)
    } else {
        String::new()
    };

    HtmlPage {
        html: render_document(&session.selected().title, &selector, &sections),
        failed,
    }
}

/// The page shown when nothing could be loaded: the generic failure banner
/// and no detail regions.
pub fn render_failure_page() -> String {
    let mut regions = RegionBuffer::new();
    render_failure(&mut regions);
    render_document("Verification report", "", &render_section(0, &regions, false))
}

fn render_document(title: &str, selector: &str, sections: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Verdict - {title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header><h1>Verification report</h1>{selector}</header>
        {sections}
    </div>
    <script>{js}</script>
</body>
</html>"#,
        title = escape_markup(title),
        css = inline_css(),
        js = inline_javascript(),
        selector = selector,
        sections = sections,
    )
}

fn render_selector(session: &ReportSession) -> String {
    let mut out = String::from(r#"<select id="report-select" aria-label="Report">"#);
    for choice in session.choices() {
        let selected = if choice.value == session.selected_index() {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            out,
            r#"<option value="{}"{selected}>{}</option>"#,
            choice.value,
            escape_markup(&choice.label)
        );
    }
    out.push_str("</select>");
    out
}

fn render_section(index: usize, regions: &RegionBuffer, hidden: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<section class="report" data-report="{index}"{}>"#,
        hidden_attr(hidden)
    );
    let _ = write!(
        out,
        r#"<div class="{}">{}</div>"#,
        regions.status_tone.css_class(),
        escape_markup(&regions.status_text)
    );
    let _ = write!(
        out,
        r#"<div class="counters"><span>Total steps: <strong class="total-steps">{}</strong></span><span>Violations: <strong class="violation-count">{}</strong></span></div>"#,
        regions.total_steps, regions.violation_count
    );

    for panel in Panel::ALL {
        let _ = write!(
            out,
            r#"<div id="{id}-{index}" class="panel {id}"{hidden}><h2>{title}</h2>{body}</div>"#,
            id = panel.element_id(),
            hidden = hidden_attr(!regions.is_visible(panel)),
            title = panel.title(),
            body = panel_body(regions, panel),
        );
    }
    out.push_str("</section>");
    out
}

fn panel_body(regions: &RegionBuffer, panel: Panel) -> String {
    match panel {
        Panel::Violations => violations_table(regions),
        Panel::InitialValues => format!("<pre>{}</pre>", escape_markup(&regions.initial_values)),
        Panel::SourceCode => source_blocks(regions),
        Panel::Trace => {
            let mut out = String::from(r#"<div class="trace">"#);
            for line in &regions.trace_lines {
                let _ = write!(
                    out,
                    r#"<div class="{}">{}</div>"#,
                    line.css_class(),
                    escape_markup(&line.text)
                );
            }
            out.push_str("</div>");
            out
        }
    }
}

fn violations_table(regions: &RegionBuffer) -> String {
    let mut out = String::from("<table><thead><tr>");
    for column in VIOLATION_COLUMNS {
        let _ = write!(out, "<th>{column}</th>");
    }
    out.push_str("</tr></thead><tbody>");
    for row in &regions.violation_rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_markup(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

fn source_blocks(regions: &RegionBuffer) -> String {
    let mut out = String::new();
    for block in &regions.source_blocks {
        let _ = write!(
            out,
            r#"<div class="source-file"><h3>{}</h3><pre>"#,
            escape_markup(&block.filename)
        );
        for line in &block.lines {
            let _ = writeln!(
                out,
                r#"<span class="{}" data-line="{n}"><span class="line-number">{n}</span>{}</span>"#,
                escape_markup(&line.css_class()),
                line.markup,
                n = line.number
            );
        }
        out.push_str("</pre></div>");
    }
    out
}

fn hidden_attr(hidden: bool) -> &'static str {
    if hidden {
        " hidden"
    } else {
        ""
    }
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; }
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; margin: 0; color: #111827; }
.container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
header { display: flex; gap: 1rem; align-items: center; margin-bottom: 1rem; }
header h1 { font-size: 1.5rem; margin: 0; }
.status-box { padding: 1rem; border-radius: 6px; font-weight: 700; background: #f3f4f6; }
.status-box.success { background: #dcfce7; color: #166534; }
.status-box.failure { background: #fee2e2; color: #991b1b; }
.counters { display: flex; gap: 2rem; margin: 1rem 0; }
.panel { margin-bottom: 1.5rem; }
.panel h2 { font-size: 1.1rem; border-bottom: 1px solid #e5e7eb; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 0.25rem 0.5rem; border-bottom: 1px solid #e5e7eb; }
pre { background: #f9fafb; padding: 0.5rem; overflow-x: auto; }
.source-file h3 { font-size: 0.95rem; margin: 0.5rem 0 0; }
.line { display: block; }
.line-number { display: inline-block; width: 3.5em; padding-right: 1em; text-align: right; color: #9ca3af; user-select: none; }
.line.execution { background: #dcfce7; }
.line.violation { background: #fecaca; font-weight: 700; }
.trace { font-family: ui-monospace, monospace; font-size: 0.85rem; }
.trace-step.violation { color: #b91c1c; font-weight: 700; }
.trace-step.assignment { color: #1d4ed8; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
(function () {
    var select = document.getElementById('report-select');
    if (!select) { return; }
    select.addEventListener('change', function () {
        document.querySelectorAll('section.report').forEach(function (section) {
            section.hidden = section.dataset.report !== select.value;
        });
    });
})();
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_core::dashboard::FAILURE_BANNER;
    use verdict_core::session::LoadedReport;

    fn loaded(title: &str, value: serde_json::Value) -> LoadedReport {
        LoadedReport {
            title: title.to_string(),
            location: format!("https://ci.example/{title}"),
            report: serde_json::from_value(value).unwrap(),
        }
    }

    fn single(value: serde_json::Value) -> ReportSession {
        ReportSession::new("r.json", vec![loaded("r.json", value)]).unwrap()
    }

    #[test]
    fn report_text_is_escaped_everywhere() {
        let session = single(json!({
            "status": "violation",
            "steps": [{"type": "violation", "file": "/w/<a>.c", "function": "f<T>",
                        "line": 1, "message": "<script>alert(1)</script>"}],
            "initial_values": {"p": {"value": "<b>"}},
            "source_files": {"/w/<a>.c": ["if (a < b && c > d) {}"]}
        }));
        let page = render_session_page(&session);
        assert!(!page.html.contains("<script>alert(1)</script>"));
        assert!(page.html.contains("&lt;script&gt;alert(1)&lt;&#x2f;script&gt;")
            || page.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.html.contains("a &lt; b &amp;&amp; c &gt; d"));
        assert!(!page.html.contains("<b>"));
        assert!(page.failed.is_empty());
    }

    #[test]
    fn single_report_has_no_selector() {
        let page = render_session_page(&single(json!({"status": "success", "steps": []})));
        assert!(!page.html.contains("<select"));
        assert!(page.html.contains(r#"<div class="status-box success">VERIFICATION SUCCESSFUL</div>"#));
        assert!(page.html.contains(r#"id="violations-panel-0" class="panel violations-panel" hidden"#));
    }

    #[test]
    fn multi_report_gets_selector_and_one_visible_section() {
        let session = ReportSession::new(
            "idx.json",
            vec![
                loaded("a.json", json!({"status": "success", "steps": []})),
                loaded("b.json", json!({"status": "success", "steps": []})),
            ],
        )
        .unwrap();
        let html = render_session_page(&session).html;
        assert!(html.contains(r#"<option value="0" selected>a.json</option>"#));
        assert!(html.contains(r#"<option value="1">b.json</option>"#));
        assert!(html.contains(r#"<section class="report" data-report="0">"#));
        assert!(html.contains(r#"<section class="report" data-report="1" hidden>"#));
    }

    #[test]
    fn malformed_report_is_listed_and_shows_failure_banner() {
        let session = ReportSession::new(
            "idx.json",
            vec![
                loaded("ok.json", json!({"status": "success", "steps": []})),
                loaded("bad.json", json!({"status": "success"})),
            ],
        )
        .unwrap();
        let page = render_session_page(&session);
        assert_eq!(page.failed, vec![1]);
        assert!(page.html.contains(FAILURE_BANNER));
    }

    #[test]
    fn coverage_classes_reach_source_lines() {
        let page = render_session_page(&single(json!({
            "status": "success",
            "steps": [],
            "source_files": {"/w/m.c": ["a", "b"]},
            "coverage": {"files": {"/w/m.c": {"covered_lines": {"2": {"type": "execution"}}}}}
        })));
        assert!(page.html.contains(
            r#"<span class="line" data-line="1"><span class="line-number">1</span>a</span>"#
        ));
        assert!(page.html.contains(
            r#"<span class="line execution" data-line="2"><span class="line-number">2</span>b</span>"#
        ));
        assert!(inline_css().contains(".line-number"));
    }

    #[test]
    fn coverage_type_cannot_inject_markup() {
        let page = render_session_page(&single(json!({
            "status": "success",
            "steps": [],
            "source_files": {"/w/m.c": ["a"]},
            "coverage": {"files": {"/w/m.c": {"covered_lines": {
                "1": {"type": "x\"><img src=x onerror=alert(1)>"}
            }}}}
        })));
        assert!(!page.html.contains("<img src=x onerror=alert(1)>"));
        assert!(page.html.contains(
            r#"<span class="line" data-line="1"><span class="line-number">1</span>a</span>"#
        ));
    }

    #[test]
    fn failure_page_hides_every_panel() {
        let html = render_failure_page();
        assert!(html.contains(FAILURE_BANNER));
        assert!(html.contains(r#"class="status-box failure""#));
        for panel in Panel::ALL {
            assert!(html.contains(&format!(r#"id="{}-0" class="panel {}" hidden"#, panel.element_id(), panel.element_id())));
        }
    }
}
