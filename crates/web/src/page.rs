//! The single-page form and report rendering.

use comrak::{Options, markdown_to_html};
use curie_agents::ResearchRequest;

pub const TITLE: &str = "AI Science Research Assistant";

pub const DEFAULT_TOPIC: &str = "CRISPR gene editing applications";
pub const DEFAULT_SCOPE: &str = "Last 5 years, medical applications";
pub const DEFAULT_DEPTH: &str = "Graduate level, include technical details";
pub const DEFAULT_FOCUS: &str = "Clinical trials, ethical considerations, recent breakthroughs";

/// The values the form starts with.
pub fn default_request() -> ResearchRequest {
    ResearchRequest::new(DEFAULT_TOPIC, DEFAULT_SCOPE, DEFAULT_DEPTH, DEFAULT_FOCUS)
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render report text as Markdown. Raw HTML in the text is not passed
/// through.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;
    markdown_to_html(text, &options)
}

fn text_field(name: &str, label: &str, value: &str, placeholder: &str) -> String {
    format!(
        r#"<label for="{name}">{label}</label>
<input type="text" id="{name}" name="{name}" value="{value}" placeholder="{placeholder}">"#,
        value = escape_html(value),
        placeholder = escape_html(placeholder),
    )
}

/// The whole page: the form filled with `form`, and the rendered report
/// when there is one.
pub fn render_page(form: &ResearchRequest, report: Option<&str>) -> String {
    let fields = [
        text_field("topic", "Research Topic", &form.topic, DEFAULT_TOPIC),
        text_field("scope", "Research Scope", &form.scope, DEFAULT_SCOPE),
        text_field("depth", "Technical Depth", &form.depth, DEFAULT_DEPTH),
        text_field("focus_areas", "Focus Areas", &form.focus_areas, DEFAULT_FOCUS),
    ]
    .join("\n");

    let report_html = report.map(render_markdown).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{TITLE}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 0; background: #f6f7fb; color: #1f2430; }}
main {{ max-width: 1200px; margin: 0 auto; padding: 2rem 1rem; }}
.row {{ display: flex; gap: 2rem; flex-wrap: wrap; }}
.inputs {{ flex: 1; min-width: 280px; display: flex; flex-direction: column; gap: 0.5rem; }}
.output {{ flex: 2; min-width: 320px; background: #fff; border-radius: 8px; padding: 1rem 1.5rem; }}
input {{ padding: 0.5rem; border: 1px solid #c9cdd8; border-radius: 6px; font-size: 1rem; }}
button {{ margin-top: 1rem; padding: 0.75rem; border: 0; border-radius: 6px; background: #ff7c00; color: #fff; font-size: 1rem; cursor: pointer; }}
label {{ font-weight: 600; margin-top: 0.5rem; }}
</style>
</head>
<body>
<main>
<h1>🔬 {TITLE}</h1>
<p>Generate comprehensive research reports with our specialized AI agents</p>
<div class="row">
<form class="inputs" method="post" action="/report">
{fields}
<button type="submit">Generate Research Report 🧪</button>
</form>
<section class="output" id="report" aria-label="Your Research Report">
<h2>Your Research Report</h2>
{report_html}
</section>
</div>
<h3>How to use</h3>
<ol>
<li>Enter your research topic of interest</li>
<li>Specify the scope of research to include</li>
<li>Indicate the desired technical depth</li>
<li>Share specific focus areas within the topic</li>
<li>Click 'Generate Research Report'</li>
</ol>
<p><em>Note: Generation may take a minute or two as our AI agents conduct thorough research.</em></p>
</main>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_has_form_and_defaults() {
        let html = render_page(&default_request(), None);
        assert!(html.contains("<title>AI Science Research Assistant</title>"));
        assert!(html.contains("🔬 AI Science Research Assistant"));
        assert!(html.contains("Generate comprehensive research reports with our specialized AI agents"));
        for label in ["Research Topic", "Research Scope", "Technical Depth", "Focus Areas"] {
            assert!(html.contains(label), "missing label {label}");
        }
        assert!(html.contains(r#"value="CRISPR gene editing applications""#));
        assert!(html.contains(r#"value="Clinical trials, ethical considerations, recent breakthroughs""#));
        assert!(html.contains("Generate Research Report 🧪"));
        assert!(html.contains("Your Research Report"));
        assert!(html.contains("Click 'Generate Research Report'"));
    }

    #[test]
    fn submitted_values_are_escaped() {
        let form = ResearchRequest::new(r#""><script>alert(1)</script>"#, "", "", "");
        let html = render_page(&form, None);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn report_is_rendered_as_markdown() {
        let html = render_page(&default_request(), Some("## Key findings\n\n- **Cas9** trials"));
        assert!(html.contains("<h2>Key findings</h2>"));
        assert!(html.contains("<strong>Cas9</strong>"));
    }

    #[test]
    fn raw_html_in_report_is_not_passed_through() {
        let html = render_markdown("Findings <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn report_header_lines_stay_on_separate_lines() {
        let html = render_markdown("Scope: Last 5 years\nTechnical Depth: Graduate");
        assert!(html.contains("Scope: Last 5 years<br />"));
    }

    #[test]
    fn escape_handles_all_special_characters() {
        assert_eq!(escape_html(r#"<a href='x'>&"#), "&lt;a href=&#39;x&#39;&gt;&amp;");
    }
}
