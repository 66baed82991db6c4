//! Static HTML report with the JSON report embedded.

use super::Renderer;
use gridport_core::{CompatibilityReport, Result};
use std::fmt::Write;

/// `id` of the `<script type="application/json">` block carrying the report.
pub const REPORT_SCRIPT_ID: &str = "gridport-report";

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;margin:1rem 0}\
td,th{border:1px solid #ccc;padding:.3rem .6rem;text-align:left}\
.supported{color:#1a7f37}.partial{color:#9a6700}.unsupported{color:#cf222e}\
.high{font-weight:bold;color:#cf222e}.score{font-size:2rem}";

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, report: &CompatibilityReport) -> Result<String> {
        let json = serde_json::to_string(report)?;
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_html(report, &json, &mut out);
        Ok(out)
    }
}

fn write_html(report: &CompatibilityReport, json: &str, out: &mut String) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Grid compatibility report</title>")?;
    writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE)?;
    writeln!(out, "<h1>Grid compatibility report</h1>")?;
    writeln!(
        out,
        "<p class=\"score\">{}/100</p>",
        report.overall_score()
    )?;

    let breakdown = report.compatibility();
    writeln!(
        out,
        "<p>{} of {} files affected. {} supported, {} partial, {} unsupported features.</p>",
        report.affected_files,
        report.total_files,
        breakdown.full,
        breakdown.partial,
        breakdown.unsupported
    )?;

    writeln!(out, "<h2>Features</h2>\n<table>")?;
    writeln!(out, "<tr><th>Feature</th><th>Status</th><th>Usages</th><th>Notes</th></tr>")?;
    for feature in &report.features {
        writeln!(
            out,
            "<tr><td>{}</td><td class=\"{status}\">{status}</td><td>{}</td><td>{}</td></tr>",
            escape(&feature.feature),
            feature.usage_count,
            escape(feature.migration_notes.as_deref().unwrap_or("")),
            status = feature.status.as_str(),
        )?;
    }
    writeln!(out, "</table>")?;

    if !report.manual_changes.is_empty() {
        writeln!(out, "<h2>Manual changes</h2>\n<table>")?;
        writeln!(
            out,
            "<tr><th>Priority</th><th>Location</th><th>Feature</th><th>Description</th></tr>"
        )?;
        for change in &report.manual_changes {
            writeln!(
                out,
                "<tr><td class=\"{priority}\">{priority}</td><td>{}:{}</td><td>{}</td><td>{}</td></tr>",
                escape(&change.file_path.display().to_string()),
                change.location,
                escape(&change.feature),
                escape(&change.description),
                priority = change.priority.as_str(),
            )?;
        }
        writeln!(out, "</table>")?;
    }

    let effort = &report.estimated_effort;
    writeln!(
        out,
        "<h2>Estimated effort</h2>\n<p>{} complexity, {} ({}% automatic, {}% manual)</p>",
        effort.complexity.as_str(),
        escape(&effort.estimated_time),
        effort.automatic_percentage,
        effort.manual_percentage
    )?;

    writeln!(
        out,
        "<script type=\"application/json\" id=\"{}\">{}</script>",
        REPORT_SCRIPT_ID,
        json.replace("</", "<\\/")
    )?;
    writeln!(out, "</body>\n</html>")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
