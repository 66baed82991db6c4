//! Report renderers.
//!
//! Renderers only format what is already in the [`CompatibilityReport`];
//! they never compute new facts.

mod console;
mod html;
mod json;

pub use console::ConsoleRenderer;
pub use html::HtmlRenderer;
pub use json::JsonRenderer;

use gridport_core::{CompatibilityReport, Result};
use std::path::Path;

/// Trait for rendering a compatibility report
pub trait Renderer {
    fn render(&self, report: &CompatibilityReport) -> Result<String>;
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Console,
    Html,
    Json,
}

impl ReportFormat {
    /// Format implied by a report file name: `.html`/`.htm`, `.json`, else plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("html" | "htm") => ReportFormat::Html,
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Console,
        }
    }

    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self {
            ReportFormat::Console => Box::new(ConsoleRenderer::default()),
            ReportFormat::Html => Box::new(HtmlRenderer),
            ReportFormat::Json => Box::new(JsonRenderer),
        }
    }
}

/// Renders a report in the given format.
pub fn render_report(report: &CompatibilityReport, format: ReportFormat) -> Result<String> {
    format.renderer().render(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ReportFormat::from_path(Path::new("out/report.html")),
            ReportFormat::Html
        );
        assert_eq!(
            ReportFormat::from_path(Path::new("report.json")),
            ReportFormat::Json
        );
        assert_eq!(
            ReportFormat::from_path(Path::new("report.txt")),
            ReportFormat::Console
        );
    }
}
