//! JSON renderer: the report object verbatim.

use super::Renderer;
use gridport_core::{CompatibilityReport, Result};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, report: &CompatibilityReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
