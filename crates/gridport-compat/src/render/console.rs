//! Colorized terminal summary.

use super::Renderer;
use colored::*;
use gridport_core::{CompatibilityReport, Priority, Result, SupportStatus};
use std::fmt::Write;

pub struct ConsoleRenderer {
    /// Emit ANSI colors.
    pub color: bool,
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self { color: true }
    }
}

impl ConsoleRenderer {
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, text: &str, paint: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn status_marker(&self, status: SupportStatus) -> String {
        match status {
            SupportStatus::Supported => self.paint("✓", |s| s.green()),
            SupportStatus::Partial => self.paint("~", |s| s.yellow()),
            SupportStatus::Unsupported => self.paint("✗", |s| s.red()),
        }
    }

    fn priority_label(&self, priority: Priority) -> String {
        let label = format!("[{}]", priority.as_str());
        match priority {
            Priority::High => self.paint(&label, |s| s.red().bold()),
            Priority::Medium => self.paint(&label, |s| s.yellow()),
            Priority::Low => self.paint(&label, |s| s.dimmed()),
        }
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&self, report: &CompatibilityReport) -> Result<String> {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_report(self, report, &mut out);
        Ok(out)
    }
}

fn write_report(
    renderer: &ConsoleRenderer,
    report: &CompatibilityReport,
    out: &mut String,
) -> std::fmt::Result {
    writeln!(out, "\n{}", renderer.paint("Grid Compatibility Report", |s| s.bold()))?;
    writeln!(out, "=========================\n")?;

    let score = report.overall_score();
    let score_text = format!("{}/100", score);
    let score_text = match score {
        80.. => renderer.paint(&score_text, |s| s.green().bold()),
        50..=79 => renderer.paint(&score_text, |s| s.yellow().bold()),
        _ => renderer.paint(&score_text, |s| s.red().bold()),
    };
    writeln!(out, "Overall score: {}", score_text)?;
    writeln!(
        out,
        "Files: {} affected of {} scanned",
        report.affected_files, report.total_files
    )?;
    let breakdown = report.compatibility();
    writeln!(
        out,
        "Features: {} supported, {} partial, {} unsupported",
        breakdown.full, breakdown.partial, breakdown.unsupported
    )?;

    if !report.features.is_empty() {
        writeln!(out, "\nFeatures:")?;
        for feature in &report.features {
            writeln!(
                out,
                "  {} {} ({}) - {}",
                renderer.status_marker(feature.status),
                feature.feature,
                feature.usage_count,
                feature.description
            )?;
            if let Some(notes) = &feature.migration_notes {
                writeln!(out, "      {}", notes)?;
            }
        }
    }

    if !report.manual_changes.is_empty() {
        writeln!(out, "\nManual changes ({}):", report.manual_changes.len())?;
        for change in &report.manual_changes {
            writeln!(
                out,
                "  {} {}:{} {} - {}",
                renderer.priority_label(change.priority),
                change.file_path.display(),
                change.location,
                change.feature,
                change.description
            )?;
        }
    }

    let effort = &report.estimated_effort;
    writeln!(
        out,
        "\nEstimated effort: {} ({})",
        effort.complexity.as_str(),
        effort.estimated_time
    )?;
    writeln!(
        out,
        "  automatic: {} points ({}%), manual: {} points ({}%)",
        effort.automatic_points,
        effort.automatic_percentage,
        effort.manual_points,
        effort.manual_percentage
    )?;
    Ok(())
}
