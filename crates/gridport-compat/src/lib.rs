//! Compatibility analysis for gridport.
//!
//! [`analyze_compatibility`] turns a [`ScanReport`](gridport_core::ScanReport)
//! into a scored [`CompatibilityReport`](gridport_core::CompatibilityReport):
//! each construct resolves to a feature key, each key has a curated
//! support level, and the score is the usage-weighted mean of those levels.
//! The [`render`] module prints the result for a terminal, as a static HTML
//! page or as JSON.

pub mod analyzer;
pub mod features;
pub mod render;

pub use analyzer::{analyze_compatibility, estimate_effort};
pub use features::{construct_feature, feature_info, feature_status, FeatureInfo, FEATURES};
pub use render::{
    render_report, ConsoleRenderer, HtmlRenderer, JsonRenderer, Renderer, ReportFormat,
};
