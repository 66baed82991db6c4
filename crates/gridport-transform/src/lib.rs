//! Transformation generators.
//!
//! One pure function per construct kind turns a scanned usage into literal,
//! line-local [`Transformation`]s using a [`MappingRegistry`]. Constructs
//! without a translation become [`ManualChange`] items and warnings instead
//! of edits. Generators never emit an edit whose old and new text are equal,
//! and the same input always yields the same output.
//!
//! [`generate_all`] dispatches every construct of a record:
//!
//! ```
//! use gridport_core::{Location, MappingRegistry, UsageRecord, CssClassUsage, CssContext};
//! use gridport_transform::generate_all;
//!
//! let registry = MappingRegistry::builtin().unwrap();
//! let mut record = UsageRecord::new("src/styles.css");
//! record.css_classes.push(CssClassUsage {
//!     location: Location::new(1, 2),
//!     class_name: "ag-theme-alpine-dark".to_string(),
//!     context: CssContext::Stylesheet,
//! });
//!
//! let edits = generate_all(&registry, &record);
//! assert_eq!(edits.transformations[0].new_text, "tg-theme-alpine-dark");
//! ```

mod component;
mod config;
mod css;
mod import;

pub use component::transform_component;
pub use config::transform_grid_config;
pub use css::{transform_css_class, PrefixMatch};
pub use import::transform_import;

use gridport_core::{
    Construct, Location, ManualChange, MappingRegistry, Priority, Transformation,
    TransformationKind, UsageRecord,
};
use std::path::Path;

/// Output of a generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedEdits {
    pub transformations: Vec<Transformation>,
    pub warnings: Vec<String>,
    pub manual_changes: Vec<ManualChange>,
}

impl GeneratedEdits {
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty() && self.warnings.is_empty() && self.manual_changes.is_empty()
    }

    pub fn extend(&mut self, other: GeneratedEdits) {
        self.transformations.extend(other.transformations);
        self.warnings.extend(other.warnings);
        self.manual_changes.extend(other.manual_changes);
    }

    /// Records an edit unless it would not change anything.
    pub(crate) fn edit(
        &mut self,
        file: &Path,
        kind: TransformationKind,
        location: Location,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
        description: impl Into<String>,
    ) {
        let old_text = old_text.into();
        let new_text = new_text.into();
        if old_text == new_text || old_text.is_empty() {
            return;
        }
        self.transformations.push(Transformation {
            file_path: file.to_path_buf(),
            kind,
            location,
            old_text,
            new_text,
            description: description.into(),
        });
    }

    pub(crate) fn manual(
        &mut self,
        file: &Path,
        location: Location,
        feature: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) {
        self.manual_changes.push(ManualChange {
            file_path: file.to_path_buf(),
            location,
            feature: feature.into(),
            description: description.into(),
            priority,
        });
    }

    pub(crate) fn warn(&mut self, file: &Path, location: Location, message: impl AsRef<str>) {
        self.warnings
            .push(format!("{}:{}: {}", file.display(), location.line, message.as_ref()));
    }
}

/// Runs the matching generator for every construct of a record, in
/// construct order.
pub fn generate_all(registry: &MappingRegistry, record: &UsageRecord) -> GeneratedEdits {
    let file = record.file_path.as_path();
    let mut out = GeneratedEdits::default();
    for construct in record.constructs() {
        let edits = match construct {
            Construct::Import(usage) => transform_import(registry, file, usage),
            Construct::Component(usage) => transform_component(registry, file, usage),
            Construct::Config(usage) => transform_grid_config(registry, file, usage),
            Construct::CssClass(usage) => transform_css_class(registry, file, usage),
            // API calls are reported by the analyzer; there is no textual translation.
            Construct::ApiCall(_) => GeneratedEdits::default(),
        };
        out.extend(edits);
    }
    tracing::debug!(
        "{}: {} edits, {} manual changes",
        file.display(),
        out.transformations.len(),
        out.manual_changes.len()
    );
    out
}

/// Marker comment text for a TODO left in the source.
pub(crate) fn todo_comment(message: &str) -> String {
    format!(
        "/* {}: {} */",
        gridport_core::TODO_MARKER,
        message.replace("*/", "* /")
    )
}
