//! gridport core - data model, mapping tables and error taxonomy.
//!
//! This crate holds everything the other gridport crates exchange:
//!
//! - [`UsageRecord`]: per-file inventory produced by the scanner
//! - [`Transformation`]: a literal line-local edit produced by the generators
//! - [`MigrationResult`], [`CompatibilityReport`], [`ValidationReport`]: run outputs
//! - [`MappingRegistry`]: the translation tables and curated unsupported sets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   gridport-cli   │  (thin command surface)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐   ┌────────────────────┐
//! │ gridport-engine  │──▶│ gridport-compat    │
//! └────────┬─────────┘   └────────────────────┘
//!          ▼
//! ┌──────────────────┐   ┌────────────────────┐
//! │ gridport-scanner │   │ gridport-transform │
//! └────────┬─────────┘   └─────────┬──────────┘
//!          └──────────┬────────────┘
//!                     ▼
//!          ┌──────────────────┐
//!          │  gridport-core   │  (this crate)
//!          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use gridport_core::{MappingRegistry, MappingTable};
//!
//! let mut registry = MappingRegistry::builtin()?;
//! registry.add_custom_mapping(MappingTable::Symbols, "MyGridWrapper", "TgGridComponent")?;
//! assert_eq!(registry.map_symbol("MyGridWrapper"), Some("TgGridComponent"));
//! # Ok::<(), gridport_core::Error>(())
//! ```

pub mod error;
pub mod heuristics;
pub mod mapping;
pub mod types;

pub use error::{Error, Result};
pub use heuristics::{
    is_column_binding, split_binding, BindingStyle, COLUMN_BINDING_NAMES, TODO_MARKER,
};
pub use mapping::{MappingRegistry, MappingTable, BUILT_IN_MAPPINGS};
pub use types::{
    weighted_score, ApiCallUsage, CheckResult, CompatibilityBreakdown, CompatibilityReport,
    Complexity, ComponentAttribute, ComponentUsage, ConfigKind, ConfigProperty, ConfigUsage,
    ConfigValue, Construct, CssClassUsage, CssContext, EffortEstimate, FeatureCompatibility,
    FilePreview, ImportKind, ImportUsage, ImportedName, Location, ManifestChange, ManualChange,
    MigrationError, MigrationResult, MigrationStage, Priority, ScanReport, ScanWarning, Severity,
    SupportStatus, Transformation, TransformationKind, UsageRecord, ValidationFinding,
    ValidationReport,
};
