//! Mapping tables translating source-library names into target-library names.
//!
//! The built-in tables are embedded at compile time via `include_str!()` and
//! parsed into a [`MappingRegistry`]. A registry is an ordinary value: the
//! scanner and the generators borrow it, so tests can build isolated
//! registries and custom mappings never leak between runs.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Built-in ag-Grid → Tessera tables.
pub const BUILT_IN_MAPPINGS: &str = include_str!("built_in/mappings.toml");

/// The mutable tables that accept custom entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingTable {
    Imports,
    Symbols,
    Selectors,
    Attributes,
    CssClasses,
    Config,
    Columns,
}

impl MappingTable {
    pub fn all() -> &'static [MappingTable] {
        &[
            MappingTable::Imports,
            MappingTable::Symbols,
            MappingTable::Selectors,
            MappingTable::Attributes,
            MappingTable::CssClasses,
            MappingTable::Config,
            MappingTable::Columns,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MappingTable::Imports => "imports",
            MappingTable::Symbols => "symbols",
            MappingTable::Selectors => "selectors",
            MappingTable::Attributes => "attributes",
            MappingTable::CssClasses => "css_classes",
            MappingTable::Config => "config",
            MappingTable::Columns => "columns",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().find(|t| t.name() == name).copied()
    }
}

impl fmt::Display for MappingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageSection {
    #[serde(default)]
    exact: BTreeSet<String>,
    #[serde(default)]
    prefixes: Vec<String>,
    #[serde(default)]
    enterprise: Vec<String>,
    #[serde(default)]
    target: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnsupportedSection {
    #[serde(default)]
    config: BTreeSet<String>,
    #[serde(default)]
    attributes: BTreeSet<String>,
    #[serde(default)]
    css_classes: BTreeSet<String>,
    #[serde(default)]
    columns: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnterpriseSection {
    #[serde(default)]
    config: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeuristicSection {
    #[serde(default)]
    api_methods: BTreeSet<String>,
    #[serde(default)]
    api_receiver_hints: Vec<String>,
    #[serde(default)]
    css_prefixes: Vec<String>,
}

/// On-disk layout of a mapping document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingDocument {
    #[serde(default)]
    packages: PackageSection,
    #[serde(default)]
    imports: BTreeMap<String, String>,
    #[serde(default)]
    import_prefixes: BTreeMap<String, String>,
    #[serde(default)]
    symbols: BTreeMap<String, String>,
    #[serde(default)]
    selectors: BTreeMap<String, String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    css_classes: BTreeMap<String, String>,
    #[serde(default)]
    config: BTreeMap<String, String>,
    #[serde(default)]
    columns: BTreeMap<String, String>,
    #[serde(default)]
    cell_renderers: BTreeMap<String, String>,
    #[serde(default)]
    cell_editors: BTreeMap<String, String>,
    #[serde(default)]
    filters: BTreeMap<String, String>,
    #[serde(default)]
    unsupported: UnsupportedSection,
    #[serde(default)]
    enterprise: EnterpriseSection,
    #[serde(default)]
    heuristics: HeuristicSection,
    #[serde(default)]
    required_attributes: BTreeMap<String, Vec<String>>,
}

/// Translation tables plus the curated sets the heuristics rely on.
///
/// Ordered maps keep every iteration deterministic, which the generators
/// depend on.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    pub(crate) source_packages: BTreeSet<String>,
    pub(crate) source_package_prefixes: Vec<String>,
    pub(crate) enterprise_packages: Vec<String>,
    pub(crate) target_packages: BTreeMap<String, String>,

    pub(crate) imports: BTreeMap<String, String>,
    /// Module-source prefixes for subpath imports; longest match wins.
    pub(crate) import_prefixes: BTreeMap<String, String>,
    pub(crate) symbols: BTreeMap<String, String>,
    pub(crate) selectors: BTreeMap<String, String>,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) css_classes: BTreeMap<String, String>,
    pub(crate) config: BTreeMap<String, String>,
    pub(crate) columns: BTreeMap<String, String>,

    pub(crate) cell_renderers: BTreeMap<String, String>,
    pub(crate) cell_editors: BTreeMap<String, String>,
    pub(crate) filters: BTreeMap<String, String>,

    pub(crate) unsupported_config: BTreeSet<String>,
    pub(crate) unsupported_attributes: BTreeSet<String>,
    pub(crate) unsupported_css: BTreeSet<String>,
    pub(crate) unsupported_columns: BTreeSet<String>,
    pub(crate) enterprise_config: BTreeSet<String>,

    pub(crate) api_methods: BTreeSet<String>,
    pub(crate) api_receiver_hints: Vec<String>,
    pub(crate) css_prefixes: Vec<String>,
    pub(crate) required_attributes: BTreeMap<String, Vec<String>>,
}

impl MappingRegistry {
    /// Registry loaded from the embedded tables.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILT_IN_MAPPINGS)
    }

    /// Parses a mapping document and checks the disjointness invariant.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let doc: MappingDocument = toml::from_str(source)?;

        let registry = Self {
            source_packages: doc.packages.exact,
            source_package_prefixes: doc.packages.prefixes,
            enterprise_packages: doc.packages.enterprise,
            target_packages: doc.packages.target,
            imports: doc.imports,
            import_prefixes: doc.import_prefixes,
            symbols: doc.symbols,
            selectors: doc.selectors,
            attributes: doc.attributes,
            css_classes: doc.css_classes,
            config: doc.config,
            columns: doc.columns,
            cell_renderers: doc.cell_renderers,
            cell_editors: doc.cell_editors,
            filters: doc.filters,
            unsupported_config: doc.unsupported.config,
            unsupported_attributes: doc.unsupported.attributes,
            unsupported_css: doc.unsupported.css_classes,
            unsupported_columns: doc.unsupported.columns,
            enterprise_config: doc.enterprise.config,
            api_methods: doc.heuristics.api_methods,
            api_receiver_hints: doc
                .heuristics
                .api_receiver_hints
                .into_iter()
                .map(|h| h.to_lowercase())
                .collect(),
            css_prefixes: doc.heuristics.css_prefixes,
            required_attributes: doc.required_attributes,
        };

        registry.check_disjoint()?;
        Ok(registry)
    }

    /// Verifies that no key is both mapped and unsupported.
    pub fn check_disjoint(&self) -> Result<()> {
        let pairs = [
            (MappingTable::Config, &self.config, &self.unsupported_config),
            (
                MappingTable::Attributes,
                &self.attributes,
                &self.unsupported_attributes,
            ),
            (MappingTable::CssClasses, &self.css_classes, &self.unsupported_css),
            (MappingTable::Columns, &self.columns, &self.unsupported_columns),
        ];

        for (table, mapped, unsupported) in pairs {
            if let Some(key) = mapped.keys().find(|k| unsupported.contains(*k)) {
                return Err(Error::MappingConflict {
                    table: table.name().to_string(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Adds or replaces an entry in one of the translation tables.
    ///
    /// This mutates the registry in place. A key that was in the matching
    /// unsupported set is removed from it, so the custom translation wins
    /// and the tables stay disjoint.
    pub fn add_custom_mapping(
        &mut self,
        table: MappingTable,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<()> {
        let from = from.into();
        let to = to.into();
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(Error::InvalidMapping(format!(
                "empty key or value in custom {} mapping",
                table
            )));
        }

        if let Some(unsupported) = self.unsupported_set_mut(table) {
            unsupported.remove(&from);
        }
        self.table_mut(table).insert(from, to);
        Ok(())
    }

    /// Read access to a translation table.
    pub fn table(&self, table: MappingTable) -> &BTreeMap<String, String> {
        match table {
            MappingTable::Imports => &self.imports,
            MappingTable::Symbols => &self.symbols,
            MappingTable::Selectors => &self.selectors,
            MappingTable::Attributes => &self.attributes,
            MappingTable::CssClasses => &self.css_classes,
            MappingTable::Config => &self.config,
            MappingTable::Columns => &self.columns,
        }
    }

    fn table_mut(&mut self, table: MappingTable) -> &mut BTreeMap<String, String> {
        match table {
            MappingTable::Imports => &mut self.imports,
            MappingTable::Symbols => &mut self.symbols,
            MappingTable::Selectors => &mut self.selectors,
            MappingTable::Attributes => &mut self.attributes,
            MappingTable::CssClasses => &mut self.css_classes,
            MappingTable::Config => &mut self.config,
            MappingTable::Columns => &mut self.columns,
        }
    }

    fn unsupported_set_mut(&mut self, table: MappingTable) -> Option<&mut BTreeSet<String>> {
        match table {
            MappingTable::Attributes => Some(&mut self.unsupported_attributes),
            MappingTable::CssClasses => Some(&mut self.unsupported_css),
            MappingTable::Config => Some(&mut self.unsupported_config),
            MappingTable::Columns => Some(&mut self.unsupported_columns),
            MappingTable::Imports | MappingTable::Symbols | MappingTable::Selectors => None,
        }
    }

    /// Looks up a key in a translation table.
    pub fn lookup(&self, table: MappingTable, key: &str) -> Option<&str> {
        self.table(table).get(key).map(String::as_str)
    }

    /// Exact import mapping, else the longest `[import_prefixes]` match.
    pub fn map_import(&self, source: &str) -> Option<&str> {
        self.lookup(MappingTable::Imports, source).or_else(|| {
            self.import_prefixes
                .iter()
                .filter(|(prefix, _)| source.starts_with(prefix.as_str()))
                .max_by_key(|(prefix, _)| prefix.len())
                .map(|(_, target)| target.as_str())
        })
    }

    pub fn map_symbol(&self, symbol: &str) -> Option<&str> {
        self.lookup(MappingTable::Symbols, symbol)
    }

    pub fn map_selector(&self, selector: &str) -> Option<&str> {
        self.lookup(MappingTable::Selectors, selector)
    }

    pub fn map_attribute(&self, name: &str) -> Option<&str> {
        self.lookup(MappingTable::Attributes, name)
    }

    pub fn map_css_class(&self, class: &str) -> Option<&str> {
        self.lookup(MappingTable::CssClasses, class)
    }

    pub fn map_config(&self, key: &str) -> Option<&str> {
        self.lookup(MappingTable::Config, key)
    }

    pub fn map_column(&self, key: &str) -> Option<&str> {
        self.lookup(MappingTable::Columns, key)
    }

    pub fn cell_renderer(&self, name: &str) -> Option<&str> {
        self.cell_renderers.get(name).map(String::as_str)
    }

    pub fn cell_editor(&self, name: &str) -> Option<&str> {
        self.cell_editors.get(name).map(String::as_str)
    }

    pub fn filter_type(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    pub fn is_unsupported_config(&self, key: &str) -> bool {
        self.unsupported_config.contains(key)
    }

    pub fn is_unsupported_attribute(&self, name: &str) -> bool {
        self.unsupported_attributes.contains(name)
    }

    pub fn is_unsupported_css(&self, class: &str) -> bool {
        self.unsupported_css.contains(class)
    }

    pub fn is_unsupported_column(&self, key: &str) -> bool {
        self.unsupported_columns.contains(key)
    }

    pub fn unsupported_css_classes(&self) -> impl Iterator<Item = &str> {
        self.unsupported_css.iter().map(String::as_str)
    }

    pub fn is_enterprise_config(&self, key: &str) -> bool {
        self.enterprise_config.contains(key)
    }

    /// Packages to add to the dependency manifest, with version ranges.
    pub fn target_packages(&self) -> &BTreeMap<String, String> {
        &self.target_packages
    }

    /// Exact source package names (for manifest cleanup).
    pub fn source_packages(&self) -> impl Iterator<Item = &str> {
        self.source_packages.iter().map(String::as_str)
    }

    /// Bindings a target component must carry, keyed by target selector.
    pub fn required_attributes(&self, selector: &str) -> &[String] {
        self.required_attributes
            .get(selector)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Target selectors (values of the selector table), deduplicated.
    pub fn target_selectors(&self) -> BTreeSet<&str> {
        self.selectors.values().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let registry = MappingRegistry::builtin().unwrap();
        assert_eq!(registry.map_import("ag-grid-angular"), Some("@tessera/grid"));
        assert_eq!(registry.map_symbol("AgGridAngular"), Some("TgGridComponent"));
        assert_eq!(registry.map_selector("ag-grid-angular"), Some("tg-grid"));
        assert_eq!(registry.map_config("rowData"), Some("data"));
        assert!(registry.is_unsupported_config("enableRangeSelection"));
        assert_eq!(registry.required_attributes("tg-grid").len(), 2);
    }

    #[test]
    fn test_subpath_imports_use_longest_prefix() {
        let registry = MappingRegistry::builtin().unwrap();
        assert_eq!(
            registry.map_import("ag-grid-community/styles/ag-grid.css"),
            Some("@tessera/grid/styles")
        );
        assert_eq!(
            registry.map_import("ag-grid-community/dist/types"),
            Some("@tessera/grid")
        );
        assert_eq!(
            registry.map_import("@ag-grid-community/styles"),
            Some("@tessera/grid/styles")
        );
        assert_eq!(registry.map_import("ag-grid-communityx"), None);
    }

    #[test]
    fn test_builtin_tables_are_disjoint() {
        let registry = MappingRegistry::builtin().unwrap();
        for key in registry.config.keys() {
            assert!(!registry.unsupported_config.contains(key), "{key}");
        }
        for key in registry.attributes.keys() {
            assert!(!registry.unsupported_attributes.contains(key), "{key}");
        }
        for key in registry.css_classes.keys() {
            assert!(!registry.unsupported_css.contains(key), "{key}");
        }
        for key in registry.columns.keys() {
            assert!(!registry.unsupported_columns.contains(key), "{key}");
        }
    }

    #[test]
    fn test_conflicting_document_is_rejected() {
        let doc = r#"
[config]
sideBar = "panel"

[unsupported]
config = ["sideBar"]
"#;
        let err = MappingRegistry::from_toml_str(doc).unwrap_err();
        assert!(matches!(err, Error::MappingConflict { ref key, .. } if key == "sideBar"));
    }

    #[test]
    fn test_custom_mapping_promotes_unsupported_key() {
        let mut registry = MappingRegistry::builtin().unwrap();
        assert!(registry.is_unsupported_config("sideBar"));

        registry
            .add_custom_mapping(MappingTable::Config, "sideBar", "toolPanel")
            .unwrap();

        assert_eq!(registry.map_config("sideBar"), Some("toolPanel"));
        assert!(!registry.is_unsupported_config("sideBar"));
        registry.check_disjoint().unwrap();
    }

    #[test]
    fn test_custom_mapping_does_not_touch_other_registries() {
        let mut custom = MappingRegistry::builtin().unwrap();
        custom
            .add_custom_mapping(MappingTable::CssClasses, "theme-alpine", "theme2-alpine")
            .unwrap();

        let pristine = MappingRegistry::builtin().unwrap();
        assert_eq!(custom.map_css_class("theme-alpine"), Some("theme2-alpine"));
        assert_eq!(pristine.map_css_class("theme-alpine"), None);
    }

    #[test]
    fn test_empty_custom_mapping_rejected() {
        let mut registry = MappingRegistry::default();
        assert!(registry
            .add_custom_mapping(MappingTable::Symbols, "", "X")
            .is_err());
    }

    #[test]
    fn test_table_names_round_trip() {
        for table in MappingTable::all() {
            assert_eq!(MappingTable::from_name(table.name()), Some(*table));
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn custom_mappings_keep_tables_disjoint(
                key in "[a-zA-Z][a-zA-Z-]{0,20}",
                value in "[a-zA-Z][a-zA-Z-]{0,20}",
                table_index in 0usize..7,
            ) {
                let mut registry = MappingRegistry::builtin().unwrap();
                let table = MappingTable::all()[table_index];
                registry.add_custom_mapping(table, key.clone(), value.clone()).unwrap();
                prop_assert_eq!(registry.lookup(table, &key), Some(value.as_str()));
                prop_assert!(registry.check_disjoint().is_ok());
            }
        }
    }
}
