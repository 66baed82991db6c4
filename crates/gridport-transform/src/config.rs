//! Grid option and column definition rewrite.
//!
//! Grid options rename their key. Column definitions are walked property
//! by property; `filter`, `cellRenderer` and `cellEditor` change shape as
//! well as name. Unsupported keys are neutralised in place (`key: undefined`
//! behind a marker comment) when the property fits on one line, and left
//! untouched otherwise. Either way a manual change is reported.

use crate::{todo_comment, GeneratedEdits};
use gridport_core::{
    is_column_binding, ConfigKind, ConfigProperty, ConfigUsage, ConfigValue, MappingRegistry,
    Priority, TransformationKind,
};
use std::path::Path;

/// Rewrites one recognised configuration property.
pub fn transform_grid_config(
    registry: &MappingRegistry,
    file: &Path,
    usage: &ConfigUsage,
) -> GeneratedEdits {
    let mut out = GeneratedEdits::default();
    let mut ctx = Context {
        registry,
        file,
        out: &mut out,
    };

    match usage.config_kind {
        // The binding name belongs to the host class, only its value changes.
        ConfigKind::ColumnBinding => ctx.columns(&usage.property.value),
        ConfigKind::GridOption => ctx.grid_option(&usage.property),
    }
    out
}

struct Context<'a> {
    registry: &'a MappingRegistry,
    file: &'a Path,
    out: &'a mut GeneratedEdits,
}

impl Context<'_> {
    fn grid_option(&mut self, property: &ConfigProperty) {
        let name = property.name.as_str();

        if self.registry.is_unsupported_config(name) {
            let edition = if self.registry.is_enterprise_config(name) {
                " (enterprise feature)"
            } else {
                ""
            };
            self.unsupported(
                property,
                TransformationKind::Config,
                format!("grid option '{}'{} has no equivalent", name, edition),
            );
            return;
        }

        if let Some(mapped) = self.registry.map_config(name) {
            self.rename_key(property, TransformationKind::Config, mapped);
        }
        if is_column_binding(name) {
            self.columns(&property.value);
        }
    }

    /// Column definitions: an array of definitions, or a single one.
    fn columns(&mut self, value: &ConfigValue) {
        match value {
            ConfigValue::Array(items) => {
                for item in items {
                    self.columns(item);
                }
            }
            ConfigValue::Object(properties) => {
                for property in properties {
                    self.column_property(property);
                }
            }
            _ => {}
        }
    }

    fn column_property(&mut self, property: &ConfigProperty) {
        match property.name.as_str() {
            "filter" => self.filter(property),
            "cellRenderer" => self.component_reference(property, "renderer"),
            "cellEditor" => self.component_reference(property, "editor"),
            _ => self.plain_column_property(property),
        }
    }

    fn plain_column_property(&mut self, property: &ConfigProperty) {
        let name = property.name.as_str();
        if self.registry.is_unsupported_column(name) {
            self.unsupported(
                property,
                TransformationKind::Column,
                format!("column property '{}' has no equivalent", name),
            );
            return;
        }

        // Unknown keys pass through unchanged.
        if let Some(mapped) = self.registry.map_column(name) {
            self.rename_key(property, TransformationKind::Column, mapped);
        }
        if name == "children" {
            self.columns(&property.value);
        }
    }

    /// `filter` becomes `filterable` plus a filter type or configuration.
    fn filter(&mut self, property: &ConfigProperty) {
        let single_line = !property.multiline && !property.raw_text.contains('\n');
        match &property.value {
            ConfigValue::String(name) if single_line => {
                let filter_type = match self.registry.filter_type(name) {
                    Some(mapped) => mapped,
                    None => {
                        self.out.warn(
                            self.file,
                            property.location,
                            format!("custom filter '{}' kept as filter type", name),
                        );
                        name.as_str()
                    }
                };
                let quote = quote_of(value_text(property));
                self.replace_property(
                    property,
                    format!("filterable: true, filterType: {quote}{filter_type}{quote}"),
                    format!("Convert filter '{}' to filter type '{}'", name, filter_type),
                );
            }
            ConfigValue::Bool(enabled) if single_line => {
                self.replace_property(
                    property,
                    format!("filterable: {}", enabled),
                    "Convert filter flag",
                );
            }
            ConfigValue::Object(_) => {
                let head = property
                    .raw_text
                    .find('{')
                    .map(|brace| &property.raw_text[..=brace])
                    .filter(|head| !head.contains('\n'));
                match head {
                    Some(head) => self.out.edit(
                        self.file,
                        TransformationKind::Column,
                        property.location,
                        head,
                        "filterable: true, filterConfig: {",
                        "Convert filter object to filter configuration",
                    ),
                    None => self.filter_by_hand(property),
                }
            }
            _ => self.filter_by_hand(property),
        }
    }

    fn filter_by_hand(&mut self, property: &ConfigProperty) {
        self.out.warn(
            self.file,
            property.location,
            "filter value cannot be converted automatically",
        );
        self.out.manual(
            self.file,
            property.location,
            "filter",
            format!(
                "Convert '{}' to filterable / filterType by hand",
                property.raw_text.lines().next().unwrap_or_default().trim()
            ),
            Priority::Medium,
        );
    }

    /// `cellRenderer` / `cellEditor`: rename the key and translate built-in names.
    fn component_reference(&mut self, property: &ConfigProperty, new_key: &str) {
        let translated = match &property.value {
            ConfigValue::String(name) if new_key == "renderer" => self.registry.cell_renderer(name),
            ConfigValue::String(name) => self.registry.cell_editor(name),
            _ => None,
        };

        if let ConfigValue::Expression(component) = &property.value {
            self.out.manual(
                self.file,
                property.location,
                property.name.as_str(),
                format!(
                    "Custom {} '{}' must implement the target {} interface",
                    new_key, component, new_key
                ),
                Priority::Low,
            );
        }

        match translated {
            Some(mapped) if !property.multiline => {
                let quote = quote_of(value_text(property));
                let key = requote(&property.key_text, new_key);
                self.replace_property(
                    property,
                    format!("{key}: {quote}{mapped}{quote}"),
                    format!("Convert {} to {} '{}'", property.name, new_key, mapped),
                );
            }
            _ => self.rename_key(property, TransformationKind::Column, new_key),
        }
    }

    /// Neutralises an unsupported key and reports it.
    fn unsupported(&mut self, property: &ConfigProperty, kind: TransformationKind, reason: String) {
        self.out.manual(
            self.file,
            property.location,
            property.name.as_str(),
            reason.clone(),
            Priority::High,
        );

        // Left by an earlier run.
        if property.value == ConfigValue::Expression("undefined".to_string()) {
            return;
        }

        let value = value_text(property);
        if property.multiline || value.is_empty() {
            self.out.warn(self.file, property.location, format!("{}; remove it by hand", reason));
            return;
        }

        self.out.warn(self.file, property.location, format!("{}; disabled", reason));
        let comment = todo_comment(&format!(
            "'{}' is not supported, was: {}",
            property.name, value
        ));
        self.out.edit(
            self.file,
            kind,
            property.location,
            property.raw_text.as_str(),
            format!("{} {}: undefined", comment, property.key_text),
            format!("Disable unsupported '{}'", property.name),
        );
    }

    fn rename_key(&mut self, property: &ConfigProperty, kind: TransformationKind, new_name: &str) {
        let description = format!("Rename {} to {}", property.name, new_name);
        if property.raw_text == property.key_text {
            // `{ rowData }` shorthand keeps its binding
            self.out.edit(
                self.file,
                kind,
                property.location,
                property.key_text.as_str(),
                format!("{}: {}", new_name, property.key_text),
                description,
            );
        } else {
            self.out.edit(
                self.file,
                kind,
                property.location,
                property.key_text.as_str(),
                requote(&property.key_text, new_name),
                description,
            );
        }
    }

    fn replace_property(
        &mut self,
        property: &ConfigProperty,
        new_text: String,
        description: impl Into<String>,
    ) {
        self.out.edit(
            self.file,
            TransformationKind::Column,
            property.location,
            property.raw_text.as_str(),
            new_text,
            description,
        );
    }
}

/// Value source text of a `key: value` property; the key itself for shorthand.
fn value_text(property: &ConfigProperty) -> &str {
    if property.raw_text == property.key_text {
        return &property.key_text;
    }
    property
        .raw_text
        .strip_prefix(property.key_text.as_str())
        .and_then(|rest| rest.trim_start().strip_prefix(':'))
        .map(str::trim)
        .unwrap_or_default()
}

fn quote_of(value: &str) -> char {
    if value.starts_with('"') {
        '"'
    } else {
        '\''
    }
}

/// Keeps the quoting of the original key.
fn requote(key_text: &str, name: &str) -> String {
    match key_text.chars().next() {
        Some(quote @ ('\'' | '"')) => format!("{quote}{name}{quote}"),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridport_core::Location;

    fn property(key: &str, value: ConfigValue, value_src: &str, col: u32) -> ConfigProperty {
        let name = key.trim_matches(|c| c == '\'' || c == '"').to_string();
        ConfigProperty {
            name,
            key_text: key.to_string(),
            value,
            raw_text: format!("{}: {}", key, value_src),
            location: Location::new(1, col),
            multiline: value_src.contains('\n'),
        }
    }

    fn option(property: ConfigProperty) -> ConfigUsage {
        ConfigUsage {
            property,
            config_kind: ConfigKind::GridOption,
        }
    }

    fn run(usage: &ConfigUsage) -> GeneratedEdits {
        let registry = MappingRegistry::builtin().unwrap();
        transform_grid_config(&registry, Path::new("grid.ts"), usage)
    }

    #[test]
    fn test_grid_option_rename_keeps_quotes() {
        let usage = option(property(
            "'rowData'",
            ConfigValue::Expression("rows".into()),
            "rows",
            3,
        ));
        let out = run(&usage);
        assert_eq!(out.transformations.len(), 1);
        assert_eq!(out.transformations[0].old_text, "'rowData'");
        assert_eq!(out.transformations[0].new_text, "'data'");
    }

    #[test]
    fn test_shorthand_option() {
        let mut prop = property("rowData", ConfigValue::Expression("rowData".into()), "", 3);
        prop.raw_text = "rowData".to_string();
        let out = run(&option(prop));
        assert_eq!(out.transformations[0].new_text, "data: rowData");
    }

    #[test]
    fn test_unsupported_option_single_line() {
        let usage = option(property(
            "enableRangeSelection",
            ConfigValue::Bool(true),
            "true",
            3,
        ));
        let out = run(&usage);
        assert_eq!(
            out.transformations[0].new_text,
            "/* TODO(gridport): 'enableRangeSelection' is not supported, was: true */ \
             enableRangeSelection: undefined"
        );
        assert_eq!(out.manual_changes.len(), 1);
        assert_eq!(out.manual_changes[0].priority, Priority::High);
        assert!(out.manual_changes[0].description.contains("enterprise"));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_unsupported_option_is_not_rewritten_twice() {
        let usage = option(property(
            "enableRangeSelection",
            ConfigValue::Expression("undefined".into()),
            "undefined",
            3,
        ));
        let out = run(&usage);
        assert!(out.transformations.is_empty());
        assert_eq!(out.manual_changes.len(), 1);
    }

    #[test]
    fn test_unsupported_multiline_is_reported_only() {
        let usage = option(property(
            "sideBar",
            ConfigValue::Object(Vec::new()),
            "{\n    toolPanels: []\n  }",
            3,
        ));
        let out = run(&usage);
        assert!(out.transformations.is_empty());
        assert_eq!(out.manual_changes.len(), 1);
        assert!(out.warnings[0].contains("remove it by hand"));
    }

    #[test]
    fn test_column_definitions() {
        let column = ConfigValue::Object(vec![
            property("field", ConfigValue::String("make".into()), "'make'", 5),
            property("headerName", ConfigValue::String("Make".into()), "'Make'", 20),
            property(
                "filter",
                ConfigValue::String("agTextColumnFilter".into()),
                "'agTextColumnFilter'",
                40,
            ),
            property(
                "cellRenderer",
                ConfigValue::String("agAnimateShowChangeCellRenderer".into()),
                "'agAnimateShowChangeCellRenderer'",
                70,
            ),
            property("rowGroup", ConfigValue::Bool(true), "true", 120),
        ]);
        let usage = ConfigUsage {
            property: property("columnDefs", ConfigValue::Array(vec![column]), "[...]", 3),
            config_kind: ConfigKind::ColumnBinding,
        };

        let out = run(&usage);
        let edits: Vec<_> = out
            .transformations
            .iter()
            .map(|t| (t.old_text.as_str(), t.new_text.as_str()))
            .collect();
        assert_eq!(
            edits,
            vec![
                ("headerName", "header"),
                (
                    "filter: 'agTextColumnFilter'",
                    "filterable: true, filterType: 'text'"
                ),
                (
                    "cellRenderer: 'agAnimateShowChangeCellRenderer'",
                    "renderer: 'tg-flash-cell'"
                ),
                (
                    "rowGroup: true",
                    "/* TODO(gridport): 'rowGroup' is not supported, was: true */ rowGroup: undefined"
                ),
            ]
        );
        assert_eq!(out.manual_changes.len(), 1);
    }

    #[test]
    fn test_filter_shapes() {
        let bool_filter = property("filter", ConfigValue::Bool(false), "false", 5);
        let object_filter = property(
            "filter",
            ConfigValue::Object(Vec::new()),
            "{ buttons: ['reset'] }",
            5,
        );
        let expr_filter = property(
            "filter",
            ConfigValue::Expression("MyFilter".into()),
            "MyFilter",
            5,
        );
        let usage = option(property(
            "defaultColDef",
            ConfigValue::Object(vec![bool_filter, object_filter, expr_filter]),
            "{ ... }",
            3,
        ));

        let out = run(&usage);
        let new_texts: Vec<_> = out
            .transformations
            .iter()
            .map(|t| t.new_text.as_str())
            .collect();
        assert_eq!(
            new_texts,
            vec![
                "defaultColumn",
                "filterable: false",
                "filterable: true, filterConfig: {",
            ]
        );
        assert_eq!(out.manual_changes.len(), 1);
        assert_eq!(out.manual_changes[0].priority, Priority::Medium);
    }

    #[test]
    fn test_custom_cell_editor_component() {
        let usage = option(property(
            "defaultColDef",
            ConfigValue::Object(vec![property(
                "cellEditor",
                ConfigValue::Expression("PriceEditor".into()),
                "PriceEditor",
                5,
            )]),
            "{ ... }",
            3,
        ));
        let out = run(&usage);
        assert_eq!(out.transformations[1].old_text, "cellEditor");
        assert_eq!(out.transformations[1].new_text, "editor");
        assert_eq!(out.manual_changes[0].priority, Priority::Low);
    }
}
