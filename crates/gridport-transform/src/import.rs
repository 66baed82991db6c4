//! Import declaration rewrite.

use crate::GeneratedEdits;
use gridport_core::{
    ImportKind, ImportUsage, ImportedName, MappingRegistry, Priority, TransformationKind,
};
use std::path::Path;

/// Rewrites an import's module source and imported symbols.
///
/// A single-line declaration becomes one whole-statement edit. A declaration
/// spanning several lines is patched per line: the module string and each
/// renamed specifier. Unmapped symbols pass through unchanged; when nothing
/// maps, no edit is produced.
///
/// A renamed specifier keeps its local binding: `{ ColDef }` becomes
/// `{ TgColumnDef as ColDef }`, so every other reference in the file still
/// resolves. Renaming those references is left to the developer.
pub fn transform_import(
    registry: &MappingRegistry,
    file: &Path,
    usage: &ImportUsage,
) -> GeneratedEdits {
    let mut out = GeneratedEdits::default();

    if registry.is_enterprise_package(&usage.module_source) {
        out.manual(
            file,
            usage.location,
            "enterprise-modules",
            format!(
                "'{}' is an enterprise package; its features have no automatic translation",
                usage.module_source
            ),
            Priority::High,
        );
    }

    let new_source = match registry.map_import(&usage.module_source) {
        Some(mapped) => mapped,
        None => {
            out.warn(
                file,
                usage.location,
                format!("no mapping for import source '{}'", usage.module_source),
            );
            usage.module_source.as_str()
        }
    };

    let renamed: Vec<(&ImportedName, Option<&str>)> = usage
        .imported_names
        .iter()
        .map(|name| {
            let mapped = match name.kind {
                ImportKind::Named => registry
                    .map_symbol(&name.imported)
                    .filter(|m| *m != name.imported),
                ImportKind::Default | ImportKind::Namespace => None,
            };
            (name, mapped)
        })
        .collect();

    let source_changed = new_source != usage.module_source;
    let any_renamed = renamed.iter().any(|(_, m)| m.is_some());
    if !source_changed && !any_renamed {
        return out;
    }

    let description = format!(
        "Rewrite import from '{}' to '{}'",
        usage.module_source, new_source
    );
    let quote = usage.source_raw.chars().next().unwrap_or('\'');
    let quoted_source = format!("{quote}{new_source}{quote}");

    if !usage.raw_text.contains('\n') {
        let statement = build_statement(usage, &renamed, &quoted_source);
        out.edit(
            file,
            TransformationKind::Import,
            usage.location,
            usage.raw_text.as_str(),
            statement,
            description,
        );
        return out;
    }

    // Multi-line: patch the lines that change, bottom-up order is the runner's job.
    out.edit(
        file,
        TransformationKind::Import,
        usage.source_location,
        usage.source_raw.as_str(),
        quoted_source,
        description,
    );
    for (name, mapped) in &renamed {
        if let Some(mapped) = mapped {
            out.edit(
                file,
                TransformationKind::Import,
                specifier_location(name),
                name.imported.as_str(),
                renamed_specifier(name, mapped),
                format!("Rename imported symbol {} to {}", name.imported, mapped),
            );
        }
    }
    out
}

/// Location of the imported name inside a specifier (after an inline `type`).
fn specifier_location(name: &ImportedName) -> gridport_core::Location {
    let mut location = name.location;
    if name.type_only {
        location.col += "type ".len() as u32;
    }
    location
}

/// The replacement for a specifier's imported name, keeping the local binding.
fn renamed_specifier(name: &ImportedName, mapped: &str) -> String {
    if name.is_aliased() {
        mapped.to_string()
    } else {
        format!("{} as {}", mapped, name.local)
    }
}

fn build_statement(
    usage: &ImportUsage,
    renamed: &[(&ImportedName, Option<&str>)],
    quoted_source: &str,
) -> String {
    let mut clauses = Vec::new();
    let mut named = Vec::new();

    for (name, mapped) in renamed {
        match name.kind {
            ImportKind::Default => clauses.push(name.local.clone()),
            ImportKind::Namespace => clauses.push(format!("* as {}", name.local)),
            ImportKind::Named => {
                let imported = mapped.unwrap_or(&name.imported);
                let prefix = if name.type_only { "type " } else { "" };
                if imported == name.local {
                    named.push(format!("{prefix}{imported}"));
                } else {
                    named.push(format!("{prefix}{imported} as {}", name.local));
                }
            }
        }
    }
    if !named.is_empty() {
        clauses.push(format!("{{ {} }}", named.join(", ")));
    }

    let type_keyword = if usage.type_only { "type " } else { "" };
    let semicolon = if usage.raw_text.trim_end().ends_with(';') {
        ";"
    } else {
        ""
    };

    if clauses.is_empty() {
        format!("import {quoted_source}{semicolon}")
    } else {
        format!(
            "import {type_keyword}{} from {quoted_source}{semicolon}",
            clauses.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridport_core::Location;

    fn named(imported: &str, local: &str, col: u32) -> ImportedName {
        ImportedName {
            kind: ImportKind::Named,
            imported: imported.to_string(),
            local: local.to_string(),
            type_only: false,
            location: Location::new(1, col),
        }
    }

    fn usage(raw: &str, source: &str, names: Vec<ImportedName>) -> ImportUsage {
        let quote = if raw.contains('"') { '"' } else { '\'' };
        ImportUsage {
            location: Location::new(1, 1),
            module_source: source.to_string(),
            source_raw: format!("{quote}{source}{quote}"),
            source_location: Location::new(1, raw.find(quote).unwrap() as u32 + 1),
            imported_names: names,
            type_only: raw.starts_with("import type"),
            raw_text: raw.to_string(),
        }
    }

    #[test]
    fn test_single_line_import() {
        let registry = MappingRegistry::builtin().unwrap();
        let usage = usage(
            "import { AgGridAngular } from 'ag-grid-angular';",
            "ag-grid-angular",
            vec![named("AgGridAngular", "AgGridAngular", 10)],
        );

        let out = transform_import(&registry, Path::new("a.ts"), &usage);
        assert_eq!(out.transformations.len(), 1);
        assert_eq!(
            out.transformations[0].new_text,
            "import { TgGridComponent as AgGridAngular } from '@tessera/grid';"
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_renamed_symbol_keeps_local_binding() {
        let registry = MappingRegistry::builtin().unwrap();
        let usage = usage(
            "import { ColDef, GridApi as Api } from 'ag-grid-community';",
            "ag-grid-community",
            vec![named("ColDef", "ColDef", 10), named("GridApi", "Api", 18)],
        );

        let out = transform_import(&registry, Path::new("a.ts"), &usage);
        assert_eq!(
            out.transformations[0].new_text,
            "import { TgColumnDef as ColDef, TgGridApi as Api } from '@tessera/grid';"
        );
    }

    #[test]
    fn test_alias_type_and_quotes_preserved() {
        let registry = MappingRegistry::builtin().unwrap();
        let usage = usage(
            r#"import type { ColDef as Col, Unknown } from "ag-grid-community""#,
            "ag-grid-community",
            vec![named("ColDef", "Col", 15), named("Unknown", "Unknown", 29)],
        );

        let out = transform_import(&registry, Path::new("a.ts"), &usage);
        assert_eq!(
            out.transformations[0].new_text,
            r#"import type { TgColumnDef as Col, Unknown } from "@tessera/grid""#
        );
    }

    #[test]
    fn test_default_and_namespace() {
        let registry = MappingRegistry::builtin().unwrap();
        let mut ns = named("*", "grid", 8);
        ns.kind = ImportKind::Namespace;
        let usage = usage(
            "import * as grid from '@ag-grid-community/core';",
            "@ag-grid-community/core",
            vec![ns],
        );

        let out = transform_import(&registry, Path::new("a.ts"), &usage);
        assert_eq!(
            out.transformations[0].new_text,
            "import * as grid from '@tessera/grid';"
        );
    }

    #[test]
    fn test_multiline_import() {
        let registry = MappingRegistry::builtin().unwrap();
        let raw = "import {\n  GridOptions,\n  Foo,\n} from 'ag-grid-community';";
        let mut options = named("GridOptions", "GridOptions", 3);
        options.location = Location::new(2, 3);
        let mut foo = named("Foo", "Foo", 3);
        foo.location = Location::new(3, 3);
        let usage = ImportUsage {
            location: Location::new(1, 1),
            module_source: "ag-grid-community".to_string(),
            source_raw: "'ag-grid-community'".to_string(),
            source_location: Location::new(4, 8),
            imported_names: vec![options, foo],
            type_only: false,
            raw_text: raw.to_string(),
        };

        let out = transform_import(&registry, Path::new("a.ts"), &usage);
        let edits: Vec<_> = out
            .transformations
            .iter()
            .map(|t| (t.location, t.old_text.as_str(), t.new_text.as_str()))
            .collect();
        assert_eq!(
            edits,
            vec![
                (Location::new(4, 8), "'ag-grid-community'", "'@tessera/grid'"),
                (Location::new(2, 3), "GridOptions", "TgGridOptions as GridOptions"),
            ]
        );
    }

    #[test]
    fn test_style_subpath_import() {
        let registry = MappingRegistry::builtin().unwrap();
        let usage = usage(
            "import 'ag-grid-community/styles/ag-theme-alpine.css';",
            "ag-grid-community/styles/ag-theme-alpine.css",
            Vec::new(),
        );
        let out = transform_import(&registry, Path::new("main.ts"), &usage);
        assert_eq!(
            out.transformations[0].new_text,
            "import '@tessera/grid/styles';"
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_nothing_mapped_yields_no_edit() {
        let registry = MappingRegistry::default();
        let usage = usage(
            "import { Foo } from 'ag-grid-community';",
            "ag-grid-community",
            vec![named("Foo", "Foo", 10)],
        );
        let out = transform_import(&registry, Path::new("a.ts"), &usage);
        assert!(out.transformations.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_enterprise_import_needs_manual_change() {
        let registry = MappingRegistry::builtin().unwrap();
        let usage = usage(
            "import 'ag-grid-enterprise';",
            "ag-grid-enterprise",
            Vec::new(),
        );
        let out = transform_import(&registry, Path::new("main.ts"), &usage);
        assert_eq!(out.manual_changes.len(), 1);
        assert_eq!(out.manual_changes[0].priority, Priority::High);
        assert_eq!(out.transformations[0].new_text, "import '@tessera/grid';");
    }
}
