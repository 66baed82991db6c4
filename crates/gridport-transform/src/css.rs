//! CSS class rewrite.

use crate::{todo_comment, GeneratedEdits};
use gridport_core::{
    CssClassUsage, CssContext, MappingRegistry, MappingTable, Priority, TransformationKind,
};
use std::path::Path;

/// How a class name resolves against the CSS tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixMatch<'r> {
    /// The class is a table key.
    Exact(&'r str),
    /// The class extends a table key with `-suffix`; the suffix is kept.
    Prefix { key: &'r str, replacement: String },
    /// The class (or the longest matching key) is unsupported.
    Unsupported(&'r str),
    Unknown,
}

impl<'r> PrefixMatch<'r> {
    /// Exact entries win; otherwise the longest key followed by `-` decides,
    /// across both the mapped and the unsupported classes.
    pub fn find(registry: &'r MappingRegistry, class: &str) -> Self {
        if let Some(mapped) = registry.map_css_class(class) {
            return PrefixMatch::Exact(mapped);
        }
        if let Some(key) = registry.unsupported_css_classes().find(|key| *key == class) {
            return PrefixMatch::Unsupported(key);
        }

        let extends = |key: &str| {
            class
                .strip_prefix(key)
                .is_some_and(|rest| rest.len() > 1 && rest.starts_with('-'))
        };
        let mapped = registry
            .table(MappingTable::CssClasses)
            .iter()
            .filter(|(key, _)| extends(key))
            .max_by_key(|(key, _)| key.len());
        let unsupported = registry
            .unsupported_css_classes()
            .filter(|key| extends(key))
            .max_by_key(|key| key.len());

        match (mapped, unsupported) {
            (Some((key, _)), Some(blocked)) if blocked.len() > key.len() => {
                PrefixMatch::Unsupported(blocked)
            }
            (Some((key, value)), _) => PrefixMatch::Prefix {
                key: key.as_str(),
                replacement: format!("{}{}", value, &class[key.len()..]),
            },
            (None, Some(blocked)) => PrefixMatch::Unsupported(blocked),
            (None, None) => PrefixMatch::Unknown,
        }
    }
}

/// Rewrites one class reference.
///
/// Classes without a translation are only annotated in stylesheets, where a
/// comment is harmless; in markup and scripts they become manual changes.
pub fn transform_css_class(
    registry: &MappingRegistry,
    file: &Path,
    usage: &CssClassUsage,
) -> GeneratedEdits {
    let mut out = GeneratedEdits::default();
    let class = usage.class_name.as_str();

    let (note, priority) = match PrefixMatch::find(registry, class) {
        PrefixMatch::Exact(mapped) => {
            out.edit(
                file,
                TransformationKind::CssClass,
                usage.location,
                class,
                mapped,
                format!("Rename class {} to {}", class, mapped),
            );
            return out;
        }
        PrefixMatch::Prefix { replacement, .. } => {
            let description = format!("Rename class {} to {}", class, replacement);
            out.edit(
                file,
                TransformationKind::CssClass,
                usage.location,
                class,
                replacement,
                description,
            );
            return out;
        }
        PrefixMatch::Unsupported(_) => ("unsupported by target grid", Priority::High),
        PrefixMatch::Unknown => ("review", Priority::Low),
    };

    if usage.context == CssContext::Stylesheet {
        out.edit(
            file,
            TransformationKind::CssClass,
            usage.location,
            class,
            format!("{}{}", class, todo_comment(note)),
            format!("Flag class {} for review", class),
        );
    }
    let description = match priority {
        Priority::High => format!("class '{}' has no equivalent in the target grid", class),
        _ => format!("class '{}' has no known translation; check the target theme", class),
    };
    out.manual(file, usage.location, class, description, priority);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridport_core::Location;

    fn usage(class: &str, context: CssContext) -> CssClassUsage {
        CssClassUsage {
            location: Location::new(1, 2),
            class_name: class.to_string(),
            context,
        }
    }

    #[test]
    fn test_prefix_match() {
        let registry = MappingRegistry::builtin().unwrap();
        assert_eq!(
            PrefixMatch::find(&registry, "ag-row"),
            PrefixMatch::Exact("tg-row")
        );
        assert_eq!(
            PrefixMatch::find(&registry, "ag-header-cell-label"),
            PrefixMatch::Prefix {
                key: "ag-header-cell",
                replacement: "tg-header-cell-label".to_string()
            }
        );
        assert_eq!(
            PrefixMatch::find(&registry, "ag-details-row-auto-height"),
            PrefixMatch::Unsupported("ag-details-row")
        );
        // `ag-rows` does not extend `ag-row`
        assert_eq!(PrefixMatch::find(&registry, "ag-rows"), PrefixMatch::Unknown);
    }

    #[test]
    fn test_mapped_class_in_every_context() {
        let registry = MappingRegistry::builtin().unwrap();
        for context in [CssContext::Stylesheet, CssContext::Markup, CssContext::Script] {
            let out = transform_css_class(
                &registry,
                Path::new("a"),
                &usage("ag-theme-alpine", context),
            );
            assert_eq!(out.transformations[0].new_text, "tg-theme-alpine");
            assert!(out.manual_changes.is_empty());
        }
    }

    #[test]
    fn test_unsupported_class() {
        let registry = MappingRegistry::builtin().unwrap();
        let css = transform_css_class(
            &registry,
            Path::new("a.css"),
            &usage("ag-side-bar", CssContext::Stylesheet),
        );
        assert_eq!(
            css.transformations[0].new_text,
            "ag-side-bar/* TODO(gridport): unsupported by target grid */"
        );
        assert_eq!(css.manual_changes[0].priority, Priority::High);

        let html = transform_css_class(
            &registry,
            Path::new("a.html"),
            &usage("ag-side-bar", CssContext::Markup),
        );
        assert!(html.transformations.is_empty());
        assert_eq!(html.manual_changes.len(), 1);
    }

    #[test]
    fn test_unknown_class() {
        let registry = MappingRegistry::builtin().unwrap();
        let out = transform_css_class(
            &registry,
            Path::new("a.scss"),
            &usage("ag-custom-thing", CssContext::Stylesheet),
        );
        assert_eq!(
            out.transformations[0].new_text,
            "ag-custom-thing/* TODO(gridport): review */"
        );
        assert_eq!(out.manual_changes[0].priority, Priority::Low);
    }
}
