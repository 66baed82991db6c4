//! Component element rewrite: tag name, attributes and closing tag.

use crate::GeneratedEdits;
use gridport_core::{
    split_binding, ComponentUsage, MappingRegistry, Priority, TransformationKind, TODO_MARKER,
};
use std::path::Path;

/// Rewrites a component's tag and attributes.
///
/// Unsupported attributes are removed and replaced by an HTML marker
/// comment placed in front of the opening tag, one per attribute. An
/// attribute spanning several lines gets neither edit, only a warning.
pub fn transform_component(
    registry: &MappingRegistry,
    file: &Path,
    usage: &ComponentUsage,
) -> GeneratedEdits {
    let mut out = GeneratedEdits::default();
    let old_tag = usage.selector.as_str();
    let new_tag = registry.map_selector(old_tag).unwrap_or(old_tag);

    let mut markers = Vec::new();
    for attribute in &usage.attributes {
        let (style, bare) = split_binding(&attribute.name);

        if registry.is_unsupported_attribute(bare) {
            out.manual(
                file,
                attribute.location,
                bare,
                format!(
                    "<{}> attribute '{}' has no equivalent on <{}>",
                    old_tag, attribute.name, new_tag
                ),
                Priority::High,
            );
            if attribute.raw_text.contains('\n') {
                out.warn(
                    file,
                    attribute.location,
                    format!(
                        "unsupported attribute {} spans lines; remove it by hand",
                        attribute.name
                    ),
                );
                continue;
            }
            markers.push(format!(
                "<!-- {}: unsupported attribute {}=\"{}\" -->",
                TODO_MARKER,
                attribute.name,
                attribute
                    .value
                    .as_deref()
                    .unwrap_or("")
                    .replace("--", "- -")
            ));
            out.edit(
                file,
                TransformationKind::Attribute,
                attribute.location,
                attribute.raw_text.as_str(),
                "",
                format!("Remove unsupported attribute {}", attribute.name),
            );
            continue;
        }

        if let Some(mapped) = registry.map_attribute(bare) {
            let renamed = style.wrap(mapped);
            out.edit(
                file,
                TransformationKind::Attribute,
                attribute.location,
                attribute.name.as_str(),
                renamed.as_str(),
                format!("Rename attribute {} to {}", attribute.name, renamed),
            );
        }
    }

    let mut description = format!("Rewrite <{}> to <{}>", old_tag, new_tag);
    if !markers.is_empty() {
        description.push_str(&format!(
            "; {} attribute(s) need manual migration",
            markers.len()
        ));
    }
    out.edit(
        file,
        TransformationKind::Component,
        usage.location,
        format!("<{}", old_tag),
        format!("{}<{}", markers.concat(), new_tag),
        description,
    );

    if new_tag != old_tag {
        match usage.closing {
            Some(closing) => out.edit(
                file,
                TransformationKind::ClosingTag,
                closing,
                format!("</{}", old_tag),
                format!("</{}", new_tag),
                format!("Rewrite closing tag </{}>", old_tag),
            ),
            None if !usage.self_closing => out.warn(
                file,
                usage.location,
                format!("closing tag </{}> not found; rename it by hand", old_tag),
            ),
            None => {}
        }
    }

    out
}
