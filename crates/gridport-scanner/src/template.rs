//! Regex-based scanning of HTML templates and stylesheets.
//!
//! No template AST is built. Component tags are located with a tag regex
//! that tolerates `>` inside quoted attribute values; attributes and class
//! tokens keep their own line/column so edits stay line-local.

use crate::text::{class_tokens, LineIndex};
use gridport_core::{
    ComponentAttribute, ComponentUsage, CssClassUsage, CssContext, Error, MappingRegistry,
    Result, UsageRecord, TODO_MARKER,
};
use regex::{Regex, RegexBuilder};

/// Regex size limit (10MB)
const REGEX_SIZE_LIMIT: usize = 10_000_000;

/// Regex DFA size limit (2MB)
const REGEX_DFA_SIZE_LIMIT: usize = 2_000_000;

/// Attribute syntax inside an opening tag: `name`, `name="v"`, `name='v'`, `name=v`.
const ATTRIBUTE_PATTERN: &str =
    r#"([^\s=>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#;

const CLASS_ATTRIBUTE_PATTERN: &str = r#"\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#;

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
        .build()
        .map_err(|e| Error::InvalidMapping(format!("cannot build pattern: {}", e)))
}

/// Patterns derived from a registry's selectors and class prefixes.
#[derive(Debug, Clone)]
pub struct TemplatePatterns {
    component: Option<Regex>,
    attribute: Regex,
    class_attribute: Regex,
    stylesheet_class: Option<Regex>,
}

impl TemplatePatterns {
    pub fn new(registry: &MappingRegistry) -> Result<Self> {
        let selectors: Vec<String> = registry.source_selectors().map(regex::escape).collect();
        let component = if selectors.is_empty() {
            None
        } else {
            Some(compile(&format!(
                r#"<({})((?:\s+[^\s=>/]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*(/?)>"#,
                selectors.join("|")
            ))?)
        };

        let prefixes: Vec<String> = registry
            .css_prefixes()
            .iter()
            .map(|p| regex::escape(p))
            .collect();
        let stylesheet_class = if prefixes.is_empty() {
            None
        } else {
            Some(compile(&format!(
                r"\.((?:{})[A-Za-z0-9_-]+)",
                prefixes.join("|")
            ))?)
        };

        Ok(Self {
            component,
            attribute: compile(ATTRIBUTE_PATTERN)?,
            class_attribute: compile(CLASS_ATTRIBUTE_PATTERN)?,
            stylesheet_class,
        })
    }
}

/// Scans template text for component tags and library classes.
pub(crate) fn scan_template(
    text: &str,
    index: &LineIndex,
    patterns: &TemplatePatterns,
    registry: &MappingRegistry,
    record: &mut UsageRecord,
) {
    if let Some(component) = &patterns.component {
        for caps in component.captures_iter(text) {
            let (Some(whole), Some(tag), Some(attrs)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());

            let attributes = patterns
                .attribute
                .captures_iter(attrs.as_str())
                .filter_map(|a| {
                    let m = a.get(0)?;
                    let name = a.get(1)?;
                    let value = a
                        .get(2)
                        .or_else(|| a.get(3))
                        .or_else(|| a.get(4))
                        .map(|v| v.as_str().to_string());
                    Some(ComponentAttribute {
                        name: name.as_str().to_string(),
                        value,
                        raw_text: m.as_str().to_string(),
                        location: index.location(attrs.start() + m.start()),
                    })
                })
                .collect();

            let closing = if self_closing {
                None
            } else {
                find_closing_tag(text, whole.end(), tag.as_str()).map(|at| index.location(at))
            };

            record.components.push(ComponentUsage {
                location: index.location(whole.start()),
                selector: tag.as_str().to_string(),
                attributes,
                raw_text: whole.as_str().to_string(),
                self_closing,
                closing,
            });
        }
    }

    for caps in patterns.class_attribute.captures_iter(text) {
        let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        for (offset, token) in class_tokens(value.as_str()) {
            if registry.is_library_css_class(token) {
                record.css_classes.push(CssClassUsage {
                    location: index.location(value.start() + offset),
                    class_name: token.to_string(),
                    context: CssContext::Markup,
                });
            }
        }
    }
}

/// Byte offset of the first `</tag` after `from` that closes `tag`.
fn find_closing_tag(text: &str, from: usize, tag: &str) -> Option<usize> {
    let needle = format!("</{}", tag);
    let mut search = from;
    while let Some(found) = text[search..].find(&needle) {
        let at = search + found;
        let after = text[at + needle.len()..].chars().next();
        match after {
            Some(c) if c == '>' || c.is_whitespace() => return Some(at),
            None => return None,
            _ => search = at + needle.len(),
        }
    }
    None
}

/// Scans stylesheet text for `.prefix-*` class selectors.
///
/// Classes already followed by a gridport marker comment are skipped.
pub(crate) fn scan_stylesheet(
    text: &str,
    patterns: &TemplatePatterns,
    registry: &MappingRegistry,
    record: &mut UsageRecord,
) {
    let Some(stylesheet_class) = &patterns.stylesheet_class else {
        return;
    };
    let index = LineIndex::new(text);

    for caps in stylesheet_class.captures_iter(text) {
        let Some(class) = caps.get(1) else {
            continue;
        };
        if !registry.is_library_css_class(class.as_str()) {
            continue;
        }
        let rest = text[class.end()..].trim_start_matches([' ', '\t']);
        if rest
            .strip_prefix("/*")
            .is_some_and(|c| c.trim_start().starts_with(TODO_MARKER))
        {
            continue;
        }
        record.css_classes.push(CssClassUsage {
            location: index.location(class.start()),
            class_name: class.as_str().to_string(),
            context: CssContext::Stylesheet,
        });
    }
}
