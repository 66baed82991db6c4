//! Named detection predicates.
//!
//! The scanner never inlines a substring or prefix test; every recognition
//! rule lives here so it can be tested on its own.

use crate::mapping::MappingRegistry;

/// Angular binding syntax around an attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStyle {
    /// `name`
    Plain,
    /// `[name]`
    Property,
    /// `(name)`
    Event,
    /// `[(name)]`
    TwoWay,
}

impl BindingStyle {
    /// Wraps a bare name in this binding syntax.
    pub fn wrap(&self, name: &str) -> String {
        match self {
            BindingStyle::Plain => name.to_string(),
            BindingStyle::Property => format!("[{}]", name),
            BindingStyle::Event => format!("({})", name),
            BindingStyle::TwoWay => format!("[({})]", name),
        }
    }
}

/// Splits `[(name)]`, `[name]`, `(name)` or `name` into style and bare name.
pub fn split_binding(attribute: &str) -> (BindingStyle, &str) {
    if let Some(inner) = attribute
        .strip_prefix("[(")
        .and_then(|rest| rest.strip_suffix(")]"))
    {
        return (BindingStyle::TwoWay, inner);
    }
    if let Some(inner) = attribute
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        return (BindingStyle::Property, inner);
    }
    if let Some(inner) = attribute
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return (BindingStyle::Event, inner);
    }
    (BindingStyle::Plain, attribute)
}

/// Tag carried by every marker comment gridport writes into sources.
pub const TODO_MARKER: &str = "TODO(gridport)";

/// Property names whose value is a list of column definitions (or one).
pub const COLUMN_BINDING_NAMES: &[&str] = &["columnDefs", "defaultColDef"];

impl MappingRegistry {
    /// Import source is one of the source library's packages, by exact name or prefix.
    pub fn is_source_package(&self, source: &str) -> bool {
        self.source_packages.contains(source)
            || self
                .source_package_prefixes
                .iter()
                .any(|prefix| source.starts_with(prefix.as_str()))
    }

    /// Import source belongs to the commercial edition.
    pub fn is_enterprise_package(&self, source: &str) -> bool {
        self.enterprise_packages
            .iter()
            .any(|p| source == p || (p.ends_with('/') && source.starts_with(p.as_str())))
    }

    /// Method name is part of the grid API surface.
    pub fn is_api_method(&self, method: &str) -> bool {
        self.api_methods.contains(method)
    }

    /// Receiver identifier looks like a grid API handle (`gridApi`, `this.agGrid`).
    ///
    /// Heuristic: case-insensitive substring match against the receiver hints.
    pub fn is_grid_api_receiver(&self, receiver: &str) -> bool {
        let lower = receiver.to_lowercase();
        self.api_receiver_hints
            .iter()
            .any(|hint| lower.contains(hint.as_str()))
    }

    /// A `object.method(...)` call is recorded when either side matches.
    pub fn is_grid_api_call(&self, receiver: &str, method: &str) -> bool {
        self.is_api_method(method) || self.is_grid_api_receiver(receiver)
    }

    /// Object key is a grid option the tables know about.
    pub fn is_known_config_property(&self, key: &str) -> bool {
        self.config.contains_key(key) || self.unsupported_config.contains(key)
    }

    /// Tag name is a source-library component selector.
    pub fn is_component_selector(&self, tag: &str) -> bool {
        self.selectors.contains_key(tag)
    }

    /// Token looks like a source-library CSS class.
    ///
    /// Package names and selectors share the class prefix (`ag-grid-angular`),
    /// so they are excluded explicitly.
    pub fn is_library_css_class(&self, token: &str) -> bool {
        let prefixed = self
            .css_prefixes
            .iter()
            .any(|prefix| token.len() > prefix.len() && token.starts_with(prefix.as_str()));
        prefixed
            && !self.is_source_package(token)
            && !self.is_component_selector(token)
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// The class prefixes, for building stylesheet regexes.
    pub fn css_prefixes(&self) -> &[String] {
        &self.css_prefixes
    }

    /// Source component selectors.
    pub fn source_selectors(&self) -> impl Iterator<Item = &str> {
        self.selectors.keys().map(String::as_str)
    }

    /// Source symbol names that have a translation.
    pub fn source_symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }
}

/// Whether a property holds column definitions rather than grid options.
pub fn is_column_binding(name: &str) -> bool {
    COLUMN_BINDING_NAMES.contains(&name)
}
