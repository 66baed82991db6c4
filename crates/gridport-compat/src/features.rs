//! Feature keys and their curated support levels.
//!
//! Every detected construct resolves to exactly one feature key through
//! the pure functions below. The support level of a key is fixed data.

use gridport_core::{
    ApiCallUsage, ComponentUsage, ConfigUsage, Construct, CssClassUsage, ImportUsage,
    MappingRegistry, SupportStatus,
};

/// Curated entry of the support dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureInfo {
    pub key: &'static str,
    pub status: SupportStatus,
    pub description: &'static str,
    pub notes: Option<&'static str>,
}

const fn supported(key: &'static str, description: &'static str) -> FeatureInfo {
    FeatureInfo {
        key,
        status: SupportStatus::Supported,
        description,
        notes: None,
    }
}

const fn partial(key: &'static str, description: &'static str, notes: &'static str) -> FeatureInfo {
    FeatureInfo {
        key,
        status: SupportStatus::Partial,
        description,
        notes: Some(notes),
    }
}

const fn unsupported(
    key: &'static str,
    description: &'static str,
    notes: &'static str,
) -> FeatureInfo {
    FeatureInfo {
        key,
        status: SupportStatus::Unsupported,
        description,
        notes: Some(notes),
    }
}

/// The support dictionary.
pub const FEATURES: &[FeatureInfo] = &[
    supported("grid-module", "Grid package imports"),
    supported("grid-component", "Grid component element"),
    supported("data-binding", "Row data binding"),
    supported("column-definitions", "Column definitions"),
    supported("pagination", "Client-side pagination"),
    supported("selection", "Row selection"),
    supported("events", "Grid event handlers"),
    supported("animations", "Row animations"),
    supported("row-identity", "Row identity callbacks"),
    supported("sizing", "Row and header sizing"),
    supported("sorting", "Column sorting"),
    supported("styling", "Structural CSS classes"),
    partial(
        "layout",
        "DOM layout modes",
        "Only normal and auto-height layouts exist; print layout must be rebuilt.",
    ),
    partial(
        "grid-options",
        "Other grid options",
        "Check each renamed option against the target grid documentation.",
    ),
    partial(
        "theming",
        "Theme classes",
        "Theme variants map by name; custom theme variables need porting by hand.",
    ),
    partial(
        "export",
        "Data export",
        "CSV export is available; Excel export is not.",
    ),
    partial(
        "filtering",
        "Column filtering",
        "Built-in filters map to filter types; custom filter components must be rewritten.",
    ),
    partial(
        "api-calls",
        "Grid API calls",
        "API methods keep most names but signatures differ; review each call.",
    ),
    unsupported(
        "enterprise-modules",
        "Enterprise package imports",
        "Enterprise-only features have no counterpart; find an alternative or drop them.",
    ),
    unsupported(
        "range-selection",
        "Range selection and fill handle",
        "Not available in the target grid.",
    ),
    unsupported("charts", "Integrated charts", "Use a separate charting library."),
    unsupported(
        "master-detail",
        "Master/detail rows",
        "Render detail content in an expandable row template.",
    ),
    unsupported("pivoting", "Pivot mode", "Pivot the data before binding it."),
    unsupported(
        "tool-panels",
        "Side bar and tool panels",
        "Build column and filter panels outside the grid.",
    ),
    unsupported(
        "status-bar",
        "Status bar",
        "Render status information outside the grid.",
    ),
    unsupported(
        "grouping",
        "Row grouping and aggregation",
        "Group and aggregate the data before binding it.",
    ),
    unsupported(
        "tree-data",
        "Tree data",
        "Flatten the hierarchy or use a tree component.",
    ),
    unsupported(
        "server-side-model",
        "Server-side and infinite row models",
        "Page the data through the data binding instead.",
    ),
];

/// Looks up a key; unknown keys are treated as partially supported.
pub fn feature_info(key: &str) -> FeatureInfo {
    FEATURES
        .iter()
        .find(|info| info.key == key)
        .copied()
        .unwrap_or(FeatureInfo {
            key: "unknown",
            status: SupportStatus::Partial,
            description: "Unclassified usage",
            notes: Some("Review by hand."),
        })
}

pub fn feature_status(key: &str) -> SupportStatus {
    feature_info(key).status
}

pub fn import_feature(registry: &MappingRegistry, usage: &ImportUsage) -> &'static str {
    if registry.is_enterprise_package(&usage.module_source) {
        "enterprise-modules"
    } else {
        "grid-module"
    }
}

pub fn component_feature(_usage: &ComponentUsage) -> &'static str {
    "grid-component"
}

/// Grid option or column binding name to feature key.
pub fn config_feature(property: &str) -> &'static str {
    match property {
        "rowData" => "data-binding",
        "columnDefs" | "defaultColDef" => "column-definitions",
        "pagination" | "paginationPageSize" | "paginationAutoPageSize" => "pagination",
        "rowSelection" | "suppressRowClickSelection" | "enableCellTextSelection" => "selection",
        "animateRows" => "animations",
        "getRowId" => "row-identity",
        "rowHeight" | "headerHeight" => "sizing",
        "domLayout" => "layout",
        "enableRangeSelection" | "enableRangeHandle" | "enableFillHandle" => "range-selection",
        "enableCharts" => "charts",
        "masterDetail" | "detailCellRendererParams" => "master-detail",
        "pivotMode" => "pivoting",
        "sideBar" => "tool-panels",
        "statusBar" => "status-bar",
        "rowGroupPanelShow" | "groupDisplayType" | "autoGroupColumnDef" | "aggFuncs" => {
            "grouping"
        }
        "treeData" | "getDataPath" => "tree-data",
        "rowModelType" | "serverSideDatasource" => "server-side-model",
        name if is_event_handler(name) => "events",
        _ => "grid-options",
    }
}

/// `onGridReady`, `onCellClicked`, ...
fn is_event_handler(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// API method name to feature key, by substring.
pub fn api_call_feature(usage: &ApiCallUsage) -> &'static str {
    let method = usage.method_name.to_lowercase();
    if method.contains("export") {
        "export"
    } else if method.contains("select") {
        "selection"
    } else if method.contains("filter") {
        "filtering"
    } else if method.contains("sort") {
        "sorting"
    } else if method.contains("group") {
        "grouping"
    } else {
        "api-calls"
    }
}

pub fn css_feature(usage: &CssClassUsage) -> &'static str {
    if usage.class_name.starts_with("ag-theme-") {
        "theming"
    } else {
        "styling"
    }
}

/// Feature key of any construct.
pub fn construct_feature(registry: &MappingRegistry, construct: Construct<'_>) -> &'static str {
    match construct {
        Construct::Import(usage) => import_feature(registry, usage),
        Construct::Component(usage) => component_feature(usage),
        Construct::Config(usage) => config_usage_feature(usage),
        Construct::ApiCall(usage) => api_call_feature(usage),
        Construct::CssClass(usage) => css_feature(usage),
    }
}

pub fn config_usage_feature(usage: &ConfigUsage) -> &'static str {
    config_feature(usage.property_name())
}
