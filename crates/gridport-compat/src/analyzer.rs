//! Aggregation of usage records into a [`CompatibilityReport`].

use crate::features::{construct_feature, feature_info};
use gridport_core::{
    CompatibilityReport, Complexity, Construct, EffortEstimate, FeatureCompatibility,
    ManualChange, MappingRegistry, Priority, ScanReport, SupportStatus, UsageRecord,
};
use std::collections::BTreeMap;

/// Total points below this are low complexity.
pub const LOW_EFFORT_THRESHOLD: u32 = 50;
/// Total points below this (and not low) are medium complexity.
pub const MEDIUM_EFFORT_THRESHOLD: u32 = 150;

/// Scores a scan.
///
/// `total_files` is the number of files scanned, `affected_files` the
/// number of records.
pub fn analyze_compatibility(registry: &MappingRegistry, scan: &ScanReport) -> CompatibilityReport {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut manual_changes = Vec::new();

    for record in &scan.records {
        for construct in record.constructs() {
            let feature = construct_feature(registry, construct);
            *counts.entry(feature).or_default() += 1;
            if let Some(change) = manual_change(registry, record, construct, feature) {
                manual_changes.push(change);
            }
        }
    }

    let mut features: Vec<FeatureCompatibility> = counts
        .into_iter()
        .map(|(key, usage_count)| {
            let info = feature_info(key);
            FeatureCompatibility {
                feature: key.to_string(),
                status: info.status,
                usage_count,
                description: info.description.to_string(),
                migration_notes: info.notes.map(str::to_string),
            }
        })
        .collect();
    // Counts descending, then key; the BTreeMap already ordered keys.
    features.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));

    let estimated_effort = estimate_effort(registry, &scan.records, manual_changes.len());
    let report = CompatibilityReport::new(
        scan.files_scanned,
        scan.records.len(),
        features,
        manual_changes,
        estimated_effort,
    );
    tracing::info!(
        "compatibility score {} over {} features",
        report.overall_score(),
        report.features.len()
    );
    report
}

fn manual_change(
    registry: &MappingRegistry,
    record: &UsageRecord,
    construct: Construct<'_>,
    feature: &str,
) -> Option<ManualChange> {
    let status = feature_info(feature).status;
    let (priority, description) = match construct {
        Construct::Import(usage) if registry.is_enterprise_package(&usage.module_source) => (
            Priority::High,
            format!("Enterprise import '{}' has no counterpart", usage.module_source),
        ),
        Construct::Config(usage) => {
            let name = usage.property_name();
            if registry.is_enterprise_config(name) {
                (
                    Priority::High,
                    format!("Enterprise option '{}' must be replaced by hand", name),
                )
            } else {
                match status {
                    SupportStatus::Unsupported => (
                        Priority::High,
                        format!("Option '{}' ({}) is not supported", name, feature),
                    ),
                    SupportStatus::Partial => (
                        Priority::Medium,
                        format!("Option '{}' ({}) is only partially supported", name, feature),
                    ),
                    SupportStatus::Supported => return None,
                }
            }
        }
        Construct::ApiCall(usage) if status == SupportStatus::Unsupported => (
            Priority::High,
            format!("API call '{}()' ({}) is not supported", usage.method_name, feature),
        ),
        _ => return None,
    };

    Some(ManualChange {
        file_path: record.file_path.clone(),
        location: construct.location(),
        feature: feature.to_string(),
        description,
        priority,
    })
}

/// Weighted point estimate.
///
/// Automatic: imports 1, components 2, supported configs 3, CSS classes 1.
/// Manual: unsupported or partial configs 3, API calls 3, manual changes 5.
pub fn estimate_effort(
    registry: &MappingRegistry,
    records: &[UsageRecord],
    manual_change_count: usize,
) -> EffortEstimate {
    let mut automatic = 0usize;
    let mut manual = manual_change_count * 5;

    for record in records {
        automatic += record.imports.len() + record.components.len() * 2 + record.css_classes.len();
        manual += record.api_calls.len() * 3;
        for usage in &record.configs {
            let feature = construct_feature(registry, Construct::Config(usage));
            if feature_info(feature).status == SupportStatus::Supported {
                automatic += 3;
            } else {
                manual += 3;
            }
        }
    }

    let automatic_points = automatic as u32;
    let manual_points = manual as u32;
    let total_points = automatic_points + manual_points;
    let (automatic_percentage, manual_percentage) = if total_points == 0 {
        (0, 0)
    } else {
        let auto = (automatic_points as f64 / total_points as f64 * 100.0).round() as u32;
        (auto, 100 - auto)
    };

    let (complexity, estimated_time) = if total_points < LOW_EFFORT_THRESHOLD {
        (Complexity::Low, "1-2 hours")
    } else if total_points < MEDIUM_EFFORT_THRESHOLD {
        (Complexity::Medium, "4-8 hours")
    } else {
        (Complexity::High, "1-3 days")
    };

    EffortEstimate {
        complexity,
        estimated_time: estimated_time.to_string(),
        automatic_points,
        manual_points,
        total_points,
        automatic_percentage,
        manual_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridport_core::{ApiCallUsage, ConfigKind, ConfigProperty, ConfigUsage, ConfigValue, Location};

    fn config(name: &str) -> ConfigUsage {
        ConfigUsage {
            property: ConfigProperty {
                name: name.to_string(),
                key_text: name.to_string(),
                value: ConfigValue::Bool(true),
                raw_text: format!("{}: true", name),
                location: Location::new(2, 3),
                multiline: false,
            },
            config_kind: ConfigKind::GridOption,
        }
    }

    fn record_with(configs: &[&str], calls: &[&str]) -> UsageRecord {
        let mut record = UsageRecord::new("src/grid.ts");
        record.configs = configs.iter().map(|c| config(c)).collect();
        record.api_calls = calls
            .iter()
            .map(|m| ApiCallUsage {
                location: Location::new(9, 5),
                receiver: "gridApi".to_string(),
                method_name: m.to_string(),
                args: Vec::new(),
            })
            .collect();
        record
    }

    #[test]
    fn test_empty_scan_scores_100() {
        let registry = MappingRegistry::builtin().unwrap();
        let report = analyze_compatibility(&registry, &ScanReport::default());
        assert_eq!(report.overall_score(), 100);
        assert_eq!(report.estimated_effort.complexity, Complexity::Low);
        assert_eq!(report.estimated_effort.total_points, 0);
        assert!(report.features.is_empty());
    }

    #[test]
    fn test_features_manual_changes_and_effort() {
        let registry = MappingRegistry::builtin().unwrap();
        let scan = ScanReport {
            records: vec![record_with(
                &["rowData", "pagination", "domLayout", "sideBar"],
                &["setRowGroupColumns", "sizeColumnsToFit"],
            )],
            files_scanned: 4,
            warnings: Vec::new(),
        };

        let report = analyze_compatibility(&registry, &scan);
        assert_eq!(report.total_files, 4);
        assert_eq!(report.affected_files, 1);

        let keys: Vec<_> = report.features.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "api-calls",
                "data-binding",
                "grouping",
                "layout",
                "pagination",
                "tool-panels"
            ]
        );
        let breakdown = report.compatibility();
        assert_eq!(breakdown.full, 2);
        assert_eq!(breakdown.partial, 2);
        assert_eq!(breakdown.unsupported, 2);

        // domLayout (medium), sideBar (enterprise), setRowGroupColumns (unsupported)
        let priorities: Vec<_> = report.manual_changes.iter().map(|m| m.priority).collect();
        assert_eq!(priorities, vec![Priority::Medium, Priority::High, Priority::High]);

        let effort = &report.estimated_effort;
        assert_eq!(effort.automatic_points, 6);
        assert_eq!(effort.manual_points, 6 + 6 + 15);
        assert_eq!(effort.complexity, Complexity::Low);
        assert_eq!(effort.automatic_percentage + effort.manual_percentage, 100);

        // (1.0 * 2 + 0.7 * 2 + 0.0 * 2) / 6
        assert_eq!(report.overall_score(), 57);
    }

    #[test]
    fn test_effort_thresholds() {
        let registry = MappingRegistry::builtin().unwrap();
        let calls = vec!["sizeColumnsToFit"; 20];
        let medium = estimate_effort(&registry, &[record_with(&[], &calls)], 0);
        assert_eq!(medium.total_points, 60);
        assert_eq!(medium.complexity, Complexity::Medium);
        assert_eq!(medium.estimated_time, "4-8 hours");

        let high = estimate_effort(&registry, &[record_with(&[], &calls)], 20);
        assert_eq!(high.complexity, Complexity::High);
    }
}
