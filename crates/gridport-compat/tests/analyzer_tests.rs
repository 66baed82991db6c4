use gridport_compat::{analyze_compatibility, render_report, ReportFormat};
use gridport_core::{
    ApiCallUsage, CompatibilityReport, CssClassUsage, CssContext, Location, MappingRegistry,
    ScanReport, UsageRecord,
};
use gridport_scanner::{scan_text, TemplatePatterns};
use std::path::Path;

fn scan_files(registry: &MappingRegistry, files: &[(&str, &str)]) -> ScanReport {
    let patterns = TemplatePatterns::new(registry).unwrap();
    let records = files
        .iter()
        .map(|(path, source)| scan_text(&patterns, registry, Path::new(path), source).unwrap())
        .filter(|record| !record.is_empty())
        .collect();
    ScanReport {
        records,
        files_scanned: files.len(),
        warnings: Vec::new(),
    }
}

#[test]
fn test_supported_project_scores_100() {
    let registry = MappingRegistry::builtin().unwrap();
    let scan = scan_files(
        &registry,
        &[
            (
                "src/app/grid.component.ts",
                "import { AgGridAngular } from 'ag-grid-angular';\n\
                 const options = { rowData: rows, pagination: true, rowHeight: 32 };\n",
            ),
            (
                "src/app/grid.component.html",
                "<ag-grid-angular [rowData]=\"rows\"></ag-grid-angular>\n",
            ),
            ("src/styles.css", ".ag-row { color: red; }\n"),
            ("src/main.ts", "console.log('boot');\n"),
        ],
    );

    let report = analyze_compatibility(&registry, &scan);
    assert_eq!(report.overall_score(), 100);
    assert_eq!(report.total_files, 4);
    assert_eq!(report.affected_files, 3);
    assert!(report.manual_changes.is_empty());
    assert_eq!(report.compatibility().partial, 0);
    assert_eq!(report.compatibility().unsupported, 0);
}

#[test]
fn test_enterprise_usage_lowers_score() {
    let registry = MappingRegistry::builtin().unwrap();
    let scan = scan_files(
        &registry,
        &[(
            "src/main.ts",
            "import 'ag-grid-enterprise';\nconst o = { masterDetail: true, rowData: r };\n",
        )],
    );

    let report = analyze_compatibility(&registry, &scan);
    // enterprise-modules 0.0, master-detail 0.0, data-binding 1.0
    assert_eq!(report.overall_score(), 33);
    assert_eq!(report.manual_changes.len(), 2);
    assert!(report
        .manual_changes
        .iter()
        .all(|m| m.priority == gridport_core::Priority::High));
}

#[test]
fn test_json_report_is_the_report() {
    let registry = MappingRegistry::builtin().unwrap();
    let scan = scan_files(&registry, &[("src/a.css", ".ag-theme-balham { }\n")]);
    let report = analyze_compatibility(&registry, &scan);

    let json = render_report(&report, ReportFormat::Json).unwrap();
    let parsed: CompatibilityReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["overall_score"], 70);
    assert_eq!(value["features"][0]["feature"], "theming");
}

mod props {
    use super::*;
    use proptest::prelude::*;

    fn record(supported_css: usize, unsupported_calls: usize, partial_calls: usize) -> UsageRecord {
        let mut record = UsageRecord::new("src/grid.ts");
        for i in 0..supported_css {
            record.css_classes.push(CssClassUsage {
                location: Location::new(i as u32 + 1, 1),
                class_name: "ag-row".to_string(),
                context: CssContext::Script,
            });
        }
        let calls = std::iter::repeat("expandAllGroups")
            .take(unsupported_calls)
            .chain(std::iter::repeat("sizeColumnsToFit").take(partial_calls));
        for method in calls {
            record.api_calls.push(ApiCallUsage {
                location: Location::new(1, 1),
                receiver: "gridApi".to_string(),
                method_name: method.to_string(),
                args: Vec::new(),
            });
        }
        record
    }

    fn score(supported: usize, unsupported: usize, partial: usize) -> u32 {
        let registry = MappingRegistry::builtin().unwrap();
        let scan = ScanReport {
            records: vec![record(supported, unsupported, partial)],
            files_scanned: 1,
            warnings: Vec::new(),
        };
        analyze_compatibility(&registry, &scan).overall_score()
    }

    proptest! {
        #[test]
        fn adding_supported_usages_never_lowers_score(
            base_supported in 0usize..10,
            unsupported in 0usize..10,
            partial in 0usize..10,
            extra in 1usize..10,
        ) {
            let before = score(base_supported, unsupported, partial);
            let after = score(base_supported + extra, unsupported, partial);
            prop_assert!(after >= before);
        }

        #[test]
        fn adding_unsupported_usages_never_raises_score(
            supported in 0usize..10,
            base_unsupported in 0usize..10,
            partial in 0usize..10,
            extra in 1usize..10,
        ) {
            let before = score(supported, base_unsupported, partial);
            let after = score(supported, base_unsupported + extra, partial);
            prop_assert!(after <= before);
        }
    }
}
