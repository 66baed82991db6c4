use gridport_core::{ConfigKind, CssContext, MappingRegistry};
use gridport_fs::NativeFileSystem;
use gridport_scanner::{ScanOptions, Scanner};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(
        root,
        "src/app/grid.component.ts",
        r#"import { Component } from '@angular/core';
import { ColDef, GridApi, GridReadyEvent } from 'ag-grid-community';

@Component({
  selector: 'app-grid',
  templateUrl: './grid.component.html',
})
export class GridComponent {
  private gridApi!: GridApi;
  columnDefs: ColDef[] = [
    { field: 'make', filter: 'agTextColumnFilter' },
    { field: 'price', cellRenderer: 'agAnimateShowChangeCellRenderer' },
  ];

  onGridReady(params: GridReadyEvent) {
    this.gridApi = params.api;
    this.gridApi.sizeColumnsToFit();
  }
}
"#,
    );
    write(
        root,
        "src/app/grid.component.html",
        r#"<ag-grid-angular
  class="ag-theme-alpine"
  [rowData]="rowData"
  [columnDefs]="columnDefs"
  (gridReady)="onGridReady($event)">
</ag-grid-angular>
"#,
    );
    write(
        root,
        "src/styles.scss",
        ".ag-theme-alpine .ag-header-cell { font-weight: bold; }\n",
    );
    write(root, "src/app/plain.component.ts", "export const x = 1;\n");
    write(
        root,
        "src/app/grid.component.spec.ts",
        "import { AgGridAngular } from 'ag-grid-angular';\n",
    );
    write(
        root,
        "node_modules/ag-grid-community/main.js",
        "export const api = { setRowData() {} };\n",
    );
    write(root, "src/broken.ts", "import { from 'ag-grid-community'\n");

    temp_dir
}

#[tokio::test]
async fn test_scan_project() {
    let temp_dir = sample_project();
    let registry = MappingRegistry::builtin().unwrap();
    let fs = Arc::new(NativeFileSystem::new(temp_dir.path()).unwrap());

    let report = Scanner::new(fs, &registry).unwrap().scan().await.unwrap();

    // broken.ts, grid.component.ts, plain.component.ts, the template, the stylesheet
    assert_eq!(report.files_scanned, 5);

    let paths: Vec<PathBuf> = report.records.iter().map(|r| r.file_path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("src/app/grid.component.ts"),
            PathBuf::from("src/app/grid.component.html"),
            PathBuf::from("src/styles.scss"),
        ]
    );

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].file_path, PathBuf::from("src/broken.ts"));

    let ts = &report.records[0];
    assert_eq!(ts.imports.len(), 1);
    assert_eq!(ts.imports[0].imported_names.len(), 3);
    assert_eq!(ts.configs.len(), 1);
    assert_eq!(ts.configs[0].config_kind, ConfigKind::ColumnBinding);
    assert_eq!(ts.api_calls.len(), 1);
    assert_eq!(ts.api_calls[0].method_name, "sizeColumnsToFit");

    let html = &report.records[1];
    assert_eq!(html.components.len(), 1);
    assert_eq!(html.components[0].attributes.len(), 4);
    assert_eq!(html.css_classes[0].context, CssContext::Markup);

    let scss = &report.records[2];
    let classes: Vec<_> = scss.css_classes.iter().map(|c| c.class_name.as_str()).collect();
    assert_eq!(classes, vec!["ag-theme-alpine", "ag-header-cell"]);
}

#[tokio::test]
async fn test_scan_is_deterministic() {
    let temp_dir = sample_project();
    let registry = MappingRegistry::builtin().unwrap();
    let fs = Arc::new(NativeFileSystem::new(temp_dir.path()).unwrap());
    let scanner = Scanner::new(fs, &registry).unwrap();

    let first = scanner.scan().await.unwrap();
    let second = scanner.scan().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_scan_subset_and_excludes() {
    let temp_dir = sample_project();
    let registry = MappingRegistry::builtin().unwrap();
    let fs = Arc::new(NativeFileSystem::new(temp_dir.path()).unwrap());

    let only: BTreeSet<PathBuf> = [
        PathBuf::from("src/app/grid.component.html"),
        PathBuf::from("src/styles.scss"),
    ]
    .into_iter()
    .collect();
    let options = ScanOptions {
        exclude: vec!["*.scss".to_string()],
        only: Some(only),
        ..Default::default()
    };

    let report = Scanner::new(fs, &registry)
        .unwrap()
        .with_options(options)
        .scan()
        .await
        .unwrap();

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.records[0].file_path,
        PathBuf::from("src/app/grid.component.html")
    );
}

#[tokio::test]
async fn test_project_without_usages() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "src/main.ts", "console.log('hello');\n");
    let registry = MappingRegistry::builtin().unwrap();
    let fs = Arc::new(NativeFileSystem::new(temp_dir.path()).unwrap());

    let report = Scanner::new(fs, &registry).unwrap().scan().await.unwrap();
    assert_eq!(report.files_scanned, 1);
    assert!(report.records.is_empty());
    assert!(report.warnings.is_empty());
}
