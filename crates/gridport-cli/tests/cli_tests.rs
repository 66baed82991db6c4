//! End-to-end runs of the `gridport` binary against temporary projects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/app")).unwrap();
    fs::write(
        dir.path().join("package.json"),
        "{\n  \"dependencies\": {\n    \"ag-grid-angular\": \"^31.0.0\"\n  }\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/app/grid.component.ts"),
        "import { AgGridAngular } from 'ag-grid-angular';\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/app/grid.component.html"),
        "<ag-grid-angular [rowData]=\"rows\" [columnDefs]=\"cols\"></ag-grid-angular>\n",
    )
    .unwrap();
    dir
}

fn gridport(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridport"))
        .args(args)
        .arg(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run gridport")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_rollback_without_backup_exits_nonzero() {
    let dir = project();
    let output = gridport(dir.path(), &["rollback"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No backup found"));
}

#[test]
fn test_analyze_json() {
    let dir = project();
    let output = gridport(dir.path(), &["analyze", "--json"]);

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["total_files"], 2);
    assert_eq!(report["affected_files"], 2);
}

#[test]
fn test_dry_run_then_migrate() {
    let dir = project();
    let ts = dir.path().join("src/app/grid.component.ts");

    let preview = gridport(dir.path(), &["migrate", "--dry-run"]);
    assert!(preview.status.success());
    assert!(String::from_utf8_lossy(&preview.stdout)
        .contains("+import { TgGridComponent as AgGridAngular } from '@tessera/grid';"));
    assert!(fs::read_to_string(&ts).unwrap().contains("ag-grid-angular"));

    let output = gridport(dir.path(), &["migrate", "--json"]);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["success"], true);
    assert_eq!(result["files_modified"], 2);
    assert_eq!(
        fs::read_to_string(&ts).unwrap(),
        "import { TgGridComponent as AgGridAngular } from '@tessera/grid';\n"
    );

    let rollback = gridport(dir.path(), &["rollback"]);
    assert!(rollback.status.success());
    assert!(fs::read_to_string(&ts).unwrap().contains("ag-grid-angular"));
}

#[test]
fn test_validate_exit_code_follows_result() {
    let dir = project();

    let before = gridport(dir.path(), &["validate", "--json"]);
    assert_eq!(before.status.code(), Some(1));
    assert_eq!(stdout_json(&before)["passed"], false);

    assert!(gridport(dir.path(), &["migrate", "--no-backup", "-y"])
        .status
        .success());

    let after = gridport(dir.path(), &["validate"]);
    assert!(after.status.success(), "{}", String::from_utf8_lossy(&after.stdout));
}

#[test]
fn test_config_add_mapping() {
    let dir = project();

    let output = Command::new(env!("CARGO_BIN_EXE_gridport"))
        .args(["config", "add-mapping", "css_classes", "my-grid", "tg-my-grid", "--path"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let saved = fs::read_to_string(dir.path().join("gridport.toml")).unwrap();
    assert!(saved.contains("my-grid"));

    let bad = Command::new(env!("CARGO_BIN_EXE_gridport"))
        .args(["config", "add-mapping", "widgets", "a", "b", "--path"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(bad.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("Unknown mapping table `widgets`"));
}
