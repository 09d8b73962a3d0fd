//! End-to-end tests for `stitchgrid new`, `inspect` and `show`.

mod fixtures;

use fixtures::*;
use std::fs;
use stitchgrid::constants::{KEY_ID_KNIT_DEFAULT, KEY_ID_PURL_DEFAULT};
use stitchgrid::services::DocumentService;
use tempfile::TempDir;

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    assert_eq!(
        output.status.code(),
        Some(0),
        "Should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Should parse JSON output")
}

#[test]
fn test_new_creates_chart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scarf.json");

    let output = run_stitchgrid(
        &[
            "new",
            "--output",
            path.to_str().unwrap(),
            "--rows",
            "8",
            "--cols",
            "6",
            "--name",
            "Scarf",
            "--orientation",
            "in-the-round",
        ],
        temp_dir.path(),
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created 8x6 chart"));

    let document = DocumentService::load(&path).unwrap();
    let sheet = document.active_sheet().unwrap();
    assert_eq!((sheet.rows, sheet.cols), (8, 6));
    assert_eq!(sheet.name, "Scarf");
    assert_eq!(key_at(&document, 7, 5), KEY_ID_KNIT_DEFAULT);
}

#[test]
fn test_new_uses_config_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("StitchGrid");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[chart]\ndefault_rows = 4\ndefault_cols = 3\n",
    )
    .unwrap();
    let path = temp_dir.path().join("chart.json");

    let output = run_stitchgrid(&["new", "-o", path.to_str().unwrap()], temp_dir.path());

    assert_eq!(output.status.code(), Some(0));
    let document = DocumentService::load(&path).unwrap();
    let sheet = document.active_sheet().unwrap();
    assert_eq!((sheet.rows, sheet.cols), (4, 3));
}

#[test]
fn test_new_refuses_to_overwrite() {
    let (path, temp_dir) = create_temp_chart_file(&test_document(3, 3));

    let output = run_stitchgrid(&["new", "-o", path.to_str().unwrap()], temp_dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

    let output = run_stitchgrid(
        &["new", "-o", path.to_str().unwrap(), "--rows", "2", "--force"],
        temp_dir.path(),
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(DocumentService::load(&path).unwrap().sheets[0].rows, 2);
}

#[test]
fn test_new_unknown_orientation_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chart.json");

    let output = run_stitchgrid(
        &["new", "-o", path.to_str().unwrap(), "--orientation", "sideways"],
        temp_dir.path(),
    );

    assert_eq!(output.status.code(), Some(3));
    assert!(!path.exists());
}

#[test]
fn test_inspect_json() {
    let (path, temp_dir) = create_temp_chart_file(&test_document_with_keys(5, 4));

    let output = run_stitchgrid(
        &["inspect", "--chart", path.to_str().unwrap(), "--json"],
        temp_dir.path(),
    );
    let result = stdout_json(&output);

    let sheet = &result["sheets"][0];
    assert_eq!(result["active_sheet"], sheet["id"]);
    assert_eq!(sheet["rows"], 5);
    assert_eq!(sheet["cols"], 4);
    assert_eq!(sheet["orientation"], "bottom-up");
    assert_eq!(sheet["layers"][0]["placements"], 2);
    assert_eq!(sheet["key_usage"][0]["key_id"], KEY_ID_KNIT_DEFAULT);
    assert_eq!(sheet["key_usage"][0]["count"], 15);

    let keys = result["keys"].as_array().unwrap();
    let cable = keys.iter().find(|k| k["id"] == CABLE).unwrap();
    assert_eq!(cable["width"], 2);
    assert_eq!(cable["abbreviation"], "C");
}

#[test]
fn test_inspect_plain() {
    let (path, temp_dir) = create_temp_chart_file(&test_document(3, 3));

    let output = run_stitchgrid(&["inspect", "-c", path.to_str().unwrap()], temp_dir.path());

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sheets (1), active: Sheet 1"));
    assert!(stdout.contains("Base Layer: 0 placements"));
    assert!(stdout.contains("Cable"));
}

#[test]
fn test_inspect_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.json");

    let output = run_stitchgrid(&["inspect", "-c", path.to_str().unwrap()], temp_dir.path());

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load chart"));
}

#[test]
fn test_show_json() {
    let (path, temp_dir) = create_temp_chart_file(&test_document_with_keys(4, 4));

    let output = run_stitchgrid(
        &["show", "-c", path.to_str().unwrap(), "--json"],
        temp_dir.path(),
    );
    let rows = stdout_json(&output);

    assert_eq!(rows.as_array().unwrap().len(), 4);
    assert_eq!(rows[0][0], KEY_ID_PURL_DEFAULT);
    assert_eq!(rows[2][2], CABLE);
    assert_eq!(rows[3][3], KEY_ID_KNIT_DEFAULT);
}

#[test]
fn test_show_plain_numbers_rows_bottom_up() {
    let (path, temp_dir) = create_temp_chart_file(&test_document_with_keys(3, 3));

    let output = run_stitchgrid(&["show", "-c", path.to_str().unwrap()], temp_dir.path());

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Sheet 1 (3x3)");
    assert!(lines[1].starts_with('P'));
    assert!(lines[1].ends_with("| 3"));
    assert!(lines[3].ends_with("| 1"));
}

#[test]
fn test_show_unknown_sheet() {
    let (path, temp_dir) = create_temp_chart_file(&test_document(2, 2));

    let output = run_stitchgrid(
        &["show", "-c", path.to_str().unwrap(), "--sheet", "Nope"],
        temp_dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_stitchgrid(&[], temp_dir.path());
    assert_eq!(output.status.code(), Some(3));
}
