//! Shared test fixtures for chart integration and E2E CLI tests.
#![allow(dead_code)] // Each test binary uses a different subset

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use stitchgrid::models::{
    CellContent, Document, GridSize, KeyDefinition, KeyPalette, Layer, Point,
};
use stitchgrid::services::DocumentService;
use tempfile::TempDir;

/// Id of the 2x2 cable key added by [`test_palette`].
pub const CABLE: &str = "key_cable_2x2";

/// Id of the 3x1 key added by [`test_palette`].
pub const WIDE: &str = "key_wide_3x1";

/// The built-in palette plus a 2x2 cable and a 3x1 wide key.
pub fn test_palette() -> KeyPalette {
    let mut palette = KeyPalette::initial();
    palette.add_or_update(
        KeyDefinition::new(CABLE, "Cable")
            .with_size(2, 2)
            .with_cell(0, 0, CellContent::Text("C".to_string())),
    );
    palette.add_or_update(KeyDefinition::new(WIDE, "Wide").with_size(3, 1));
    palette
}

/// An empty base layer of the given size.
pub fn test_layer(rows: usize, cols: usize) -> Layer {
    Layer::new("Base Layer", GridSize::new(rows, cols)).expect("Failed to create layer")
}

/// A single-sheet document using [`test_palette`].
pub fn test_document(rows: usize, cols: usize) -> Document {
    let mut document = Document::new(GridSize::new(rows, cols)).expect("Failed to create document");
    for key in test_palette().iter() {
        document.upsert_key(key.clone());
    }
    document
}

/// A document with a cable at (1,1) and a purl at (0,0).
pub fn test_document_with_keys(rows: usize, cols: usize) -> Document {
    let mut document = test_document(rows, cols);
    let (sheet, palette) = document
        .active_sheet_and_palette()
        .expect("Document has no sheets");
    let size = sheet.size();
    let layer = sheet.active_layer_mut().expect("Sheet has no layers");
    layer.apply_key(CABLE, Point::at(1, 1), size, palette);
    layer.apply_key(
        stitchgrid::constants::KEY_ID_PURL_DEFAULT,
        Point::at(0, 0),
        size,
        palette,
    );
    document
}

/// Writes a document into a fresh temp directory and returns its path.
pub fn create_temp_chart_file(document: &Document) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let chart_path = temp_dir.path().join("chart.json");
    DocumentService::save(document, &chart_path).expect("Failed to write chart file");
    (chart_path, temp_dir)
}

/// Key id of a compiled cell in the active layer of the active sheet.
pub fn key_at(document: &Document, row: usize, col: usize) -> String {
    document
        .active_sheet()
        .and_then(|s| s.active_layer())
        .and_then(|l| l.grid().cell(row, col))
        .map(|c| c.key_id.clone())
        .expect("Cell out of bounds")
}

/// Path to the stitchgrid binary
pub fn stitchgrid_bin() -> &'static str {
    env!("CARGO_BIN_EXE_stitchgrid")
}

/// Runs the binary with an isolated config directory.
pub fn run_stitchgrid(args: &[&str], config_home: &Path) -> Output {
    Command::new(stitchgrid_bin())
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}
