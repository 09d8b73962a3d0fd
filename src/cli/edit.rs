//! Editing commands: key placement and row/column structure.

use crate::cli::common::{
    load_document, print_json, save_document, select_target, CliError, CliResult,
};
use crate::config::Config;
use crate::editor::ChartEditor;
use crate::models::Point;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Opens an editing session on a chart file targeting the given sheet and layer.
pub(crate) fn open_editor(
    chart: &Path,
    sheet: Option<&str>,
    layer: Option<&str>,
) -> CliResult<ChartEditor> {
    let mut document = load_document(chart)?;
    select_target(&mut document, sheet, layer)?;
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {e:#}");
        Config::default()
    });
    Ok(ChartEditor::new(document, config))
}

/// Result of an editing command
#[derive(Debug, Serialize)]
pub(crate) struct EditResponse {
    pub changed: bool,
    pub rows: usize,
    pub cols: usize,
}

impl EditResponse {
    pub(crate) fn of(editor: &ChartEditor, changed: bool) -> Self {
        let (rows, cols) = editor
            .document()
            .active_sheet()
            .map_or((0, 0), |s| (s.rows, s.cols));
        Self {
            changed,
            rows,
            cols,
        }
    }
}

/// Saves the session's document when it changed and reports the outcome.
pub(crate) fn finish(
    editor: &ChartEditor,
    chart: &Path,
    changed: bool,
    json: bool,
    message: &str,
) -> CliResult<()> {
    if changed {
        save_document(editor.document(), chart)?;
    }
    let response = EditResponse::of(editor, changed);
    if json {
        return print_json(&response);
    }
    if changed {
        println!("{message} ({}x{})", response.rows, response.cols);
    } else {
        println!("No change");
    }
    Ok(())
}

/// Place a key on the chart
#[derive(Debug, Clone, Args)]
pub struct PlaceArgs {
    /// Path to chart file
    #[arg(short, long, value_name = "FILE")]
    pub chart: PathBuf,

    /// Id of the key to place
    #[arg(short, long)]
    pub key: String,

    /// Row of the key's top-left cell
    #[arg(long)]
    pub row: u32,

    /// Column of the key's top-left cell
    #[arg(long)]
    pub col: u32,

    /// Sheet name (defaults to the active sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Layer name (defaults to the active layer)
    #[arg(long)]
    pub layer: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PlaceArgs {
    /// Execute the place command
    pub fn execute(&self) -> CliResult<()> {
        let mut editor = open_editor(&self.chart, self.sheet.as_deref(), self.layer.as_deref())?;
        editor
            .set_active_key(&self.key)
            .map_err(|e| CliError::validation(e.to_string()))?;

        let anchor = Point::at(coordinate(self.row)?, coordinate(self.col)?);
        let changed = editor
            .paint(anchor)
            .map_err(|e| CliError::validation(e.to_string()))?;
        finish(
            &editor,
            &self.chart,
            changed,
            self.json,
            &format!("Placed {} at {},{}", self.key, self.row, self.col),
        )
    }
}

fn coordinate(value: u32) -> CliResult<i32> {
    i32::try_from(value).map_err(|_| CliError::usage(format!("Coordinate {value} is too large")))
}

/// Structural edit applied by a [`StructureArgs`] command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureOp {
    /// Insert a row before the index
    InsertRow,
    /// Delete the row at the index
    DeleteRow,
    /// Insert a column before the index
    InsertCol,
    /// Delete the column at the index
    DeleteCol,
}

/// Insert or delete a row or column
#[derive(Debug, Clone, Args)]
pub struct StructureArgs {
    /// Path to chart file
    #[arg(short, long, value_name = "FILE")]
    pub chart: PathBuf,

    /// Row or column index
    #[arg(short, long)]
    pub index: usize,

    /// Sheet name (defaults to the active sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StructureArgs {
    /// Execute a structural command
    pub fn execute(&self, op: StructureOp) -> CliResult<()> {
        let mut editor = open_editor(&self.chart, self.sheet.as_deref(), None)?;
        let index = self.index;
        let (result, message) = match op {
            StructureOp::InsertRow => (editor.insert_row(index), format!("Inserted row {index}")),
            StructureOp::DeleteRow => (editor.delete_row(index), format!("Deleted row {index}")),
            StructureOp::InsertCol => {
                (editor.insert_col(index), format!("Inserted column {index}"))
            }
            StructureOp::DeleteCol => {
                (editor.delete_col(index), format!("Deleted column {index}"))
            }
        };
        let changed = result.map_err(|e| CliError::validation(e.to_string()))?;
        if !changed {
            return Err(CliError::validation(format!(
                "Index {index} is out of range or the last row/column cannot be removed"
            )));
        }
        finish(&editor, &self.chart, changed, self.json, &message)
    }
}

/// Resize a sheet
#[derive(Debug, Clone, Args)]
pub struct ResizeArgs {
    /// Path to chart file
    #[arg(short, long, value_name = "FILE")]
    pub chart: PathBuf,

    /// New number of rows
    #[arg(long)]
    pub rows: usize,

    /// New number of columns
    #[arg(long)]
    pub cols: usize,

    /// Sheet name (defaults to the active sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResizeArgs {
    /// Execute the resize command
    pub fn execute(&self) -> CliResult<()> {
        let mut editor = open_editor(&self.chart, self.sheet.as_deref(), None)?;
        let changed = editor
            .resize(self.rows, self.cols)
            .map_err(|e| CliError::validation(e.to_string()))?;
        finish(&editor, &self.chart, changed, self.json, "Resized chart")
    }
}
