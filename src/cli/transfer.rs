//! Region transfer commands: copy a region out of a chart, paste it back in.

use crate::cli::common::{load_document, parse_cell, select_target, CliError, CliResult};
use crate::cli::edit::{finish, open_editor};
use crate::clipboard::{ClipboardData, SystemClipboard};
use crate::models::{Point, SelectionRect};
use crate::services::transfer;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Copy a rectangular region as clipboard JSON
#[derive(Debug, Clone, Args)]
pub struct CopyArgs {
    /// Path to chart file
    #[arg(short, long, value_name = "FILE")]
    pub chart: PathBuf,

    /// First corner as ROW,COL
    #[arg(long, value_name = "ROW,COL")]
    pub from: String,

    /// Opposite corner as ROW,COL
    #[arg(long, value_name = "ROW,COL")]
    pub to: String,

    /// Write the clipboard JSON to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also place the region on the system clipboard
    #[arg(long)]
    pub system: bool,

    /// Sheet name (defaults to the active sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Layer name (defaults to the active layer)
    #[arg(long)]
    pub layer: Option<String>,
}

impl CopyArgs {
    /// Execute the copy command
    pub fn execute(&self) -> CliResult<()> {
        let mut document = load_document(&self.chart)?;
        select_target(&mut document, self.sheet.as_deref(), self.layer.as_deref())?;

        let rect = SelectionRect::new(parse_cell(&self.from)?, parse_cell(&self.to)?);
        let sheet = document
            .active_sheet()
            .ok_or_else(|| CliError::validation("Chart has no sheets"))?;
        let rect = rect.clamped(sheet.size()).ok_or_else(|| {
            CliError::validation(format!(
                "Region {}..{} lies outside the {}x{} chart",
                self.from, self.to, sheet.rows, sheet.cols
            ))
        })?;
        let layer = sheet
            .active_layer()
            .ok_or_else(|| CliError::validation("Sheet has no layers"))?;

        let data = transfer::capture(layer, &rect, &document.key_palette);
        let text = data
            .to_json()
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        if self.system {
            SystemClipboard::write(&data).map_err(|e| CliError::io(format!("{e:#}")))?;
        }

        match &self.output {
            Some(path) => {
                fs::write(path, text).map_err(|e| {
                    CliError::io(format!("Failed to write {}: {e}", path.display()))
                })?;
                println!(
                    "Copied {}x{} region ({} keys) to {}",
                    data.width,
                    data.height,
                    data.relative_key_instances.len(),
                    path.display()
                );
            }
            None => println!("{text}"),
        }
        Ok(())
    }
}

/// Paste clipboard JSON into a chart
#[derive(Debug, Clone, Args)]
pub struct PasteArgs {
    /// Path to chart file
    #[arg(short, long, value_name = "FILE")]
    pub chart: PathBuf,

    /// Clipboard JSON file (reads the system clipboard when omitted)
    #[arg(long, value_name = "FILE")]
    pub clipboard: Option<PathBuf>,

    /// Row of the paste origin (ignored with --into)
    #[arg(long, default_value_t = 0)]
    pub row: u32,

    /// Column of the paste origin (ignored with --into)
    #[arg(long, default_value_t = 0)]
    pub col: u32,

    /// Paste into this ROW,COL:ROW,COL selection, clearing it first
    #[arg(long, value_name = "ROW,COL:ROW,COL")]
    pub into: Option<String>,

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

impl PasteArgs {
    /// Execute the paste command
    pub fn execute(&self) -> CliResult<()> {
        let data = match &self.clipboard {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    CliError::io(format!("Failed to read {}: {e}", path.display()))
                })?;
                ClipboardData::from_json(&text).map_err(|e| CliError::validation(format!("{e:#}")))?
            }
            None => SystemClipboard::read().map_err(|e| CliError::io(format!("{e:#}")))?,
        };
        let selection = self.into.as_deref().map(parse_selection).transpose()?;

        let origin = Point::at(
            i32::try_from(self.row).map_err(|_| CliError::usage("Row is too large"))?,
            i32::try_from(self.col).map_err(|_| CliError::usage("Column is too large"))?,
        );

        let mut editor = open_editor(&self.chart, self.sheet.as_deref(), self.layer.as_deref())?;
        let changed = editor
            .paste_data(&data, origin, selection)
            .map_err(|e| CliError::validation(e.to_string()))?;

        finish(
            &editor,
            &self.chart,
            changed,
            self.json,
            &format!("Pasted {}x{} region", data.width, data.height),
        )
    }
}

/// Parses `ROW,COL:ROW,COL`.
fn parse_selection(value: &str) -> CliResult<SelectionRect> {
    let (start, end) = value.split_once(':').ok_or_else(|| {
        CliError::usage(format!(
            "Invalid selection '{value}', expected ROW,COL:ROW,COL"
        ))
    })?;
    Ok(SelectionRect::new(parse_cell(start)?, parse_cell(end)?))
}
