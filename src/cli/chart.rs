//! Chart file commands: create, inspect and print charts.

use crate::cli::common::{load_document, print_json, save_document, CliError, CliResult};
use crate::config::Config;
use crate::constants::KEY_ID_EMPTY;
use crate::models::{ChartState, Document, KeyPalette, Orientation};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Create a new chart file
#[derive(Debug, Clone, Args)]
pub struct NewArgs {
    /// Path of the chart file to create
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Number of rows (defaults to the configured size)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Number of columns (defaults to the configured size)
    #[arg(long)]
    pub cols: Option<usize>,

    /// Name of the first sheet
    #[arg(long)]
    pub name: Option<String>,

    /// Working direction: bottom-up, top-down, left-right or in-the-round
    #[arg(long)]
    pub orientation: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl NewArgs {
    /// Execute the new command
    pub fn execute(&self) -> CliResult<()> {
        if self.output.exists() && !self.force {
            return Err(CliError::validation(format!(
                "File already exists: {} (use --force to overwrite)",
                self.output.display()
            )));
        }

        let config = Config::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {e:#}");
            Config::default()
        });
        let size = config.clamp_chart_size(
            self.rows.unwrap_or(config.chart.default_rows),
            self.cols.unwrap_or(config.chart.default_cols),
        );

        let mut document =
            Document::new(size).map_err(|e| CliError::validation(e.to_string()))?;
        if let Some(sheet) = document.active_sheet_mut() {
            if let Some(value) = &self.orientation {
                sheet.orientation = Orientation::parse(value).ok_or_else(|| {
                    CliError::usage(format!("Unknown orientation '{value}'"))
                })?;
            }
        }
        if let Some(name) = &self.name {
            let id = document.active_sheet_id.clone();
            document
                .rename_sheet(&id, name.clone())
                .map_err(|e| CliError::validation(e.to_string()))?;
        }

        save_document(&document, &self.output)?;
        println!(
            "Created {}x{} chart: {}",
            size.rows,
            size.cols,
            self.output.display()
        );
        Ok(())
    }
}

/// Show a summary of a chart file
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Path to chart file
    #[arg(short, long, value_name = "FILE")]
    pub chart: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for inspect
#[derive(Debug, Serialize)]
struct InspectResponse {
    active_sheet: String,
    sheets: Vec<SheetSummary>,
    keys: Vec<KeySummary>,
}

#[derive(Debug, Serialize)]
struct SheetSummary {
    id: String,
    name: String,
    rows: usize,
    cols: usize,
    orientation: Orientation,
    layers: Vec<LayerSummary>,
    key_usage: Vec<UsageSummary>,
}

#[derive(Debug, Serialize)]
struct LayerSummary {
    name: String,
    visible: bool,
    placements: usize,
}

#[derive(Debug, Serialize)]
struct UsageSummary {
    key_id: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct KeySummary {
    id: String,
    name: String,
    width: u32,
    height: u32,
    abbreviation: Option<String>,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> CliResult<()> {
        let document = load_document(&self.chart)?;
        let response = summarize(&document);

        if self.json {
            return print_json(&response);
        }

        let active = document.active_sheet().map_or("", |s| s.name.as_str());
        println!("Sheets ({}), active: {}", response.sheets.len(), active);
        for sheet in &response.sheets {
            println!(
                "  {} ({}x{}, {:?})",
                sheet.name, sheet.rows, sheet.cols, sheet.orientation
            );
            for layer in &sheet.layers {
                let hidden = if layer.visible { "" } else { " [hidden]" };
                println!(
                    "    {}: {} placements{}",
                    layer.name, layer.placements, hidden
                );
            }
        }

        println!("\nKeys ({}):", response.keys.len());
        for key in &response.keys {
            println!(
                "  {:<24} {}x{}  {}  ({})",
                key.name,
                key.width,
                key.height,
                key.abbreviation.as_deref().unwrap_or("-"),
                key.id
            );
        }
        Ok(())
    }
}

fn summarize(document: &Document) -> InspectResponse {
    let palette = &document.key_palette;
    let sheets = document
        .sheets
        .iter()
        .map(|sheet| SheetSummary {
            id: sheet.id.clone(),
            name: sheet.name.clone(),
            rows: sheet.rows,
            cols: sheet.cols,
            orientation: sheet.orientation,
            layers: sheet
                .layers
                .iter()
                .map(|layer| LayerSummary {
                    name: layer.name.clone(),
                    visible: layer.is_visible,
                    placements: layer.placements().len(),
                })
                .collect(),
            key_usage: sheet
                .key_usage(palette)
                .into_iter()
                .map(|u| UsageSummary {
                    key_id: u.key_id,
                    count: u.count,
                })
                .collect(),
        })
        .collect();

    InspectResponse {
        active_sheet: document
            .active_sheet()
            .map(|s| s.id.clone())
            .unwrap_or_default(),
        sheets,
        keys: palette
            .iter()
            .map(|key| KeySummary {
                id: key.id.clone(),
                name: key.name.clone(),
                width: key.width,
                height: key.height,
                abbreviation: key.instruction_abbreviation(),
            })
            .collect(),
    }
}

/// Print the flattened grid of a sheet
#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Path to chart file
    #[arg(short, long, value_name = "FILE")]
    pub chart: PathBuf,

    /// Sheet name (defaults to the active sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Output the key ids as a JSON array of rows
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    /// Execute the show command
    pub fn execute(&self) -> CliResult<()> {
        let document = load_document(&self.chart)?;
        let sheet = match &self.sheet {
            Some(name) => document
                .sheet_by_name(name)
                .ok_or_else(|| CliError::validation(format!("Sheet '{name}' not found")))?,
            None => document
                .active_sheet()
                .ok_or_else(|| CliError::validation("Chart has no sheets"))?,
        };

        if self.json {
            let rows: Vec<Vec<Option<&str>>> = (0..sheet.rows)
                .map(|row| {
                    (0..sheet.cols)
                        .map(|col| sheet.resolve_cell(row, col).map(|c| c.key_id.as_str()))
                        .collect()
                })
                .collect();
            return print_json(&rows);
        }

        println!("{} ({}x{})", sheet.name, sheet.rows, sheet.cols);
        for line in render_rows(sheet, &document.key_palette) {
            println!("{line}");
        }
        Ok(())
    }
}

/// Text rows of a sheet, top row first, each labelled with its working row number.
fn render_rows(sheet: &ChartState, palette: &KeyPalette) -> Vec<String> {
    let labels: Vec<Vec<String>> = (0..sheet.rows)
        .map(|row| {
            sheet
                .row_keys(row, palette)
                .map(|key| match key {
                    Some(key) if key.id == KEY_ID_EMPTY => ".".to_string(),
                    Some(key) => key.instruction_abbreviation().unwrap_or_else(|| "-".into()),
                    None => "?".to_string(),
                })
                .collect()
        })
        .collect();
    let width = labels
        .iter()
        .flatten()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(1);

    labels
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let number = match sheet.orientation {
                Orientation::TopDown | Orientation::LeftRight => row + 1,
                Orientation::BottomUp | Orientation::InTheRound => sheet.rows - row,
            };
            let body: Vec<String> = cells.iter().map(|s| format!("{s:<width$}")).collect();
            format!("{} | {number}", body.join(" "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KEY_ID_PURL_DEFAULT;
    use crate::models::{GridSize, Point};

    #[test]
    fn test_render_rows() {
        let mut document = Document::new(GridSize::new(2, 3)).unwrap();
        let (sheet, palette) = document.active_sheet_and_palette().unwrap();
        let size = sheet.size();
        let layer = sheet.active_layer_mut().unwrap();
        layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(0, 1), size, palette);
        layer.apply_key(KEY_ID_EMPTY, Point::at(1, 2), size, palette);

        let sheet = document.active_sheet().unwrap();
        let rows = render_rows(sheet, &document.key_palette);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with("| 2"));
        assert!(rows[1].contains('.'));
        assert!(rows[1].ends_with("| 1"));
    }

    #[test]
    fn test_summarize() {
        let document = Document::new(GridSize::new(4, 5)).unwrap();
        let summary = summarize(&document);
        assert_eq!(summary.sheets.len(), 1);
        assert_eq!(summary.sheets[0].cols, 5);
        assert_eq!(summary.sheets[0].layers[0].name, "Base Layer");
        assert_eq!(summary.keys.len(), 3);
        assert_eq!(summary.active_sheet, document.active_sheet_id);
    }
}
