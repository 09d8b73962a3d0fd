//! Chart document file I/O service.
//!
//! Documents are stored as JSON. Saving is strict; loading is lenient and
//! repairs whatever it can.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::constants::{
    INITIAL_COLS, INITIAL_ROWS, MAX_CHART_COLS, MAX_CHART_ROWS, MAX_KEY_HEIGHT, MAX_KEY_WIDTH,
};
use crate::models::chart::generate_sheet_id;
use crate::models::key::generate_key_id;
use crate::models::layer::generate_layer_id;
use crate::models::{
    CellContent, ChartState, Document, GridSize, KeyColor, KeyDefinition, KeyInstance,
    KeyPalette, Layer, LineSegment, Orientation,
};

/// Service for loading and saving chart documents.
pub struct DocumentService;

impl DocumentService {
    /// Loads a document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a chart document.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use stitchgrid::services::DocumentService;
    ///
    /// let document = DocumentService::load(Path::new("scarf.json"))?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<Document> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read chart file: {}", path.display()))?;
        parse_document(&content)
            .with_context(|| format!("Failed to load chart from {}", path.display()))
    }

    /// Saves a document to a JSON file.
    ///
    /// This performs an atomic write using a temp file + rename pattern to ensure
    /// the file is never left in a corrupted state.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization, I/O or rename failure.
    pub fn save(document: &Document, path: &Path) -> Result<()> {
        let content = document
            .to_json_string()
            .context("Failed to serialize chart document")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory: {}", parent.display())
            })?;
        }

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp file to: {}", path.display())
        })?;

        tracing::debug!(path = %path.display(), "Saved chart document");
        Ok(())
    }
}

/// Parses a document, substituting defaults for missing or malformed fields.
///
/// Ids are regenerated, sizes default to 1, colors to the light theme
/// defaults, and malformed cells, lines and placements are dropped. The
/// base stitch key is re-added if missing and every layer is compiled.
///
/// # Errors
///
/// Returns an error if the text is not JSON or lacks `sheets`,
/// `activeSheetId` or `keyPalette`.
pub fn parse_document(json: &str) -> Result<Document> {
    let root: Value = serde_json::from_str(json).context("Chart document is not valid JSON")?;
    let Some(root) = root.as_object() else {
        anyhow::bail!("Chart document must be a JSON object");
    };

    let Some(raw_sheets) = root.get("sheets").and_then(Value::as_array) else {
        anyhow::bail!("Invalid chart document: missing 'sheets'");
    };
    let Some(active_sheet_id) = root
        .get("activeSheetId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
    else {
        anyhow::bail!("Invalid chart document: missing 'activeSheetId'");
    };
    let Some(raw_palette) = root.get("keyPalette").and_then(Value::as_array) else {
        anyhow::bail!("Invalid chart document: missing 'keyPalette'");
    };

    let mut palette = KeyPalette::new(raw_palette.iter().filter_map(parse_key).collect());
    if palette.ensure_base_key() {
        tracing::warn!("Base stitch key was missing from the palette; restored it");
    }

    let mut sheets: Vec<ChartState> = raw_sheets
        .iter()
        .enumerate()
        .filter_map(|(index, value)| parse_sheet(index, value, &palette))
        .collect();
    if sheets.is_empty() {
        tracing::warn!("Chart document has no usable sheets; adding an empty one");
        sheets.push(ChartState::new(
            "Sheet 1",
            GridSize::new(INITIAL_ROWS, INITIAL_COLS),
        )?);
    }

    let active_sheet_id = if sheets.iter().any(|s| s.id == active_sheet_id) {
        active_sheet_id.to_string()
    } else {
        tracing::warn!(active_sheet_id, "Active sheet not found; selecting the first sheet");
        sheets[0].id.clone()
    };

    Ok(Document {
        sheets,
        active_sheet_id,
        key_palette: palette,
    })
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// A positive integer field; fractional values are truncated.
fn positive_int(object: &Map<String, Value>, field: &str) -> Option<u64> {
    let value = object.get(field)?;
    let number = value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite() && *f >= 1.0).map(|f| f as u64))?;
    (number > 0).then_some(number)
}

fn parse_key(value: &Value) -> Option<KeyDefinition> {
    let Some(object) = value.as_object() else {
        tracing::warn!("Skipping palette entry that is not an object");
        return None;
    };

    let mut clean = Map::new();
    let id = non_empty_str(object, "id").map_or_else(generate_key_id, str::to_string);
    clean.insert("id".into(), Value::from(id));
    if let Some(name) = non_empty_str(object, "name") {
        clean.insert("name".into(), Value::from(name));
    }
    if let Some(abbreviation) = object.get("abbreviation").and_then(Value::as_str) {
        clean.insert("abbreviation".into(), Value::from(abbreviation));
    }
    for field in ["width", "height"] {
        if let Some(size) = positive_int(object, field) {
            let limit = if field == "width" { MAX_KEY_WIDTH } else { MAX_KEY_HEIGHT };
            if size > u64::from(limit) {
                tracing::warn!(field, size, limit, "Key dimension exceeds the maximum; clamped");
            }
            // Oversized keys are shrunk when the definition is built.
            clean.insert(field.into(), Value::from(size.min(u64::from(u32::MAX))));
        }
    }
    for field in ["backgroundColor", "symbolColor"] {
        if let Some(color) = object
            .get(field)
            .and_then(Value::as_str)
            .filter(|c| KeyColor::parse(c).is_ok())
        {
            clean.insert(field.into(), Value::from(color));
        }
    }
    if let Some(rows) = object.get("cells").and_then(Value::as_array) {
        clean.insert("cells".into(), Value::Array(rows.iter().map(clean_cell_row).collect()));
    }
    if let Some(lines) = object.get("lines").and_then(Value::as_array) {
        let lines: Vec<Value> = lines
            .iter()
            .filter(|line| serde_json::from_value::<LineSegment>((*line).clone()).is_ok())
            .cloned()
            .collect();
        clean.insert("lines".into(), Value::Array(lines));
    }

    match serde_json::from_value::<KeyDefinition>(Value::Object(clean)) {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping unreadable key definition");
            None
        }
    }
}

fn clean_cell_row(row: &Value) -> Value {
    let Some(cells) = row.as_array() else {
        return Value::Array(vec![Value::Null]);
    };
    Value::Array(
        cells
            .iter()
            .map(|cell| {
                if serde_json::from_value::<CellContent>(cell.clone()).is_ok() {
                    cell.clone()
                } else {
                    Value::Null
                }
            })
            .collect(),
    )
}

fn parse_sheet(index: usize, value: &Value, palette: &KeyPalette) -> Option<ChartState> {
    let Some(object) = value.as_object() else {
        tracing::warn!(index, "Skipping sheet that is not an object");
        return None;
    };

    let rows = sheet_dimension(object, "rows", MAX_CHART_ROWS);
    let cols = sheet_dimension(object, "cols", MAX_CHART_COLS);
    let size = GridSize::new(rows, cols);

    let mut layers: Vec<Layer> = object
        .get("layers")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .enumerate()
                .filter_map(|(i, layer)| parse_layer(i, layer, size, palette))
                .collect()
        })
        .unwrap_or_default();
    if layers.is_empty() {
        layers.push(Layer::from_parts(
            generate_layer_id(),
            "Base Layer".to_string(),
            true,
            Vec::new(),
            size,
            palette,
        ));
    }

    let active_layer_id = non_empty_str(object, "activeLayerId")
        .filter(|id| layers.iter().any(|l| l.id == *id))
        .map(str::to_string)
        .or_else(|| layers.first().map(|l| l.id.clone()));

    Some(ChartState {
        id: non_empty_str(object, "id").map_or_else(generate_sheet_id, str::to_string),
        name: non_empty_str(object, "name")
            .map_or_else(|| format!("Sheet {}", index + 1), str::to_string),
        rows,
        cols,
        orientation: object
            .get("orientation")
            .and_then(Value::as_str)
            .and_then(Orientation::parse)
            .unwrap_or_default(),
        layers,
        active_layer_id,
    })
}

/// A sheet dimension in `[1, max]`, defaulting to 1.
fn sheet_dimension(object: &Map<String, Value>, field: &str, max: usize) -> usize {
    let value = positive_int(object, field).map_or(1, |n| usize::try_from(n).unwrap_or(usize::MAX));
    if value > max {
        tracing::warn!(field, value, max, "Sheet dimension exceeds the maximum; clamped");
    }
    value.min(max)
}

fn parse_layer(index: usize, value: &Value, size: GridSize, palette: &KeyPalette) -> Option<Layer> {
    let Some(object) = value.as_object() else {
        tracing::warn!(index, "Skipping layer that is not an object");
        return None;
    };

    let placements: Vec<KeyInstance> = object
        .get("keyPlacements")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .filter_map(|p| serde_json::from_value::<KeyInstance>(p.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    Some(Layer::from_parts(
        non_empty_str(object, "id").map_or_else(generate_layer_id, str::to_string),
        non_empty_str(object, "name").map_or_else(|| format!("Layer {}", index + 1), str::to_string),
        object
            .get("isVisible")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        placements,
        size,
        palette,
    ))
}
