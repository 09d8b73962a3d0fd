//! Chart sheets: dimensions plus a stack of layers.

use crate::constants::KEY_ID_EMPTY;
use crate::models::{ChartCell, GridSize, KeyDefinition, KeyPalette, Layer};
use crate::services::structure;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction in which chart rows are worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Flat knitting read from the bottom row up
    #[default]
    BottomUp,
    /// Read from the top row down
    TopDown,
    /// Read left to right
    LeftRight,
    /// Circular knitting, every row read right to left
    InTheRound,
}

impl Orientation {
    /// Parses the persisted kebab-case form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bottom-up" => Some(Self::BottomUp),
            "top-down" => Some(Self::TopDown),
            "left-right" => Some(Self::LeftRight),
            "in-the-round" => Some(Self::InTheRound),
            _ => None,
        }
    }
}

/// Generates a new unique sheet ID
pub fn generate_sheet_id() -> String {
    format!("sheet_{}", Uuid::new_v4())
}

/// One chart sheet of a document.
///
/// # Validation
///
/// - Name must be non-empty, max 100 characters
/// - At least one row, one column and one layer
/// - Every layer's grid is compiled to `rows × cols`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartState {
    /// Unique identifier for this sheet
    #[serde(default = "generate_sheet_id")]
    pub id: String,
    /// Sheet name shown in the sheet list
    pub name: String,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// Working direction
    #[serde(default)]
    pub orientation: Orientation,
    /// Layers, bottom first
    pub layers: Vec<Layer>,
    /// Layer that edits go to
    pub active_layer_id: Option<String>,
}

/// How often a key appears across the visible layers of a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyUsage {
    /// Key id
    pub key_id: String,
    /// Number of cells showing the key
    pub count: usize,
}

impl ChartState {
    /// Creates a sheet with a single empty "Base Layer".
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or either dimension is zero.
    pub fn new(name: impl Into<String>, size: GridSize) -> Result<Self> {
        let name = name.into();
        Self::validate_name(&name)?;
        if size.rows == 0 || size.cols == 0 {
            anyhow::bail!(
                "Chart must have at least one row and one column (got {}x{})",
                size.rows,
                size.cols
            );
        }

        let base = Layer::new("Base Layer", size)?;
        Ok(Self {
            id: generate_sheet_id(),
            name,
            rows: size.rows,
            cols: size.cols,
            orientation: Orientation::default(),
            active_layer_id: Some(base.id.clone()),
            layers: vec![base],
        })
    }

    pub(crate) fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            anyhow::bail!("Sheet name cannot be empty");
        }
        if name.len() > 100 {
            anyhow::bail!(
                "Sheet name '{}' exceeds maximum length of 100 characters (got {})",
                name,
                name.len()
            );
        }
        Ok(())
    }

    /// Sheet dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        GridSize::new(self.rows, self.cols)
    }

    /// Looks up a layer by id.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Looks up a layer by id for editing.
    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Looks up a layer by name (case-insensitive).
    #[must_use]
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// The layer edits go to, falling back to the first layer.
    #[must_use]
    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer_id
            .as_deref()
            .and_then(|id| self.layer(id))
            .or_else(|| self.layers.first())
    }

    /// Mutable access to the active layer.
    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let index = self
            .active_layer_id
            .as_deref()
            .and_then(|id| self.layers.iter().position(|l| l.id == id))
            .unwrap_or(0);
        self.layers.get_mut(index)
    }

    /// Appends a new empty layer named "Layer N" and makes it active.
    ///
    /// Returns the new layer's id.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer cannot be created.
    pub fn add_layer(&mut self) -> Result<String> {
        let mut counter = self.layers.len() + 1;
        let mut name = format!("Layer {counter}");
        while self.layers.iter().any(|l| l.name == name) {
            counter += 1;
            name = format!("Layer {counter}");
        }

        let layer = Layer::new(name, self.size())?;
        let id = layer.id.clone();
        self.layers.push(layer);
        self.active_layer_id = Some(id.clone());
        Ok(id)
    }

    /// Removes a layer.
    ///
    /// # Errors
    ///
    /// Returns an error for the last remaining layer or an unknown id.
    pub fn remove_layer(&mut self, id: &str) -> Result<()> {
        if self.layers.len() <= 1 {
            anyhow::bail!("Cannot delete the last layer");
        }
        let Some(position) = self.layers.iter().position(|l| l.id == id) else {
            anyhow::bail!("Layer '{}' not found in sheet '{}'", id, self.name);
        };
        self.layers.remove(position);
        if self.active_layer_id.as_deref() == Some(id) {
            self.active_layer_id = self.layers.first().map(|l| l.id.clone());
        }
        Ok(())
    }

    /// Toggles a layer's visibility; `false` if the layer does not exist.
    pub fn toggle_layer_visibility(&mut self, id: &str) -> bool {
        self.layer_mut(id).map(Layer::toggle_visibility).is_some()
    }

    /// Makes a layer the target of edits.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer does not exist.
    pub fn select_layer(&mut self, id: &str) -> Result<()> {
        if self.layer(id).is_none() {
            anyhow::bail!("Layer '{}' not found in sheet '{}'", id, self.name);
        }
        self.active_layer_id = Some(id.to_string());
        Ok(())
    }

    /// Recompiles every layer against the current size and palette.
    pub fn recompile_all(&mut self, palette: &KeyPalette) {
        let size = self.size();
        for layer in &mut self.layers {
            layer.recompile(size, palette);
        }
    }

    /// Inserts a row at `index` (`0..=rows`) in every layer.
    pub fn insert_row(&mut self, index: usize, palette: &KeyPalette) -> bool {
        if index > self.rows {
            tracing::debug!(index, rows = self.rows, "Row insert index out of range");
            return false;
        }
        let new_size = GridSize::new(self.rows + 1, self.cols);
        let cols = self.cols;
        for layer in &mut self.layers {
            let placements = structure::insert_row(layer.placements(), index, layer.grid(), cols);
            layer.set_placements(placements, new_size, palette);
        }
        self.rows = new_size.rows;
        true
    }

    /// Deletes row `index` from every layer. The last row cannot be deleted.
    pub fn delete_row(&mut self, index: usize, palette: &KeyPalette) -> bool {
        if self.rows <= 1 || index >= self.rows {
            tracing::debug!(index, rows = self.rows, "Row delete rejected");
            return false;
        }
        let new_size = GridSize::new(self.rows - 1, self.cols);
        for layer in &mut self.layers {
            let placements = structure::delete_row(layer.placements(), index, palette);
            layer.set_placements(placements, new_size, palette);
        }
        self.rows = new_size.rows;
        true
    }

    /// Inserts a column at `index` (`0..=cols`) in every layer.
    pub fn insert_col(&mut self, index: usize, palette: &KeyPalette) -> bool {
        if index > self.cols {
            tracing::debug!(index, cols = self.cols, "Column insert index out of range");
            return false;
        }
        let new_size = GridSize::new(self.rows, self.cols + 1);
        let rows = self.rows;
        for layer in &mut self.layers {
            let placements = structure::insert_col(layer.placements(), index, layer.grid(), rows);
            layer.set_placements(placements, new_size, palette);
        }
        self.cols = new_size.cols;
        true
    }

    /// Deletes column `index` from every layer. The last column cannot be deleted.
    pub fn delete_col(&mut self, index: usize, palette: &KeyPalette) -> bool {
        if self.cols <= 1 || index >= self.cols {
            tracing::debug!(index, cols = self.cols, "Column delete rejected");
            return false;
        }
        let new_size = GridSize::new(self.rows, self.cols - 1);
        for layer in &mut self.layers {
            let placements = structure::delete_col(layer.placements(), index, palette);
            layer.set_placements(placements, new_size, palette);
        }
        self.cols = new_size.cols;
        true
    }

    /// Resizes the sheet, dropping placements anchored outside the new bounds.
    pub fn resize(&mut self, size: GridSize, palette: &KeyPalette) -> bool {
        if size.rows == 0 || size.cols == 0 {
            tracing::debug!(?size, "Resize to an empty chart rejected");
            return false;
        }
        for layer in &mut self.layers {
            let placements = structure::resize_placements(layer.placements(), palette, size);
            layer.set_placements(placements, size, palette);
        }
        self.rows = size.rows;
        self.cols = size.cols;
        true
    }

    /// The cell a flattened view shows at `(row, col)`.
    ///
    /// Layers are stacked bottom to top. The top-most visible layer whose
    /// cell is not the untouched base stitch wins; otherwise the lowest
    /// visible layer's cell is shown. `None` when no layer is visible or
    /// the position is out of bounds.
    #[must_use]
    pub fn resolve_cell(&self, row: usize, col: usize) -> Option<&ChartCell> {
        let base = ChartCell::base();
        let bottom = self
            .layers
            .iter()
            .find(|l| l.is_visible)?
            .grid()
            .cell(row, col)?;
        Some(
            self.layers
                .iter()
                .rev()
                .filter(|l| l.is_visible)
                .filter_map(|l| l.grid().cell(row, col))
                .find(|cell| **cell != base)
                .unwrap_or(bottom),
        )
    }

    /// Key usage across visible layers, most used first.
    ///
    /// The "no stitch" key and keys missing from the palette are not counted.
    #[must_use]
    pub fn key_usage(&self, palette: &KeyPalette) -> Vec<KeyUsage> {
        let mut counts: Vec<KeyUsage> = Vec::new();
        for layer in self.layers.iter().filter(|l| l.is_visible) {
            for cell in layer.grid().iter_rows().flatten() {
                if cell.key_id == KEY_ID_EMPTY || !palette.contains(&cell.key_id) {
                    continue;
                }
                match counts.iter_mut().find(|u| u.key_id == cell.key_id) {
                    Some(usage) => usage.count += 1,
                    None => counts.push(KeyUsage {
                        key_id: cell.key_id.clone(),
                        count: 1,
                    }),
                }
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// Definitions of the keys shown in a row of the flattened view.
    pub fn row_keys<'a>(
        &'a self,
        row: usize,
        palette: &'a KeyPalette,
    ) -> impl Iterator<Item = Option<&'a KeyDefinition>> + 'a {
        (0..self.cols).map(move |col| {
            self.resolve_cell(row, col)
                .and_then(|cell| palette.get(&cell.key_id))
        })
    }
}
