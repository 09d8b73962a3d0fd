//! The whole editable document: sheets sharing one key palette.

use crate::models::{ChartState, GridSize, KeyDefinition, KeyPalette};
use crate::services::documents;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Every sheet of a chart file plus the key palette they share.
///
/// # Validation
///
/// - At least one sheet
/// - `active_sheet_id` names an existing sheet
/// - The palette always contains the base stitch key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Chart sheets in display order
    pub sheets: Vec<ChartState>,
    /// Sheet that edits go to
    pub active_sheet_id: String,
    /// Keys available to every sheet
    pub key_palette: KeyPalette,
}

impl Document {
    /// Creates a document with one empty sheet and the built-in palette.
    ///
    /// # Errors
    ///
    /// Returns an error if the size has a zero dimension.
    pub fn new(size: GridSize) -> Result<Self> {
        let sheet = ChartState::new("Sheet 1", size)?;
        Ok(Self {
            active_sheet_id: sheet.id.clone(),
            sheets: vec![sheet],
            key_palette: KeyPalette::initial(),
        })
    }

    /// Parses a saved document, repairing missing or malformed fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or lacks the sheets,
    /// active sheet or palette entirely.
    pub fn from_json_str(json: &str) -> Result<Self> {
        documents::parse_document(json)
    }

    /// Serializes the document. Compiled grids are not written.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Looks up a sheet by id.
    #[must_use]
    pub fn sheet(&self, id: &str) -> Option<&ChartState> {
        self.sheets.iter().find(|s| s.id == id)
    }

    /// Looks up a sheet by name (case-insensitive).
    #[must_use]
    pub fn sheet_by_name(&self, name: &str) -> Option<&ChartState> {
        self.sheets.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// The sheet edits go to, falling back to the first sheet.
    #[must_use]
    pub fn active_sheet(&self) -> Option<&ChartState> {
        self.sheet(&self.active_sheet_id).or_else(|| self.sheets.first())
    }

    /// Mutable access to the active sheet.
    pub fn active_sheet_mut(&mut self) -> Option<&mut ChartState> {
        let index = self
            .sheets
            .iter()
            .position(|s| s.id == self.active_sheet_id)
            .unwrap_or(0);
        self.sheets.get_mut(index)
    }

    /// Splits the document into the active sheet and the palette so a
    /// layer can be edited against the palette.
    pub fn active_sheet_and_palette(&mut self) -> Option<(&mut ChartState, &KeyPalette)> {
        let index = self
            .sheets
            .iter()
            .position(|s| s.id == self.active_sheet_id)
            .unwrap_or(0);
        let palette = &self.key_palette;
        self.sheets.get_mut(index).map(|sheet| (sheet, palette))
    }

    /// Appends a sheet named "Sheet N" and makes it active.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet cannot be created.
    pub fn add_sheet(&mut self, size: GridSize) -> Result<String> {
        let mut counter = 1;
        let mut name = "Sheet 1".to_string();
        while self.sheets.iter().any(|s| s.name == name) {
            counter += 1;
            name = format!("Sheet {counter}");
        }

        let sheet = ChartState::new(name, size)?;
        let id = sheet.id.clone();
        self.sheets.push(sheet);
        self.active_sheet_id = id.clone();
        Ok(id)
    }

    /// Removes a sheet.
    ///
    /// # Errors
    ///
    /// Returns an error for the last remaining sheet or an unknown id.
    pub fn remove_sheet(&mut self, id: &str) -> Result<()> {
        if self.sheets.len() <= 1 {
            anyhow::bail!("Cannot delete the last sheet");
        }
        let Some(position) = self.sheets.iter().position(|s| s.id == id) else {
            anyhow::bail!("Sheet '{}' not found", id);
        };
        self.sheets.remove(position);
        if self.active_sheet_id == id {
            if let Some(first) = self.sheets.first() {
                self.active_sheet_id = first.id.clone();
            }
        }
        Ok(())
    }

    /// Renames a sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet does not exist or the name is invalid.
    pub fn rename_sheet(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        ChartState::validate_name(&name)?;
        let Some(sheet) = self.sheets.iter_mut().find(|s| s.id == id) else {
            anyhow::bail!("Sheet '{}' not found", id);
        };
        sheet.name = name;
        Ok(())
    }

    /// Makes a sheet the target of edits.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet does not exist.
    pub fn select_sheet(&mut self, id: &str) -> Result<()> {
        if self.sheet(id).is_none() {
            anyhow::bail!("Sheet '{}' not found", id);
        }
        self.active_sheet_id = id.to_string();
        Ok(())
    }

    /// Adds or replaces a key and recompiles every sheet.
    pub fn upsert_key(&mut self, key: KeyDefinition) {
        self.key_palette.add_or_update(key);
        self.recompile_all();
    }

    /// Duplicates a key; returns the copy's id.
    pub fn duplicate_key(&mut self, id: &str) -> Option<String> {
        self.key_palette.duplicate(id)
    }

    /// Deletes a key and every placement of it in every layer of every sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the palette refuses the removal (last key, base
    /// stitch, or unknown id). The document is unchanged in that case.
    pub fn delete_key(&mut self, id: &str) -> Result<KeyDefinition> {
        let removed = self.key_palette.remove(id)?;
        let palette = &self.key_palette;
        let mut pruned = 0;
        for sheet in &mut self.sheets {
            let size = sheet.size();
            for layer in &mut sheet.layers {
                pruned += layer.prune_key(id, size, palette);
            }
        }
        tracing::info!(key_id = id, pruned, "Deleted key from palette");
        Ok(removed)
    }

    /// Recompiles every layer of every sheet.
    pub fn recompile_all(&mut self) {
        let palette = &self.key_palette;
        for sheet in &mut self.sheets {
            sheet.recompile_all(palette);
        }
    }
}
