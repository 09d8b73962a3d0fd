//! Editing session over a document.
//!
//! [`ChartEditor`] is the single channel through which user-level edits
//! reach a [`Document`]. Each logical operation records exactly one history
//! snapshot, so undo always restores the state before a whole operation.

use anyhow::{Context, Result};

use crate::clipboard::{ChartClipboard, ClipboardData};
use crate::config::Config;
use crate::constants::{KEY_ID_EMPTY, KEY_ID_KNIT_DEFAULT};
use crate::history::History;
use crate::models::{ChartState, Document, GridSize, KeyPalette, Layer, Point, SelectionRect};
use crate::services::transfer::{self, DraggedCells};
use crate::services::{geometry, selection};

/// Splits a document into its active layer, that sheet's size and the palette.
fn active_target(doc: &mut Document) -> Result<(&mut Layer, GridSize, &mut KeyPalette)> {
    let Document {
        sheets,
        active_sheet_id,
        key_palette,
    } = doc;
    let index = sheets
        .iter()
        .position(|s| s.id == *active_sheet_id)
        .unwrap_or(0);
    let sheet = sheets.get_mut(index).context("Document has no sheets")?;
    let size = sheet.size();
    let layer = sheet.active_layer_mut().context("Sheet has no layers")?;
    Ok((layer, size, key_palette))
}

/// An interactive editing session.
#[derive(Debug)]
pub struct ChartEditor {
    history: History<Document>,
    selection: Option<SelectionRect>,
    clipboard: ChartClipboard,
    active_key_id: String,
    config: Config,
    stroke_active: bool,
}

impl ChartEditor {
    /// Opens a session on `document`.
    #[must_use]
    pub fn new(document: Document, config: Config) -> Self {
        Self {
            history: History::new(document, config.history.max_entries),
            selection: None,
            clipboard: ChartClipboard::new(),
            active_key_id: KEY_ID_KNIT_DEFAULT.to_string(),
            config,
            stroke_active: false,
        }
    }

    /// The document as of the latest edit.
    #[must_use]
    pub fn document(&self) -> &Document {
        self.history.current()
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current selection, always normalized and inside the active sheet.
    #[must_use]
    pub const fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    /// In-session clipboard.
    #[must_use]
    pub const fn clipboard(&self) -> &ChartClipboard {
        &self.clipboard
    }

    /// Key used by paint and fill.
    #[must_use]
    pub fn active_key_id(&self) -> &str {
        &self.active_key_id
    }

    /// Chooses the key used by paint and fill.
    ///
    /// # Errors
    ///
    /// Returns an error if the palette has no such key.
    pub fn set_active_key(&mut self, key_id: &str) -> Result<()> {
        if !self.document().key_palette.contains(key_id) {
            anyhow::bail!("Key '{}' not found in palette", key_id);
        }
        self.active_key_id = key_id.to_string();
        Ok(())
    }

    /// Whether undo is possible.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is possible.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn active_size(&self) -> Option<GridSize> {
        self.document().active_sheet().map(ChartState::size)
    }

    /// Applies a document-level edit as one history entry.
    ///
    /// `edit` reports whether it changed anything; unchanged documents and
    /// errors record nothing, and errors leave the document untouched.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `edit`.
    pub fn update(&mut self, edit: impl FnOnce(&mut Document) -> Result<bool>) -> Result<bool> {
        self.stroke_active = false;
        let mut next = self.document().clone();
        let changed = edit(&mut next)?;
        if changed {
            self.history.record(next);
            self.renormalize_selection();
        }
        Ok(changed)
    }

    fn update_layer(
        &mut self,
        edit: impl FnOnce(&mut Layer, GridSize, &mut KeyPalette) -> bool,
    ) -> Result<bool> {
        self.update(|doc| {
            let (layer, size, palette) = active_target(doc)?;
            Ok(edit(layer, size, palette))
        })
    }

    fn require_selection(&self) -> Result<SelectionRect> {
        self.selection.context("Nothing is selected")
    }

    fn renormalize_selection(&mut self) {
        let size = self.active_size();
        self.selection = self
            .selection
            .zip(size)
            .and_then(|(sel, size)| sel.after_resize(size));
    }

    /// Starts a paint stroke by applying the active key at `anchor`.
    ///
    /// The stroke's later points are folded into the same history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no editable layer.
    pub fn begin_stroke(&mut self, anchor: Point) -> Result<bool> {
        let key_id = self.active_key_id.clone();
        let changed = self.update_layer(|layer, size, palette| {
            layer.apply_key(&key_id, anchor, size, palette)
        })?;
        self.stroke_active = true;
        Ok(changed)
    }

    /// Continues the current stroke at `anchor`, starting one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no editable layer.
    pub fn continue_stroke(&mut self, anchor: Point) -> Result<bool> {
        if !self.stroke_active {
            return self.begin_stroke(anchor);
        }
        let key_id = self.active_key_id.clone();
        let mut outcome = Ok(false);
        self.history.update_current(|doc| {
            outcome = active_target(doc)
                .map(|(layer, size, palette)| layer.apply_key(&key_id, anchor, size, palette));
        });
        outcome
    }

    /// Ends the current stroke.
    pub fn end_stroke(&mut self) {
        self.stroke_active = false;
    }

    /// Paints the active key at a single anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no editable layer.
    pub fn paint(&mut self, anchor: Point) -> Result<bool> {
        let changed = self.begin_stroke(anchor)?;
        self.end_stroke();
        Ok(changed)
    }

    /// Selects a rectangle, grown to enclose every multi-cell key it touches.
    ///
    /// A rectangle entirely outside the sheet clears the selection.
    pub fn select(&mut self, raw: SelectionRect) -> Option<SelectionRect> {
        self.stroke_active = false;
        let doc = self.history.current();
        self.selection = doc.active_sheet().and_then(|sheet| {
            let layer = sheet.active_layer()?;
            selection::expand(&raw, layer, &doc.key_palette, sheet.size())
        });
        self.selection
    }

    /// Selects the whole active sheet.
    pub fn select_all(&mut self) -> Option<SelectionRect> {
        self.selection = self.active_size().map(SelectionRect::all);
        self.selection
    }

    /// Drops the selection.
    pub fn deselect(&mut self) {
        self.selection = None;
    }

    /// Tiles the selection with the active key.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected.
    pub fn fill_selection(&mut self) -> Result<bool> {
        let sel = self.require_selection()?;
        let key_id = self.active_key_id.clone();
        self.update_layer(|layer, size, palette| {
            layer.fill_rect(&key_id, &sel, true, size, palette)
        })
    }

    /// Replaces every selected cell with "no stitch".
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected.
    pub fn clear_selection(&mut self) -> Result<bool> {
        let sel = self.require_selection()?;
        self.update_layer(|layer, size, palette| {
            layer.fill_rect(KEY_ID_EMPTY, &sel, false, size, palette)
        })
    }

    /// Copies the selection to the session clipboard.
    ///
    /// Returns a status message.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected.
    pub fn copy(&mut self) -> Result<String> {
        let sel = self.require_selection()?;
        let doc = self.history.current();
        let sheet = doc.active_sheet().context("Document has no sheets")?;
        let layer = sheet.active_layer().context("Sheet has no layers")?;
        let data = transfer::capture(layer, &sel, &doc.key_palette);
        Ok(self.clipboard.copy(data))
    }

    /// Cuts the selection to the session clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected.
    pub fn cut(&mut self) -> Result<String> {
        let sel = self.require_selection()?;
        let mut captured = None;
        self.update_layer(|layer, size, palette| {
            let (data, changed) = transfer::cut(layer, &sel, size, palette);
            captured = Some(data);
            changed
        })?;
        let data = captured.context("Nothing was cut")?;
        Ok(self.clipboard.cut(data, sel))
    }

    /// Pastes the session clipboard.
    ///
    /// With a multi-cell selection the paste goes into the selection at its
    /// top-left corner; otherwise at `origin`, kept inside the sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard is empty.
    pub fn paste(&mut self, origin: Point) -> Result<bool> {
        let data = self
            .clipboard
            .content()
            .cloned()
            .context("Clipboard is empty")?;
        let changed = self.paste_data(&data, origin, self.selection)?;
        self.clipboard.clear_cut_source();
        Ok(changed)
    }

    /// Pastes clipboard data from outside the session.
    ///
    /// `into` behaves like a selection in [`Self::paste`].
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no editable layer.
    pub fn paste_data(
        &mut self,
        data: &ClipboardData,
        origin: Point,
        into: Option<SelectionRect>,
    ) -> Result<bool> {
        let target = into
            .map(|sel| sel.normalized())
            .filter(|sel| !sel.is_single_cell());
        self.update_layer(|layer, size, palette| {
            let origin = match &target {
                Some(sel) => sel.start,
                None => transfer::clamp_origin(data.width, data.height, size, origin),
            };
            transfer::paste(layer, origin, data, target.as_ref(), size, palette)
        })
    }

    /// Moves the selected keys so the selection's top-left lands at `drop`.
    ///
    /// The selection follows the moved keys.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected.
    pub fn drag_selection(&mut self, drop: Point) -> Result<bool> {
        let sel = self.require_selection()?;
        let mut landed = None;
        let changed = self.update_layer(|layer, size, palette| {
            let dragged = DraggedCells::capture(layer, &sel, palette);
            let origin = transfer::clamp_origin(dragged.width, dragged.height, size, drop);
            landed = Some(
                geometry::footprint_of_size(origin, dragged.width, dragged.height).to_rect(),
            );
            transfer::drop_dragged(layer, &dragged, drop, size, palette)
        })?;
        if changed {
            self.selection = landed;
        }
        Ok(changed)
    }

    fn restructure(
        &mut self,
        edit: impl FnOnce(&mut ChartState, &KeyPalette) -> bool,
    ) -> Result<bool> {
        self.update(|doc| {
            let Document {
                sheets,
                active_sheet_id,
                key_palette,
            } = doc;
            let index = sheets
                .iter()
                .position(|s| s.id == *active_sheet_id)
                .unwrap_or(0);
            let sheet = sheets.get_mut(index).context("Document has no sheets")?;
            Ok(edit(sheet, key_palette))
        })
    }

    /// Inserts a row at `index` in every layer of the active sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no sheet, or the sheet is at
    /// its maximum height.
    pub fn insert_row(&mut self, index: usize) -> Result<bool> {
        let max = self.config.chart.max_rows;
        if self.active_size().is_some_and(|size| size.rows >= max) {
            anyhow::bail!("Chart already has the maximum of {} rows", max);
        }
        self.restructure(|sheet, palette| sheet.insert_row(index, palette))
    }

    /// Deletes row `index` from every layer of the active sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no sheet.
    pub fn delete_row(&mut self, index: usize) -> Result<bool> {
        let selection = self.selection;
        let changed = self.restructure(|sheet, palette| sheet.delete_row(index, palette))?;
        if changed {
            let rows = self.active_size().map_or(0, |s| s.rows);
            let row = i32::try_from(index).unwrap_or(i32::MAX);
            self.selection = selection.and_then(|sel| sel.after_row_deleted(row, rows));
        }
        Ok(changed)
    }

    /// Inserts a column at `index` in every layer of the active sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no sheet, or the sheet is at
    /// its maximum width.
    pub fn insert_col(&mut self, index: usize) -> Result<bool> {
        let max = self.config.chart.max_cols;
        if self.active_size().is_some_and(|size| size.cols >= max) {
            anyhow::bail!("Chart already has the maximum of {} columns", max);
        }
        self.restructure(|sheet, palette| sheet.insert_col(index, palette))
    }

    /// Deletes column `index` from every layer of the active sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no sheet.
    pub fn delete_col(&mut self, index: usize) -> Result<bool> {
        let selection = self.selection;
        let changed = self.restructure(|sheet, palette| sheet.delete_col(index, palette))?;
        if changed {
            let cols = self.active_size().map_or(0, |s| s.cols);
            let col = i32::try_from(index).unwrap_or(i32::MAX);
            self.selection = selection.and_then(|sel| sel.after_col_deleted(col, cols));
        }
        Ok(changed)
    }

    /// Resizes the active sheet, clamped to the configured limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no sheet.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<bool> {
        let size = self.config.clamp_chart_size(rows, cols);
        if self.active_size() == Some(size) {
            return Ok(false);
        }
        self.restructure(|sheet, palette| sheet.resize(size, palette))
    }

    /// Restores the previous state.
    pub fn undo(&mut self) -> bool {
        self.stroke_active = false;
        let undone = self.history.undo().is_some();
        if undone {
            self.renormalize_selection();
        }
        undone
    }

    /// Re-applies an undone state.
    pub fn redo(&mut self) -> bool {
        self.stroke_active = false;
        let redone = self.history.redo().is_some();
        if redone {
            self.renormalize_selection();
        }
        redone
    }

    /// Replaces the document and forgets all history.
    pub fn load(&mut self, document: Document) {
        self.history.reset(document);
        self.selection = None;
        self.clipboard.clear_cut_source();
        self.stroke_active = false;
        if !self.document().key_palette.contains(&self.active_key_id) {
            self.active_key_id = KEY_ID_KNIT_DEFAULT.to_string();
        }
    }
}
