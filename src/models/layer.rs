//! Layers: a placement list and the grid compiled from it.

use crate::models::{ChartGrid, GridSize, KeyPalette, Point, SelectionRect};
use crate::services::compiler;
use crate::services::geometry::footprint;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One occurrence of a key on a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInstance {
    /// Grid cell holding the key's (0,0) part
    pub anchor: Point,
    /// Weak reference into the key palette
    pub key_id: String,
}

impl KeyInstance {
    /// Creates a placement.
    pub fn new(anchor: Point, key_id: impl Into<String>) -> Self {
        Self {
            anchor,
            key_id: key_id.into(),
        }
    }
}

/// A single layer of a chart sheet.
///
/// # Validation
///
/// - Name must be non-empty, max 50 characters
/// - The grid is only ever produced by [`Layer::recompile`]; it is never
///   persisted and must be rebuilt after loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Unique identifier for this layer (stable across renames/reorders)
    #[serde(default = "generate_layer_id")]
    pub id: String,
    /// Human-readable name (e.g., "Base Layer", "Colorwork")
    pub name: String,
    /// Whether consumers draw this layer
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(rename = "keyPlacements", default)]
    placements: Vec<KeyInstance>,
    #[serde(skip)]
    grid: ChartGrid,
}

/// Generates a new unique layer ID
pub fn generate_layer_id() -> String {
    format!("layer_{}", Uuid::new_v4())
}

const fn default_visible() -> bool {
    true
}

impl Layer {
    /// Creates an empty, visible layer compiled to `size`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or exceeds 50 characters.
    pub fn new(name: impl Into<String>, size: GridSize) -> Result<Self> {
        let name = name.into();
        Self::validate_name(&name)?;

        Ok(Self {
            id: generate_layer_id(),
            name,
            is_visible: true,
            placements: Vec::new(),
            grid: ChartGrid::filled(size),
        })
    }

    /// Builds a layer from already-known parts and compiles it.
    pub(crate) fn from_parts(
        id: String,
        name: String,
        is_visible: bool,
        placements: Vec<KeyInstance>,
        size: GridSize,
        palette: &KeyPalette,
    ) -> Self {
        let grid = compiler::compile(&placements, size, palette);
        Self {
            id,
            name,
            is_visible,
            placements,
            grid,
        }
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            anyhow::bail!("Layer name cannot be empty");
        }

        if name.len() > 50 {
            anyhow::bail!(
                "Layer name '{}' exceeds maximum length of 50 characters (got {})",
                name,
                name.len()
            );
        }

        Ok(())
    }

    /// Updates the layer name with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or too long.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        Self::validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Placements in insertion order.
    #[must_use]
    pub fn placements(&self) -> &[KeyInstance] {
        &self.placements
    }

    /// The compiled grid.
    #[must_use]
    pub const fn grid(&self) -> &ChartGrid {
        &self.grid
    }

    /// Replaces the placement list and recompiles.
    pub fn set_placements(
        &mut self,
        placements: Vec<KeyInstance>,
        size: GridSize,
        palette: &KeyPalette,
    ) {
        self.placements = placements;
        self.recompile(size, palette);
    }

    /// Rebuilds the grid from the current placements.
    pub fn recompile(&mut self, size: GridSize, palette: &KeyPalette) {
        self.grid = compiler::compile(&self.placements, size, palette);
    }

    /// Places a key with its (0,0) cell at `anchor`.
    ///
    /// Every placement whose footprint overlaps the new key's footprint is
    /// removed entirely. The new placement is only stored when its whole
    /// footprint fits in the grid, so painting at the edge with a large key
    /// erases without placing. Keys missing from the palette leave the
    /// layer untouched.
    ///
    /// Returns whether the placement list changed. Re-applying a key over
    /// its own placement, with nothing else underneath, changes nothing.
    pub fn apply_key(
        &mut self,
        key_id: &str,
        anchor: Point,
        size: GridSize,
        palette: &KeyPalette,
    ) -> bool {
        let Some(key) = palette.get(key_id) else {
            tracing::debug!(key_id, "Ignoring placement of unknown key");
            return false;
        };
        let operation = footprint(anchor, key);
        let placed = operation.fits_within(size);
        let instance = KeyInstance::new(anchor, key_id);

        let index = palette.index();
        // Placements with unresolvable keys have no footprint; the compiler drops them.
        let overlaps = |existing: &KeyInstance| {
            index
                .get(existing.key_id.as_str())
                .is_some_and(|existing_key| footprint(existing.anchor, existing_key).overlaps(&operation))
        };
        if placed && self.placements.iter().filter(|p| overlaps(p)).eq([&instance]) {
            return false;
        }

        let before = self.placements.len();
        self.placements.retain(|existing| !overlaps(existing));
        let evicted = before - self.placements.len();

        if placed {
            self.placements.push(instance);
        } else {
            tracing::debug!(key_id, ?anchor, "Key does not fit inside the chart");
        }

        if evicted == 0 && !placed {
            return false;
        }
        self.recompile(size, palette);
        true
    }

    /// Applies a key across a rectangle.
    ///
    /// With `step_by_key` the key is tiled by its own size; otherwise it is
    /// applied at every cell, which is how clearing works.
    pub fn fill_rect(
        &mut self,
        key_id: &str,
        rect: &SelectionRect,
        step_by_key: bool,
        size: GridSize,
        palette: &KeyPalette,
    ) -> bool {
        let Some(key) = palette.get(key_id) else {
            tracing::debug!(key_id, "Ignoring fill with unknown key");
            return false;
        };
        let (step_x, step_y) = if step_by_key {
            (
                i32::try_from(key.width).unwrap_or(i32::MAX),
                i32::try_from(key.height).unwrap_or(i32::MAX),
            )
        } else {
            (1, 1)
        };

        let rect = rect.normalized();
        let mut changed = false;
        let mut row = rect.start.y;
        while row <= rect.end.y {
            let mut col = rect.start.x;
            while col <= rect.end.x {
                changed |= self.apply_key(key_id, Point::new(col, row), size, palette);
                col = col.saturating_add(step_x);
            }
            row = row.saturating_add(step_y);
        }
        changed
    }

    /// Removes every placement of a key; returns how many were removed.
    pub fn prune_key(&mut self, key_id: &str, size: GridSize, palette: &KeyPalette) -> usize {
        let before = self.placements.len();
        self.placements.retain(|p| p.key_id != key_id);
        let removed = before - self.placements.len();
        if removed > 0 {
            self.recompile(size, palette);
        }
        removed
    }

    /// Toggles visibility.
    pub const fn toggle_visibility(&mut self) {
        self.is_visible = !self.is_visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KEY_ID_EMPTY, KEY_ID_KNIT_DEFAULT, KEY_ID_PURL_DEFAULT};
    use crate::models::KeyDefinition;

    const SIZE: GridSize = GridSize::new(5, 5);

    fn palette() -> KeyPalette {
        let mut palette = KeyPalette::initial();
        palette.add_or_update(KeyDefinition::new("cable", "Cable").with_size(2, 2));
        palette
    }

    fn layer() -> Layer {
        Layer::new("Base Layer", SIZE).unwrap()
    }

    #[test]
    fn test_layer_new_valid() {
        let layer = layer();
        assert_eq!(layer.name, "Base Layer");
        assert!(layer.is_visible);
        assert!(layer.placements().is_empty());
        assert_eq!(layer.grid().size(), SIZE);
        assert!(layer.id.starts_with("layer_"));
    }

    #[test]
    fn test_layer_validate_name() {
        assert!(Layer::new("A", SIZE).is_ok());
        assert!(Layer::new("", SIZE).is_err());
        assert!(Layer::new("   ", SIZE).is_err());
        assert!(Layer::new("a".repeat(51), SIZE).is_err());

        let mut layer = layer();
        assert!(layer.set_name("").is_err());
        assert_eq!(layer.name, "Base Layer");
        layer.set_name("Colorwork").unwrap();
        assert_eq!(layer.name, "Colorwork");
    }

    #[test]
    fn test_apply_key_evicts_whole_overlapping_placement() {
        let palette = palette();
        let mut layer = layer();
        assert!(layer.apply_key("cable", Point::at(1, 1), SIZE, &palette));
        assert!(layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(2, 2), SIZE, &palette));

        assert_eq!(
            layer.placements(),
            &[KeyInstance::new(Point::at(2, 2), KEY_ID_PURL_DEFAULT)]
        );
        assert_eq!(layer.grid().cell(1, 1).unwrap().key_id, KEY_ID_KNIT_DEFAULT);
        assert_eq!(layer.grid().cell(2, 2).unwrap().key_id, KEY_ID_PURL_DEFAULT);
    }

    #[test]
    fn test_reapplying_same_key_is_unchanged() {
        let palette = palette();
        let mut layer = layer();
        assert!(layer.apply_key("cable", Point::at(1, 1), SIZE, &palette));
        let before = layer.clone();
        assert!(!layer.apply_key("cable", Point::at(1, 1), SIZE, &palette));
        assert_eq!(layer, before);

        layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(3, 1), SIZE, &palette);
        assert!(layer.apply_key("cable", Point::at(2, 1), SIZE, &palette));
        assert_eq!(
            layer.placements(),
            &[KeyInstance::new(Point::at(2, 1), "cable")]
        );
    }

    #[test]
    fn test_apply_key_rejects_out_of_bounds() {
        let palette = palette();
        let mut layer = layer();
        assert!(!layer.apply_key("cable", Point::at(4, 4), SIZE, &palette));
        assert!(!layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(-1, 0), SIZE, &palette));
        assert!(!layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(0, 5), SIZE, &palette));
        assert!(layer.placements().is_empty());
    }

    #[test]
    fn test_apply_key_at_edge_still_erases() {
        let palette = palette();
        let mut layer = layer();
        layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(4, 4), SIZE, &palette);
        assert!(layer.apply_key("cable", Point::at(4, 4), SIZE, &palette));
        assert!(layer.placements().is_empty());
    }

    #[test]
    fn test_apply_unknown_key_is_noop() {
        let palette = palette();
        let mut layer = layer();
        layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(0, 0), SIZE, &palette);
        let before = layer.clone();
        assert!(!layer.apply_key("ghost", Point::at(0, 0), SIZE, &palette));
        assert_eq!(layer, before);
    }

    #[test]
    fn test_apply_key_twice_is_idempotent() {
        let palette = palette();
        let mut once = layer();
        once.apply_key("cable", Point::at(0, 0), SIZE, &palette);
        let mut twice = once.clone();
        twice.apply_key("cable", Point::at(0, 0), SIZE, &palette);
        assert_eq!(once.placements(), twice.placements());
        assert_eq!(once.grid(), twice.grid());
    }

    #[test]
    fn test_fill_rect_steps_by_key_size() {
        let palette = palette();
        let mut layer = layer();
        let rect = SelectionRect::new(Point::new(0, 0), Point::new(3, 3));
        assert!(layer.fill_rect("cable", &rect, true, SIZE, &palette));
        assert_eq!(layer.placements().len(), 4);
        assert!(layer.grid().cell(2, 2).unwrap().is_anchor_cell_for_mxn);
    }

    #[test]
    fn test_fill_rect_clear_every_cell() {
        let palette = palette();
        let mut layer = layer();
        layer.apply_key("cable", Point::at(0, 0), SIZE, &palette);
        let rect = SelectionRect::new(Point::new(0, 0), Point::new(1, 0));
        layer.fill_rect(KEY_ID_EMPTY, &rect, false, SIZE, &palette);
        assert_eq!(layer.placements().len(), 2);
        assert_eq!(layer.grid().cell(0, 1).unwrap().key_id, KEY_ID_EMPTY);
        assert_eq!(layer.grid().cell(1, 0).unwrap().key_id, KEY_ID_KNIT_DEFAULT);
    }

    #[test]
    fn test_prune_key() {
        let palette = palette();
        let mut layer = layer();
        layer.apply_key("cable", Point::at(0, 0), SIZE, &palette);
        layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(3, 3), SIZE, &palette);
        assert_eq!(layer.prune_key("cable", SIZE, &palette), 1);
        assert_eq!(layer.grid().cell(0, 0).unwrap().key_id, KEY_ID_KNIT_DEFAULT);
        assert_eq!(layer.placements().len(), 1);
    }

    #[test]
    fn test_serde_skips_grid() {
        let palette = palette();
        let mut layer = layer();
        layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(1, 2), SIZE, &palette);
        let json = serde_json::to_value(&layer).unwrap();
        assert!(json.get("grid").is_none());
        assert_eq!(json["keyPlacements"][0]["anchor"]["x"], 2);
        assert_eq!(json["isVisible"], true);
    }
}
