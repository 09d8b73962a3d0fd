//! Region transfer: copy, cut, paste and drag-relocation of chart regions.
//!
//! A region is captured as anchor-relative placements and re-materialized
//! at a destination through [`Layer::apply_key`], so every transfer obeys
//! the same eviction and bounds rules as painting.

use serde::{Deserialize, Serialize};

use crate::clipboard::ClipboardData;
use crate::constants::KEY_ID_KNIT_DEFAULT;
use crate::models::{
    GridSize, KeyDefinition, KeyInstance, KeyPalette, Layer, Point, SelectionRect,
};
use crate::services::geometry::{footprint, Footprint};

/// A selection being dragged to a new position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggedCells {
    /// Captured placements, anchors relative to `original_start`
    pub relative_key_instances: Vec<KeyInstance>,
    /// Width of the dragged rectangle
    pub width: u32,
    /// Height of the dragged rectangle
    pub height: u32,
    /// Top-left cell the selection was dragged from
    #[serde(rename = "originalStartCoords")]
    pub original_start: Point,
}

impl DraggedCells {
    /// Captures the selection under the cursor when a drag starts.
    #[must_use]
    pub fn capture(layer: &Layer, rect: &SelectionRect, palette: &KeyPalette) -> Self {
        let rect = rect.normalized();
        Self {
            relative_key_instances: capture_instances(layer, &rect, palette),
            width: rect.width(),
            height: rect.height(),
            original_start: rect.start,
        }
    }
}

/// Captures a rectangular region of a layer.
///
/// Only anchor cells contribute: the (0,0) cell of a multi-cell key, or
/// any cell of a single-cell key. A key anchored inside the rectangle is
/// captured even if it overhangs the edge; a key anchored outside is not.
#[must_use]
pub fn capture(layer: &Layer, rect: &SelectionRect, palette: &KeyPalette) -> ClipboardData {
    let rect = rect.normalized();
    let relative_key_instances = capture_instances(layer, &rect, palette);

    let mut source_key_definitions: Vec<KeyDefinition> = Vec::new();
    for instance in &relative_key_instances {
        let seen = source_key_definitions
            .iter()
            .any(|k| k.id == instance.key_id);
        if !seen {
            if let Some(key) = palette.get(&instance.key_id) {
                source_key_definitions.push(key.clone());
            }
        }
    }

    ClipboardData {
        relative_key_instances,
        width: rect.width(),
        height: rect.height(),
        source_key_definitions,
    }
}

fn capture_instances(layer: &Layer, rect: &SelectionRect, palette: &KeyPalette) -> Vec<KeyInstance> {
    let origin = rect.start;
    rect.cells()
        .filter_map(|point| {
            let cell = layer.grid().cell_at(point)?;
            let key = palette.get(&cell.key_id)?;
            if !(cell.is_anchor_cell_for_mxn || key.is_single_cell()) {
                return None;
            }
            let relative = Point::new(
                point.x.checked_sub(origin.x)?,
                point.y.checked_sub(origin.y)?,
            );
            Some(KeyInstance::new(relative, cell.key_id.clone()))
        })
        .collect()
}

/// Captures a region and fills it with the base stitch.
///
/// Also returns whether the fill changed the layer.
pub fn cut(
    layer: &mut Layer,
    rect: &SelectionRect,
    size: GridSize,
    palette: &KeyPalette,
) -> (ClipboardData, bool) {
    let data = capture(layer, rect, palette);
    let changed = layer.fill_rect(KEY_ID_KNIT_DEFAULT, rect, false, size, palette);
    (data, changed)
}

/// Pastes captured data with its top-left corner at `origin`.
///
/// Keys missing from `palette` are added from the clipboard first. When
/// pasting into a selection larger than one cell, the selection is filled
/// with the base stitch and keys reaching past its far edge are skipped.
/// Keys that would not fit in the grid are always skipped.
///
/// Returns whether the layer changed.
pub fn paste(
    layer: &mut Layer,
    origin: Point,
    clipboard: &ClipboardData,
    selection: Option<&SelectionRect>,
    size: GridSize,
    palette: &mut KeyPalette,
) -> bool {
    let added = palette.merge_missing(&clipboard.source_key_definitions);
    if !added.is_empty() {
        tracing::info!(keys = ?added, "Added pasted keys to palette");
    }

    let selection = selection
        .map(SelectionRect::normalized)
        .filter(|sel| !sel.is_single_cell());

    let mut changed = false;
    if let Some(sel) = &selection {
        changed |= layer.fill_rect(KEY_ID_KNIT_DEFAULT, sel, false, size, palette);
    }

    let bounds = selection.as_ref().map(Footprint::of_rect);
    for instance in &clipboard.relative_key_instances {
        let Some(key) = palette.get(&instance.key_id) else {
            continue;
        };
        let Some(anchor) = origin.offset(instance.anchor) else {
            tracing::debug!(key_id = %instance.key_id, "Pasted key anchor is out of range");
            continue;
        };
        let target = footprint(anchor, key);
        if !target.fits_within(size) {
            tracing::debug!(key_id = %instance.key_id, ?anchor, "Pasted key does not fit the chart");
            continue;
        }
        if bounds.is_some_and(|b| target.max_col > b.max_col || target.max_row > b.max_row) {
            tracing::debug!(key_id = %instance.key_id, ?anchor, "Pasted key exceeds the selection");
            continue;
        }
        changed |= layer.apply_key(&instance.key_id, anchor, size, palette);
    }
    changed
}

/// Drops dragged cells with their top-left corner at `drop`.
///
/// The drop point is clamped so the dragged rectangle stays inside the
/// grid. The source footprints are cleared to the base stitch before the
/// destination is painted.
pub fn drop_dragged(
    layer: &mut Layer,
    dragged: &DraggedCells,
    drop: Point,
    size: GridSize,
    palette: &KeyPalette,
) -> bool {
    let drop = clamp_origin(dragged.width, dragged.height, size, drop);
    let mut changed = false;

    for instance in &dragged.relative_key_instances {
        let Some(key) = palette.get(&instance.key_id) else {
            continue;
        };
        let Some(start) = dragged.original_start.offset(instance.anchor) else {
            continue;
        };
        let source = footprint(start, key);
        for cell in source.to_rect().cells() {
            changed |= layer.apply_key(KEY_ID_KNIT_DEFAULT, cell, size, palette);
        }
    }

    for instance in &dragged.relative_key_instances {
        if !palette.contains(&instance.key_id) {
            continue;
        }
        let Some(anchor) = drop.offset(instance.anchor) else {
            continue;
        };
        if size.contains(anchor) {
            changed |= layer.apply_key(&instance.key_id, anchor, size, palette);
        }
    }
    changed
}

/// Clamps a paste or drop origin so a `width × height` box stays in the grid.
///
/// Boxes larger than the grid are pinned to the top-left corner.
#[must_use]
pub fn clamp_origin(width: u32, height: u32, size: GridSize, proposed: Point) -> Point {
    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let height = i32::try_from(height).unwrap_or(i32::MAX);
    Point::new(
        proposed.x.min(size.col_bound().saturating_sub(width)).max(0),
        proposed.y.min(size.row_bound().saturating_sub(height)).max(0),
    )
}
