//! Grid compiler: resolves a placement list into a per-cell chart grid.
//!
//! The compiled grid is a pure function of (placements, palette, size).
//! Every operation that changes placements calls [`compile`] afterwards
//! instead of editing cells.

use std::cmp::Ordering;
use std::ops::Range;

use crate::models::{ChartCell, ChartGrid, GridSize, KeyDefinition, KeyInstance, KeyPalette};

/// Compiles placements into a grid of the given size.
///
/// Placements whose key is missing from the palette are dropped. The rest
/// are painted in priority order: contentful before blank, larger before
/// smaller, then reading order. Later paints win on shared cells.
#[must_use]
pub fn compile(placements: &[KeyInstance], size: GridSize, palette: &KeyPalette) -> ChartGrid {
    let mut grid = ChartGrid::filled(size);
    let index = palette.index();

    let mut resolved: Vec<(&KeyInstance, &KeyDefinition, bool)> = placements
        .iter()
        .filter_map(|placement| {
            index
                .get(placement.key_id.as_str())
                .map(|key| (placement, *key, key.is_contentful()))
        })
        .collect();

    if resolved.len() < placements.len() {
        tracing::debug!(
            dropped = placements.len() - resolved.len(),
            "Dropped placements with unresolvable keys"
        );
    }

    // Stable: equal-priority placements keep their list order.
    resolved.sort_by(|(a, key_a, contentful_a), (b, key_b, contentful_b)| {
        paint_order(a, key_a, *contentful_a, b, key_b, *contentful_b)
    });

    for (placement, key, _) in resolved {
        paint(&mut grid, placement, key);
    }

    grid
}

fn paint_order(
    a: &KeyInstance,
    key_a: &KeyDefinition,
    contentful_a: bool,
    b: &KeyInstance,
    key_b: &KeyDefinition,
    contentful_b: bool,
) -> Ordering {
    contentful_b
        .cmp(&contentful_a)
        .then_with(|| key_b.area().cmp(&key_a.area()))
        .then_with(|| a.anchor.y.cmp(&b.anchor.y))
        .then_with(|| a.anchor.x.cmp(&b.anchor.x))
}

fn paint(grid: &mut ChartGrid, placement: &KeyInstance, key: &KeyDefinition) {
    let multi_cell = !key.is_single_cell();
    // Only the part of the footprint that overlaps the grid is visited.
    let rows = visible_offsets(placement.anchor.y, key.height, grid.rows());
    let cols = visible_offsets(placement.anchor.x, key.width, grid.cols());
    for row_offset in rows {
        for col_offset in cols.clone() {
            let (Some(row), Some(col)) = (
                shifted(placement.anchor.y, row_offset),
                shifted(placement.anchor.x, col_offset),
            ) else {
                continue;
            };
            if let Some(cell) = grid.cell_mut(row, col) {
                *cell = ChartCell {
                    key_id: placement.key_id.clone(),
                    is_anchor_cell_for_mxn: multi_cell && row_offset == 0 && col_offset == 0,
                    key_part_row_offset: row_offset,
                    key_part_col_offset: col_offset,
                };
            }
        }
    }
}

/// Offsets in `0..extent` that land inside `0..len` when added to `base`.
fn visible_offsets(base: i32, extent: u32, len: usize) -> Range<u32> {
    let base = i64::from(base);
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let start = (-base).clamp(0, i64::from(extent));
    let end = (len - base).clamp(start, i64::from(extent));
    // Both bounds lie in 0..=extent, so they fit in u32.
    u32::try_from(start).unwrap_or(extent)..u32::try_from(end).unwrap_or(extent)
}

/// `base + offset` as an index, `None` when negative.
fn shifted(base: i32, offset: u32) -> Option<usize> {
    let value = i64::from(base) + i64::from(offset);
    usize::try_from(value).ok()
}
