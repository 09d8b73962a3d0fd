//! Footprint geometry for key placements.
//!
//! Pure functions describing which cells a key occupies when anchored at a
//! point, and how such rectangles relate to each other.

use crate::models::{GridSize, KeyDefinition, Point, SelectionRect};

/// Inclusive cell bounds of a placed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint {
    /// Top row
    pub min_row: i32,
    /// Bottom row (inclusive)
    pub max_row: i32,
    /// Left column
    pub min_col: i32,
    /// Right column (inclusive)
    pub max_col: i32,
}

impl Footprint {
    /// Whether two footprints share at least one cell.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.min_col <= other.max_col
            && self.max_col >= other.min_col
            && self.min_row <= other.max_row
            && self.max_row >= other.min_row
    }

    /// Whether a cell lies inside the footprint.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.min_col
            && point.x <= self.max_col
            && point.y >= self.min_row
            && point.y <= self.max_row
    }

    /// Whether the whole footprint lies inside `[0,rows) × [0,cols)`.
    #[must_use]
    pub fn fits_within(&self, size: GridSize) -> bool {
        self.min_row >= 0
            && self.min_col >= 0
            && self.max_row < size.row_bound()
            && self.max_col < size.col_bound()
    }

    /// The footprint as a normalized selection rectangle.
    #[must_use]
    pub const fn to_rect(&self) -> SelectionRect {
        SelectionRect::new(
            Point::new(self.min_col, self.min_row),
            Point::new(self.max_col, self.max_row),
        )
    }

    /// Footprint covering a selection rectangle.
    #[must_use]
    pub fn of_rect(rect: &SelectionRect) -> Self {
        let n = rect.normalized();
        Self {
            min_row: n.start.y,
            max_row: n.end.y,
            min_col: n.start.x,
            max_col: n.end.x,
        }
    }
}

/// Footprint of `key` anchored with its (0,0) cell at `anchor`.
#[must_use]
pub fn footprint(anchor: Point, key: &KeyDefinition) -> Footprint {
    footprint_of_size(anchor, key.width, key.height)
}

/// Footprint of a `width × height` box anchored at `anchor`.
#[must_use]
pub fn footprint_of_size(anchor: Point, width: u32, height: u32) -> Footprint {
    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let height = i32::try_from(height).unwrap_or(i32::MAX);
    Footprint {
        min_row: anchor.y,
        max_row: anchor.y.saturating_add(height - 1),
        min_col: anchor.x,
        max_col: anchor.x.saturating_add(width - 1),
    }
}

/// Whether two footprints share at least one cell.
#[must_use]
pub const fn overlap(a: &Footprint, b: &Footprint) -> bool {
    a.overlaps(b)
}

/// Whether a cell lies inside a footprint.
#[must_use]
pub const fn contains(point: Point, footprint: &Footprint) -> bool {
    footprint.contains(point)
}
