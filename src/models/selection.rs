//! Rectangular cell selections.

use crate::models::{GridSize, Point};
use serde::{Deserialize, Serialize};

/// A rectangular selection between two corner cells (inclusive).
///
/// `start` and `end` may be in any order until [`SelectionRect::normalized`]
/// is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionRect {
    /// First corner
    pub start: Point,
    /// Opposite corner
    pub end: Point,
}

impl SelectionRect {
    /// Creates a selection from two corners.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// A single-cell selection.
    #[must_use]
    pub const fn cell(point: Point) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    /// Selection covering a whole grid.
    #[must_use]
    pub fn all(size: GridSize) -> Self {
        Self::new(
            Point::new(0, 0),
            Point::new(size.col_bound() - 1, size.row_bound() - 1),
        )
    }

    /// Same rectangle with `start` top-left and `end` bottom-right.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            start: Point::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y)),
            end: Point::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y)),
        }
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.start.x.abs_diff(self.end.x) + 1
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.start.y.abs_diff(self.end.y) + 1
    }

    /// Whether the selection covers exactly one cell.
    #[must_use]
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Smallest rectangle covering both selections.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let a = self.normalized();
        let b = other.normalized();
        Self {
            start: Point::new(a.start.x.min(b.start.x), a.start.y.min(b.start.y)),
            end: Point::new(a.end.x.max(b.end.x), a.end.y.max(b.end.y)),
        }
    }

    /// Whether a cell lies inside the selection.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let n = self.normalized();
        point.x >= n.start.x && point.x <= n.end.x && point.y >= n.start.y && point.y <= n.end.y
    }

    /// Iterates every cell row by row.
    pub fn cells(&self) -> impl Iterator<Item = Point> {
        let n = self.normalized();
        (n.start.y..=n.end.y).flat_map(move |y| (n.start.x..=n.end.x).map(move |x| Point::new(x, y)))
    }

    /// Clamps the selection into the grid; `None` if nothing is left.
    #[must_use]
    pub fn clamped(&self, size: GridSize) -> Option<Self> {
        let n = self.normalized();
        let clamped = Self {
            start: Point::new(n.start.x.max(0), n.start.y.max(0)),
            end: Point::new(
                n.end.x.min(size.col_bound() - 1),
                n.end.y.min(size.row_bound() - 1),
            ),
        };
        (clamped.start.x <= clamped.end.x && clamped.start.y <= clamped.end.y).then_some(clamped)
    }

    /// Selection after row `row` was deleted from a grid now `new_rows` tall.
    ///
    /// Edges at or below the deleted row move up by one (not past zero).
    /// Returns `None` when the selection becomes degenerate or out of bounds.
    #[must_use]
    pub fn after_row_deleted(&self, row: i32, new_rows: usize) -> Option<Self> {
        let mut sel = *self;
        if sel.start.y >= row {
            sel.start.y = sel.start.y.saturating_sub(1).max(0);
        }
        if sel.end.y >= row {
            sel.end.y = sel.end.y.saturating_sub(1).max(0);
        }
        let bound = i32::try_from(new_rows).unwrap_or(i32::MAX);
        (sel.start.y <= sel.end.y && sel.start.y < bound).then_some(sel)
    }

    /// Selection after column `col` was deleted from a grid now `new_cols` wide.
    #[must_use]
    pub fn after_col_deleted(&self, col: i32, new_cols: usize) -> Option<Self> {
        let mut sel = *self;
        if sel.start.x >= col {
            sel.start.x = sel.start.x.saturating_sub(1).max(0);
        }
        if sel.end.x >= col {
            sel.end.x = sel.end.x.saturating_sub(1).max(0);
        }
        let bound = i32::try_from(new_cols).unwrap_or(i32::MAX);
        (sel.start.x <= sel.end.x && sel.start.x < bound).then_some(sel)
    }

    /// Selection after the grid was resized; cleared if it no longer fits.
    #[must_use]
    pub fn after_resize(&self, size: GridSize) -> Option<Self> {
        let n = self.normalized();
        (n.end.x < size.col_bound() && n.end.y < size.row_bound()).then_some(*self)
    }
}
