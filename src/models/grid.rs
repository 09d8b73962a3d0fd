//! Grid coordinates and the compiled per-cell chart grid.

use crate::constants::KEY_ID_KNIT_DEFAULT;
use serde::{Deserialize, Serialize};

/// A grid cell coordinate: `x` is the column, `y` the row.
///
/// Signed so that relative offsets and drag arithmetic can go negative
/// before being bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Point {
    /// Creates a point from a column and a row.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a point from a row and a column.
    #[must_use]
    pub const fn at(row: i32, col: i32) -> Self {
        Self { x: col, y: row }
    }

    /// Component-wise sum, or `None` if either coordinate overflows.
    #[must_use]
    pub const fn offset(self, by: Self) -> Option<Self> {
        match (self.x.checked_add(by.x), self.y.checked_add(by.y)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }
}

/// Chart dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl GridSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Row count as a signed coordinate bound.
    #[must_use]
    pub fn row_bound(&self) -> i32 {
        i32::try_from(self.rows).unwrap_or(i32::MAX)
    }

    /// Column count as a signed coordinate bound.
    #[must_use]
    pub fn col_bound(&self) -> i32 {
        i32::try_from(self.cols).unwrap_or(i32::MAX)
    }

    /// Whether a point lies inside `[0,rows) × [0,cols)`.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.col_bound() && point.y < self.row_bound()
    }

    /// Total number of cells, saturating at `usize::MAX`.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        match self.rows.checked_mul(self.cols) {
            Some(count) => count,
            None => usize::MAX,
        }
    }
}

/// One compiled cell.
///
/// Derived entirely from a layer's placements; never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartCell {
    /// Key occupying this cell (the base stitch when nothing is placed)
    pub key_id: String,
    /// True only on the (0,0) cell of a key larger than 1×1
    #[serde(rename = "isAnchorCellForMxN")]
    pub is_anchor_cell_for_mxn: bool,
    /// Row of this cell within its key
    pub key_part_row_offset: u32,
    /// Column of this cell within its key
    pub key_part_col_offset: u32,
}

impl ChartCell {
    /// The base stitch cell every grid starts from.
    #[must_use]
    pub fn base() -> Self {
        Self {
            key_id: KEY_ID_KNIT_DEFAULT.to_string(),
            is_anchor_cell_for_mxn: false,
            key_part_row_offset: 0,
            key_part_col_offset: 0,
        }
    }

    /// Whether this cell holds its key's (0,0) part.
    #[must_use]
    pub const fn is_key_origin(&self) -> bool {
        self.key_part_row_offset == 0 && self.key_part_col_offset == 0
    }
}

/// Dense row-major grid of compiled cells.
///
/// Only the compiler constructs populated grids; consumers get read access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartGrid {
    rows: usize,
    cols: usize,
    cells: Vec<ChartCell>,
}

impl ChartGrid {
    /// A grid of the given size filled with the base stitch.
    #[must_use]
    pub fn filled(size: GridSize) -> Self {
        Self {
            rows: size.rows,
            cols: size.cols,
            cells: vec![ChartCell::base(); size.cell_count()],
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        GridSize::new(self.rows, self.cols)
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&ChartCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Cell at a signed point, or `None` when out of bounds.
    #[must_use]
    pub fn cell_at(&self, point: Point) -> Option<&ChartCell> {
        let row = usize::try_from(point.y).ok()?;
        let col = usize::try_from(point.x).ok()?;
        self.cell(row, col)
    }

    /// One full row of cells.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[ChartCell]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.cells.get(start..start + self.cols)
    }

    /// Iterates rows top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[ChartCell]> {
        (0..self.rows).filter_map(move |r| self.row(r))
    }

    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut ChartCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get_mut(row * self.cols + col)
    }
}
