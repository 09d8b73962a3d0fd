//! Row and column insertion/deletion over placement lists.
//!
//! These functions only rewrite placements. Callers recompile every layer
//! with the new dimensions afterwards (see [`crate::models::ChartState`]).

use crate::constants::KEY_ID_KNIT_DEFAULT;
use crate::models::{ChartCell, ChartGrid, GridSize, KeyInstance, KeyPalette, Point};

/// Which grid axis a structural edit works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal lines (y)
    Row,
    /// Vertical lines (x)
    Col,
}

impl Axis {
    const fn coord(self, point: Point) -> i32 {
        match self {
            Self::Row => point.y,
            Self::Col => point.x,
        }
    }

    const fn with_coord(self, point: Point, value: i32) -> Point {
        match self {
            Self::Row => Point::new(point.x, value),
            Self::Col => Point::new(value, point.y),
        }
    }

    fn template_cell(self, grid: &ChartGrid, line: usize, across: usize) -> Option<&ChartCell> {
        match self {
            Self::Row => grid.cell(line, across),
            Self::Col => grid.cell(across, line),
        }
    }

    const fn line_count(self, grid: &ChartGrid) -> usize {
        match self {
            Self::Row => grid.rows(),
            Self::Col => grid.cols(),
        }
    }
}

/// Inserts a row at `row_index`.
///
/// Placements anchored at or below the index move down one row, and the new
/// row is filled with one placement per column carrying the key id of the
/// row above it in `grid_before` (or of the old row 0 when inserting at the
/// top). Cells of a multi-cell key clone that key as-is; the compiler clips
/// whatever hangs past the grid.
#[must_use]
pub fn insert_row(
    placements: &[KeyInstance],
    row_index: usize,
    grid_before: &ChartGrid,
    num_cols: usize,
) -> Vec<KeyInstance> {
    insert_line(Axis::Row, placements, row_index, grid_before, num_cols)
}

/// Inserts a column at `col_index`. Mirror image of [`insert_row`].
#[must_use]
pub fn insert_col(
    placements: &[KeyInstance],
    col_index: usize,
    grid_before: &ChartGrid,
    num_rows: usize,
) -> Vec<KeyInstance> {
    insert_line(Axis::Col, placements, col_index, grid_before, num_rows)
}

/// Deletes a row.
///
/// Placements anchored on the row are dropped whole, even when their
/// footprint reaches into surviving rows. Placements below it move up.
/// Placements with unresolvable keys are dropped too.
#[must_use]
pub fn delete_row(
    placements: &[KeyInstance],
    row_index: usize,
    palette: &KeyPalette,
) -> Vec<KeyInstance> {
    delete_line(Axis::Row, placements, row_index, palette)
}

/// Deletes a column. Mirror image of [`delete_row`].
#[must_use]
pub fn delete_col(
    placements: &[KeyInstance],
    col_index: usize,
    palette: &KeyPalette,
) -> Vec<KeyInstance> {
    delete_line(Axis::Col, placements, col_index, palette)
}

/// Keeps the placements that still make sense after a resize.
///
/// A placement survives when its key resolves and its anchor is inside the
/// new bounds. Keys hanging over the new edge are kept and clipped by the
/// compiler.
#[must_use]
pub fn resize_placements(
    placements: &[KeyInstance],
    palette: &KeyPalette,
    new_size: GridSize,
) -> Vec<KeyInstance> {
    placements
        .iter()
        .filter(|p| palette.contains(&p.key_id))
        .filter(|p| p.anchor.y < new_size.row_bound() && p.anchor.x < new_size.col_bound())
        .cloned()
        .collect()
}

fn insert_line(
    axis: Axis,
    placements: &[KeyInstance],
    index: usize,
    grid_before: &ChartGrid,
    span: usize,
) -> Vec<KeyInstance> {
    let at = i32::try_from(index).unwrap_or(i32::MAX);

    let mut result: Vec<KeyInstance> = placements
        .iter()
        .map(|p| {
            let coord = axis.coord(p.anchor);
            if coord >= at {
                KeyInstance::new(axis.with_coord(p.anchor, coord + 1), p.key_id.clone())
            } else {
                p.clone()
            }
        })
        .collect();

    let template = if index == 0 {
        (axis.line_count(grid_before) > 0).then_some(0)
    } else {
        Some(index - 1)
    };

    for across in 0..span {
        let key_id = template
            .and_then(|line| axis.template_cell(grid_before, line, across))
            .map_or(KEY_ID_KNIT_DEFAULT, |cell| cell.key_id.as_str());
        let across = i32::try_from(across).unwrap_or(i32::MAX);
        let anchor = match axis {
            Axis::Row => Point::new(across, at),
            Axis::Col => Point::new(at, across),
        };
        result.push(KeyInstance::new(anchor, key_id));
    }

    result
}

fn delete_line(
    axis: Axis,
    placements: &[KeyInstance],
    index: usize,
    palette: &KeyPalette,
) -> Vec<KeyInstance> {
    let at = i32::try_from(index).unwrap_or(i32::MAX);

    placements
        .iter()
        .filter(|p| palette.contains(&p.key_id) && axis.coord(p.anchor) != at)
        .map(|p| {
            let coord = axis.coord(p.anchor);
            if coord > at {
                KeyInstance::new(axis.with_coord(p.anchor, coord - 1), p.key_id.clone())
            } else {
                p.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KEY_ID_PURL_DEFAULT;
    use crate::models::KeyDefinition;
    use crate::services::compiler::compile;

    fn palette() -> KeyPalette {
        let mut palette = KeyPalette::initial();
        palette.add_or_update(KeyDefinition::new("cable", "Cable").with_size(2, 2));
        palette
    }

    #[test]
    fn test_insert_row_shifts_and_clones_row_above() {
        let palette = palette();
        let size = GridSize::new(3, 3);
        let placements = vec![
            KeyInstance::new(Point::at(0, 1), KEY_ID_PURL_DEFAULT),
            KeyInstance::new(Point::at(2, 2), KEY_ID_PURL_DEFAULT),
        ];
        let grid = compile(&placements, size, &palette);

        let result = insert_row(&placements, 1, &grid, 3);
        assert!(result.contains(&KeyInstance::new(Point::at(0, 1), KEY_ID_PURL_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(3, 2), KEY_ID_PURL_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(1, 0), KEY_ID_KNIT_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(1, 1), KEY_ID_PURL_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(1, 2), KEY_ID_KNIT_DEFAULT)));
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_insert_row_at_top_clones_old_first_row() {
        let palette = palette();
        let placements = vec![KeyInstance::new(Point::at(0, 0), KEY_ID_PURL_DEFAULT)];
        let grid = compile(&placements, GridSize::new(2, 2), &palette);

        let result = insert_row(&placements, 0, &grid, 2);
        assert!(result.contains(&KeyInstance::new(Point::at(1, 0), KEY_ID_PURL_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(0, 0), KEY_ID_PURL_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(0, 1), KEY_ID_KNIT_DEFAULT)));
    }

    #[test]
    fn test_insert_row_into_empty_grid_uses_base_key() {
        let grid = ChartGrid::filled(GridSize::new(0, 3));
        let result = insert_row(&[], 0, &grid, 3);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|p| p.key_id == KEY_ID_KNIT_DEFAULT));
    }

    #[test]
    fn test_insert_row_below_multi_cell_key_copies_key_id() {
        let palette = palette();
        let size = GridSize::new(5, 5);
        let placements = vec![KeyInstance::new(Point::at(1, 1), "cable")];
        let grid = compile(&placements, size, &palette);

        let result = insert_row(&placements, 2, &grid, size.cols);
        let new_row: Vec<&str> = (0..5)
            .map(|col| {
                result
                    .iter()
                    .find(|p| p.anchor == Point::at(2, col))
                    .map(|p| p.key_id.as_str())
                    .unwrap()
            })
            .collect();
        assert_eq!(
            new_row,
            vec![KEY_ID_KNIT_DEFAULT, "cable", "cable", KEY_ID_KNIT_DEFAULT, KEY_ID_KNIT_DEFAULT]
        );
        assert!(result.contains(&KeyInstance::new(Point::at(1, 1), "cable")));
    }

    #[test]
    fn test_insert_col_right_of_multi_cell_key_copies_key_id() {
        let palette = palette();
        let placements = vec![KeyInstance::new(Point::at(0, 0), "cable")];
        let grid = compile(&placements, GridSize::new(3, 3), &palette);

        let result = insert_col(&placements, 2, &grid, 3);
        let new_col: Vec<&str> = result
            .iter()
            .filter(|p| p.anchor.x == 2)
            .map(|p| p.key_id.as_str())
            .collect();
        assert_eq!(new_col, vec!["cable", "cable", KEY_ID_KNIT_DEFAULT]);
    }

    #[test]
    fn test_insert_col_clones_col_left() {
        let palette = palette();
        let placements = vec![KeyInstance::new(Point::at(1, 0), KEY_ID_PURL_DEFAULT)];
        let grid = compile(&placements, GridSize::new(2, 2), &palette);

        let result = insert_col(&placements, 1, &grid, 2);
        assert!(result.contains(&KeyInstance::new(Point::at(1, 0), KEY_ID_PURL_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(1, 1), KEY_ID_PURL_DEFAULT)));
        assert!(result.contains(&KeyInstance::new(Point::at(0, 1), KEY_ID_KNIT_DEFAULT)));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_delete_row_drops_anchored_and_shifts() {
        let palette = palette();
        let placements = vec![
            KeyInstance::new(Point::at(0, 0), "cable"),
            KeyInstance::new(Point::at(1, 2), KEY_ID_PURL_DEFAULT),
            KeyInstance::new(Point::at(3, 1), KEY_ID_PURL_DEFAULT),
            KeyInstance::new(Point::at(3, 0), "ghost"),
        ];
        let result = delete_row(&placements, 0, &palette);
        assert_eq!(
            result,
            vec![
                KeyInstance::new(Point::at(0, 2), KEY_ID_PURL_DEFAULT),
                KeyInstance::new(Point::at(2, 1), KEY_ID_PURL_DEFAULT),
            ]
        );
    }

    #[test]
    fn test_delete_row_keeps_key_anchored_above() {
        let palette = palette();
        let placements = vec![KeyInstance::new(Point::at(0, 0), "cable")];
        let result = delete_row(&placements, 1, &palette);
        assert_eq!(result, placements);
    }

    #[test]
    fn test_delete_col_shifts_left() {
        let palette = palette();
        let placements = vec![
            KeyInstance::new(Point::at(0, 1), KEY_ID_PURL_DEFAULT),
            KeyInstance::new(Point::at(0, 3), KEY_ID_PURL_DEFAULT),
        ];
        let result = delete_col(&placements, 1, &palette);
        assert_eq!(
            result,
            vec![KeyInstance::new(Point::at(0, 2), KEY_ID_PURL_DEFAULT)]
        );
    }

    #[test]
    fn test_insert_then_delete_restores_grid() {
        let palette = palette();
        let size = GridSize::new(5, 5);
        let placements = vec![
            KeyInstance::new(Point::at(0, 0), KEY_ID_PURL_DEFAULT),
            KeyInstance::new(Point::at(3, 1), "cable"),
        ];
        let grid = compile(&placements, size, &palette);

        let inserted = insert_row(&placements, 2, &grid, size.cols);
        let restored = delete_row(&inserted, 2, &palette);
        assert_eq!(compile(&restored, size, &palette), grid);
    }

    #[test]
    fn test_resize_placements() {
        let palette = palette();
        let placements = vec![
            KeyInstance::new(Point::at(0, 0), "cable"),
            KeyInstance::new(Point::at(2, 2), "cable"),
            KeyInstance::new(Point::at(3, 0), KEY_ID_PURL_DEFAULT),
            KeyInstance::new(Point::at(0, 1), "ghost"),
        ];
        let result = resize_placements(&placements, &palette, GridSize::new(3, 3));
        assert_eq!(
            result,
            vec![
                KeyInstance::new(Point::at(0, 0), "cable"),
                KeyInstance::new(Point::at(2, 2), "cable"),
            ]
        );
    }
}
