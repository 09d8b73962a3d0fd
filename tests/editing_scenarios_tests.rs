//! Integration tests for chart editing: compilation, placement, structure
//! edits, region transfer and selection expansion working together.

mod fixtures;
use fixtures::*;

use stitchgrid::constants::{KEY_ID_EMPTY, KEY_ID_KNIT_DEFAULT, KEY_ID_PURL_DEFAULT};
use stitchgrid::models::{ChartGrid, GridSize, KeyInstance, KeyPalette, Layer, Point, SelectionRect};
use stitchgrid::services::geometry::footprint;
use stitchgrid::services::{compile, selection, structure, transfer};

fn rect(x1: i32, y1: i32, x2: i32, y2: i32) -> SelectionRect {
    SelectionRect::new(Point::new(x1, y1), Point::new(x2, y2))
}

/// Every cell resolves in the palette and anchor flags only sit on (0,0) parts.
fn assert_consistent(grid: &ChartGrid, palette: &KeyPalette) {
    for row in grid.iter_rows() {
        for cell in row {
            let key = palette
                .get(&cell.key_id)
                .unwrap_or_else(|| panic!("Unresolvable key {} in grid", cell.key_id));
            if cell.is_anchor_cell_for_mxn {
                assert!(cell.is_key_origin(), "Anchor flag away from the key origin");
                assert!(!key.is_single_cell(), "Anchor flag on a single-cell key");
            }
            assert!(cell.key_part_row_offset < key.height);
            assert!(cell.key_part_col_offset < key.width);
        }
    }
}

/// Deterministic sequence for exercising many anchors without a rand dependency.
struct Sequence(u64);

impl Sequence {
    fn next(&mut self, bound: i32) -> i32 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) % u64::from(bound.unsigned_abs())) as i32
    }
}

#[test]
fn test_scenario_cable_placement() {
    let palette = test_palette();
    let size = GridSize::new(5, 5);
    let mut layer = Layer::new("Base Layer", size).unwrap();
    assert!(layer.apply_key(CABLE, Point::at(1, 1), size, &palette));

    let grid = layer.grid();
    let anchor = grid.cell(1, 1).unwrap();
    assert_eq!(anchor.key_id, CABLE);
    assert!(anchor.is_anchor_cell_for_mxn);
    for (row, col, row_off, col_off) in [(1, 2, 0, 1), (2, 1, 1, 0), (2, 2, 1, 1)] {
        let cell = grid.cell(row, col).unwrap();
        assert_eq!(cell.key_id, CABLE);
        assert!(!cell.is_anchor_cell_for_mxn);
        assert_eq!((cell.key_part_row_offset, cell.key_part_col_offset), (row_off, col_off));
    }
    for row in 0..5 {
        for col in 0..5 {
            if !(1..=2).contains(&row) || !(1..=2).contains(&col) {
                assert_eq!(grid.cell(row, col).unwrap().key_id, KEY_ID_KNIT_DEFAULT);
            }
        }
    }
}

#[test]
fn test_scenario_single_key_evicts_cable() {
    let palette = test_palette();
    let size = GridSize::new(5, 5);
    let mut layer = Layer::new("Base Layer", size).unwrap();
    layer.apply_key(CABLE, Point::at(1, 1), size, &palette);
    layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(2, 2), size, &palette);

    let grid = layer.grid();
    assert_eq!(grid.cell(2, 2).unwrap().key_id, KEY_ID_PURL_DEFAULT);
    for (row, col) in [(1, 1), (1, 2), (2, 1)] {
        assert_eq!(grid.cell(row, col).unwrap().key_id, KEY_ID_KNIT_DEFAULT);
    }
    assert!(layer.placements().iter().all(|p| p.key_id != CABLE));
}

#[test]
fn test_scenario_insert_row_clones_previous_row() {
    let palette = test_palette();
    let size = GridSize::new(5, 5);
    let mut layer = Layer::new("Base Layer", size).unwrap();
    for col in 0..5 {
        let key = if col % 2 == 0 { KEY_ID_PURL_DEFAULT } else { KEY_ID_EMPTY };
        layer.apply_key(key, Point::at(1, col), size, &palette);
    }
    layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(3, 4), size, &palette);
    let before = layer.grid().clone();

    let grown = GridSize::new(6, 5);
    let placements = structure::insert_row(layer.placements(), 2, layer.grid(), 5);
    layer.set_placements(placements, grown, &palette);

    let grid = layer.grid();
    assert_eq!(grid.rows(), 6);
    for col in 0..5 {
        assert_eq!(grid.cell(0, col), before.cell(0, col));
        assert_eq!(grid.cell(1, col), before.cell(1, col));
        assert_eq!(grid.cell(2, col).unwrap().key_id, before.cell(1, col).unwrap().key_id);
        for old_row in 2..5 {
            assert_eq!(grid.cell(old_row + 1, col), before.cell(old_row, col));
        }
    }
}

#[test]
fn test_insert_row_below_cable_clones_its_key_ids() {
    let palette = test_palette();
    let size = GridSize::new(5, 5);
    let mut layer = Layer::new("Base Layer", size).unwrap();
    layer.apply_key(CABLE, Point::at(1, 1), size, &palette);
    let template: Vec<String> = (0..5)
        .map(|col| layer.grid().cell(1, col).unwrap().key_id.clone())
        .collect();

    let placements = structure::insert_row(layer.placements(), 2, layer.grid(), 5);
    let synthesized: Vec<String> = (0..5)
        .map(|col| {
            placements
                .iter()
                .find(|p| p.anchor == Point::at(2, col))
                .map(|p| p.key_id.clone())
                .unwrap()
        })
        .collect();
    assert_eq!(synthesized, template);
    assert_eq!(synthesized[1], CABLE);

    layer.set_placements(placements, GridSize::new(6, 5), &palette);
    assert_eq!(layer.grid().cell(2, 1).unwrap().key_id, CABLE);
    assert_eq!(layer.grid().cell(2, 2).unwrap().key_id, CABLE);
    assert_consistent(layer.grid(), &palette);
}

#[test]
fn test_scenario_selection_expansion() {
    let palette = test_palette();
    let size = GridSize::new(5, 5);
    let mut layer = Layer::new("Base Layer", size).unwrap();
    layer.apply_key(CABLE, Point::at(1, 1), size, &palette);

    let expanded = selection::expand(&rect(1, 1, 1, 1), &layer, &palette, size).unwrap();
    assert_eq!(expanded, rect(1, 1, 2, 2));
}

#[test]
fn test_compile_is_deterministic() {
    let palette = test_palette();
    let size = GridSize::new(6, 7);
    let placements = vec![
        KeyInstance::new(Point::at(0, 0), CABLE),
        KeyInstance::new(Point::at(1, 1), KEY_ID_PURL_DEFAULT),
        KeyInstance::new(Point::at(4, 2), WIDE),
        KeyInstance::new(Point::at(5, 6), KEY_ID_EMPTY),
        KeyInstance::new(Point::at(2, 2), "key_unknown"),
    ];
    let first = compile(&placements, size, &palette);
    let second = compile(&placements, size, &palette);
    assert_eq!(first, second);
    assert_consistent(&first, &palette);
}

#[test]
fn test_paint_is_idempotent() {
    let palette = test_palette();
    let size = GridSize::new(6, 6);
    for key in [CABLE, WIDE, KEY_ID_PURL_DEFAULT] {
        let mut once = Layer::new("Base Layer", size).unwrap();
        once.apply_key(key, Point::at(2, 1), size, &palette);
        let mut twice = once.clone();
        twice.apply_key(key, Point::at(2, 1), size, &palette);
        assert_eq!(once.grid(), twice.grid());
        assert_eq!(once.placements(), twice.placements());
    }
}

#[test]
fn test_random_edits_keep_grid_consistent_and_in_bounds() {
    let palette = test_palette();
    let keys = [CABLE, WIDE, KEY_ID_PURL_DEFAULT, KEY_ID_EMPTY, KEY_ID_KNIT_DEFAULT];
    let mut seq = Sequence(42);
    let mut size = GridSize::new(7, 8);
    let mut layer = Layer::new("Base Layer", size).unwrap();

    for step in 0..300 {
        let key = keys[seq.next(keys.len() as i32) as usize];
        let anchor = Point::new(seq.next(10) - 1, seq.next(9) - 1);
        match step % 10 {
            0..=5 => {
                if layer.apply_key(key, anchor, size, &palette) {
                    let placed = KeyInstance::new(anchor, key);
                    if let Some(p) = layer.placements().iter().find(|p| **p == placed) {
                        let footprint = footprint(p.anchor, palette.get(key).unwrap());
                        assert!(footprint.fits_within(size), "Step {step}: {p:?} outside {size:?}");
                    }
                }
            }
            6 => {
                let other = Point::new(seq.next(8), seq.next(7));
                layer.fill_rect(key, &SelectionRect::new(anchor, other), true, size, &palette);
            }
            7 => {
                let data = transfer::capture(&layer, &rect(0, 0, 2, 2), &palette);
                let mut palette = palette.clone();
                transfer::paste(&mut layer, anchor, &data, None, size, &mut palette);
            }
            8 => {
                let dragged =
                    transfer::DraggedCells::capture(&layer, &rect(1, 1, 3, 2), &palette);
                transfer::drop_dragged(&mut layer, &dragged, anchor, size, &palette);
            }
            _ => {
                let index = seq.next(size.rows as i32) as usize;
                let (placements, new_size) = if step % 20 == 9 && size.rows < 12 {
                    (
                        structure::insert_row(layer.placements(), index, layer.grid(), size.cols),
                        GridSize::new(size.rows + 1, size.cols),
                    )
                } else if size.rows > 3 {
                    (
                        structure::delete_row(layer.placements(), index, &palette),
                        GridSize::new(size.rows - 1, size.cols),
                    )
                } else {
                    continue;
                };
                size = new_size;
                layer.set_placements(placements, size, &palette);
            }
        }

        assert_eq!(layer.grid().size(), size);
        assert_consistent(layer.grid(), &palette);
        // Cloned lines may carry multi-cell keys over the edge, but every
        // anchor stays inside the chart.
        for placement in layer.placements() {
            assert!(
                size.contains(placement.anchor),
                "Step {step}: placement {placement:?} outside {size:?}"
            );
        }
    }
}

#[test]
fn test_capture_paste_round_trip() {
    let mut palette = test_palette();
    let size = GridSize::new(6, 6);
    let mut source = Layer::new("Base Layer", size).unwrap();
    source.apply_key(KEY_ID_PURL_DEFAULT, Point::at(1, 2), size, &palette);
    source.apply_key(KEY_ID_EMPTY, Point::at(2, 3), size, &palette);
    source.apply_key(KEY_ID_PURL_DEFAULT, Point::at(3, 1), size, &palette);
    let region = rect(1, 1, 4, 3);

    let data = transfer::capture(&source, &region, &palette);
    let json = data.to_json().unwrap();
    let data = stitchgrid::clipboard::ClipboardData::from_json(&json).unwrap();

    let mut target = Layer::new("Base Layer", size).unwrap();
    transfer::paste(&mut target, region.start, &data, None, size, &mut palette);
    for point in region.cells() {
        assert_eq!(target.grid().cell_at(point), source.grid().cell_at(point));
    }
}

#[test]
fn test_insert_delete_inverse() {
    let palette = test_palette();
    let size = GridSize::new(6, 6);
    let mut layer = Layer::new("Base Layer", size).unwrap();
    layer.apply_key(CABLE, Point::at(0, 0), size, &palette);
    layer.apply_key(WIDE, Point::at(4, 2), size, &palette);
    layer.apply_key(KEY_ID_PURL_DEFAULT, Point::at(5, 5), size, &palette);
    let before = layer.grid().clone();

    for k in [0, 2, 3, 6] {
        let mut edited = layer.clone();
        let grown = GridSize::new(7, 6);
        let inserted = structure::insert_row(edited.placements(), k, edited.grid(), 6);
        edited.set_placements(inserted, grown, &palette);
        let deleted = structure::delete_row(edited.placements(), k, &palette);
        edited.set_placements(deleted, size, &palette);
        assert_eq!(edited.grid(), &before, "Row {k}");

        let mut edited = layer.clone();
        let grown = GridSize::new(6, 7);
        let inserted = structure::insert_col(edited.placements(), k, edited.grid(), 6);
        edited.set_placements(inserted, grown, &palette);
        let deleted = structure::delete_col(edited.placements(), k, &palette);
        edited.set_placements(deleted, size, &palette);
        assert_eq!(edited.grid(), &before, "Column {k}");
    }
}

#[test]
fn test_cut_then_paste_elsewhere() {
    let mut palette = test_palette();
    let size = GridSize::new(6, 6);
    let mut layer = Layer::new("Base Layer", size).unwrap();
    layer.apply_key(CABLE, Point::at(0, 0), size, &palette);

    let (data, changed) = transfer::cut(&mut layer, &rect(0, 0, 1, 1), size, &palette);
    assert!(changed);
    let origin = transfer::clamp_origin(data.width, data.height, size, Point::at(5, 5));
    assert_eq!(origin, Point::at(4, 4));
    transfer::paste(&mut layer, origin, &data, None, size, &mut palette);

    assert_eq!(layer.grid().cell(0, 0).unwrap().key_id, KEY_ID_KNIT_DEFAULT);
    assert!(layer.grid().cell(4, 4).unwrap().is_anchor_cell_for_mxn);
    assert_eq!(layer.grid().cell(5, 5).unwrap().key_id, CABLE);
}
