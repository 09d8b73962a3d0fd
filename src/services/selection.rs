//! Selection expansion so a selection never cuts through a multi-cell key.

use crate::constants::KEY_ID_EMPTY;
use crate::models::{GridSize, KeyPalette, Layer, SelectionRect};
use crate::services::geometry::{footprint, Footprint};

/// Passes attempted before giving up on reaching a fixed point.
const MIN_EXPANSION_PASSES: usize = 5;

/// Grows a selection until it fully encloses every multi-cell key it touches.
///
/// Growing over one key can newly touch another, so the scan repeats until
/// a pass changes nothing or the pass limit is hit. The result is clamped to
/// the grid; `None` means the raw selection lies entirely outside it.
#[must_use]
pub fn expand(
    raw: &SelectionRect,
    layer: &Layer,
    palette: &KeyPalette,
    size: GridSize,
) -> Option<SelectionRect> {
    let footprints: Vec<Footprint> = layer
        .placements()
        .iter()
        .filter(|p| p.key_id != KEY_ID_EMPTY)
        .filter_map(|p| {
            let key = palette.get(&p.key_id)?;
            (!key.is_single_cell()).then(|| footprint(p.anchor, key))
        })
        .collect();

    let mut selection = raw.normalized();
    let max_passes = MIN_EXPANSION_PASSES.max(layer.placements().len() / 2);
    let mut passes = 0;
    loop {
        let mut changed = false;
        for fp in &footprints {
            let current = Footprint::of_rect(&selection);
            if fp.overlaps(&current) {
                let grown = selection.union(&fp.to_rect());
                if grown != selection {
                    selection = grown;
                    changed = true;
                }
            }
        }
        passes += 1;
        if !changed {
            break;
        }
        if passes >= max_passes {
            tracing::warn!(passes, "Selection expansion stopped before reaching a fixed point");
            break;
        }
    }

    selection.clamped(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeyDefinition, Point};

    const SIZE: GridSize = GridSize::new(8, 8);

    fn palette() -> KeyPalette {
        let mut palette = KeyPalette::initial();
        palette.add_or_update(KeyDefinition::new("cable", "Cable").with_size(2, 2));
        palette.add_or_update(KeyDefinition::new("wide", "Wide").with_size(3, 1));
        palette
    }

    fn select(x1: i32, y1: i32, x2: i32, y2: i32) -> SelectionRect {
        SelectionRect::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_expand_over_single_key() {
        let palette = palette();
        let mut layer = Layer::new("Base Layer", SIZE).unwrap();
        layer.apply_key("cable", Point::at(1, 1), SIZE, &palette);

        let expanded = expand(&select(2, 2, 2, 2), &layer, &palette, SIZE).unwrap();
        assert_eq!(expanded, select(1, 1, 2, 2));

        let untouched = expand(&select(4, 4, 5, 5), &layer, &palette, SIZE).unwrap();
        assert_eq!(untouched, select(4, 4, 5, 5));
    }

    #[test]
    fn test_expand_follows_chained_keys() {
        let palette = palette();
        let mut layer = Layer::new("Base Layer", SIZE).unwrap();
        // Placed so the right-hand cable is only reached on a second pass.
        layer.apply_key("cable", Point::at(0, 3), SIZE, &palette);
        layer.apply_key("cable", Point::at(0, 0), SIZE, &palette);
        layer.apply_key("wide", Point::at(2, 1), SIZE, &palette);

        let expanded = expand(&select(0, 0, 0, 0), &layer, &palette, SIZE).unwrap();
        assert_eq!(expanded, select(0, 0, 1, 1));

        let expanded = expand(&select(1, 1, 1, 2), &layer, &palette, SIZE).unwrap();
        assert_eq!(expanded, select(0, 0, 4, 2));
    }

    #[test]
    fn test_expand_ignores_single_cell_keys() {
        let palette = palette();
        let mut layer = Layer::new("Base Layer", SIZE).unwrap();
        layer.apply_key(crate::constants::KEY_ID_PURL_DEFAULT, Point::at(3, 3), SIZE, &palette);
        let expanded = expand(&select(3, 3, 3, 3), &layer, &palette, SIZE).unwrap();
        assert!(expanded.is_single_cell());
    }

    #[test]
    fn test_expand_clamps_to_grid() {
        let palette = palette();
        let layer = Layer::new("Base Layer", SIZE).unwrap();
        let expanded = expand(&select(-2, 6, 3, 12), &layer, &palette, SIZE).unwrap();
        assert_eq!(expanded, select(0, 6, 3, 7));
        assert!(expand(&select(9, 9, 10, 10), &layer, &palette, SIZE).is_none());
    }
}
