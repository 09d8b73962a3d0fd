//! Key definitions: the stitch symbols a chart is painted with.

use crate::constants::{ABBREVIATION_SKIP_SENTINEL, MAX_KEY_HEIGHT, MAX_KEY_WIDTH};
use crate::models::KeyColor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a new unique key ID.
pub fn generate_key_id() -> String {
    format!("key_{}", Uuid::new_v4())
}

/// Content of a single cell of a cell-based key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellContent {
    /// Literal text (usually a single glyph)
    Text(String),
    /// Reference to a stitch symbol by id
    Svg(String),
}

/// A point in a key's unit coordinate space `[0,width] × [0,height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// A freeform line segment of a line-based key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Start point
    pub start: LinePoint,
    /// End point
    pub end: LinePoint,
}

impl LineSegment {
    /// Creates a segment from `(x1, y1)` to `(x2, y2)`.
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            start: LinePoint { x: x1, y: y1 },
            end: LinePoint { x: x2, y: y2 },
        }
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        let (w, h) = (f64::from(width), f64::from(height));
        [self.start, self.end]
            .iter()
            .all(|p| (0.0..=w).contains(&p.x) && (0.0..=h).contains(&p.y))
    }
}

/// Visual content of a key: per-cell content or freeform lines, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyVisual {
    /// `height × width` grid of optional cell contents
    Cells(Vec<Vec<Option<CellContent>>>),
    /// Line segments spanning the whole footprint
    Lines(Vec<LineSegment>),
}

impl KeyVisual {
    /// A blank cell grid of the given size.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self::Cells(vec![vec![None; width as usize]; height as usize])
    }
}

/// How a key is named in generated instructions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Abbreviation {
    /// Derive from the key's content
    #[default]
    Auto,
    /// Leave the key out of instructions
    Omit,
    /// Use this text
    Text(String),
}

impl Abbreviation {
    /// Interprets a persisted abbreviation value.
    #[must_use]
    pub fn from_persisted(value: Option<String>) -> Self {
        match value {
            None => Self::Auto,
            Some(s) if s == ABBREVIATION_SKIP_SENTINEL => Self::Omit,
            Some(s) if s.trim().is_empty() => Self::Auto,
            Some(s) => Self::Text(s),
        }
    }

    /// Value written back to persisted data.
    #[must_use]
    pub fn to_persisted(&self) -> Option<String> {
        match self {
            Self::Auto => None,
            Self::Omit => Some(ABBREVIATION_SKIP_SENTINEL.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// A stitch key template that can be placed on the chart.
///
/// # Validation
///
/// - Width and height are at least 1
/// - A cell-based key's grid is exactly `height × width`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "KeyDefinitionRecord", into = "KeyDefinitionRecord")]
pub struct KeyDefinition {
    /// Unique identifier, stable for the document's lifetime
    pub id: String,
    /// Display name (unique within a palette)
    pub name: String,
    /// Instruction abbreviation
    pub abbreviation: Abbreviation,
    /// Footprint width in cells
    pub width: u32,
    /// Footprint height in cells
    pub height: u32,
    /// Cell background color
    pub background_color: KeyColor,
    /// Symbol color
    pub symbol_color: KeyColor,
    /// Visual content
    pub visual: KeyVisual,
}

impl KeyDefinition {
    /// Creates a blank 1×1 key.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            abbreviation: Abbreviation::Auto,
            width: 1,
            height: 1,
            background_color: KeyColor::default_background(),
            symbol_color: KeyColor::default_symbol(),
            visual: KeyVisual::blank(1, 1),
        }
    }

    /// Sets the footprint size, resetting the visual to blank cells.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.clamp(1, MAX_KEY_WIDTH);
        self.height = height.clamp(1, MAX_KEY_HEIGHT);
        self.visual = KeyVisual::blank(self.width, self.height);
        self
    }

    /// Sets the abbreviation.
    #[must_use]
    pub fn with_abbreviation(mut self, abbreviation: Abbreviation) -> Self {
        self.abbreviation = abbreviation;
        self
    }

    /// Sets background and symbol colors.
    #[must_use]
    pub const fn with_colors(mut self, background: KeyColor, symbol: KeyColor) -> Self {
        self.background_color = background;
        self.symbol_color = symbol;
        self
    }

    /// Sets one cell's content, keeping the key cell-based.
    #[must_use]
    pub fn with_cell(mut self, row: u32, col: u32, content: CellContent) -> Self {
        self.set_cell(row, col, Some(content));
        self
    }

    /// Replaces the visual with line segments (clears any cell content).
    #[must_use]
    pub fn with_lines(mut self, lines: Vec<LineSegment>) -> Self {
        self.set_lines(lines);
        self
    }

    /// Sets or clears one cell. Switches a line-based key back to cells.
    pub fn set_cell(&mut self, row: u32, col: u32, content: Option<CellContent>) {
        if row >= self.height || col >= self.width {
            return;
        }
        if !matches!(self.visual, KeyVisual::Cells(_)) {
            self.visual = KeyVisual::blank(self.width, self.height);
        }
        if let KeyVisual::Cells(cells) = &mut self.visual {
            cells[row as usize][col as usize] = content;
        }
    }

    /// Replaces the visual with line segments.
    ///
    /// An empty segment list turns the key into a blank cell-based key.
    pub fn set_lines(&mut self, lines: Vec<LineSegment>) {
        self.visual = if lines.is_empty() {
            KeyVisual::blank(self.width, self.height)
        } else {
            KeyVisual::Lines(lines)
        };
    }

    /// Changes the footprint size within `[1, max]` on each axis.
    ///
    /// Cell grids are padded with blanks or truncated; line segments that
    /// no longer fit inside the new box are dropped.
    pub fn resize(&mut self, width: u32, height: u32, max_width: u32, max_height: u32) {
        self.width = width.clamp(1, max_width.max(1));
        self.height = height.clamp(1, max_height.max(1));
        let (w, h) = (self.width, self.height);

        match &mut self.visual {
            KeyVisual::Cells(cells) => *cells = normalize_cells(std::mem::take(cells), w, h),
            KeyVisual::Lines(lines) => {
                lines.retain(|line| line.fits(w, h));
                if lines.is_empty() {
                    self.visual = KeyVisual::blank(w, h);
                }
            }
        }
    }

    /// Shrinks a key larger than [`MAX_KEY_WIDTH`] × [`MAX_KEY_HEIGHT`]
    /// down to that limit. Returns whether the size changed.
    pub fn enforce_size_limit(&mut self) -> bool {
        if self.width <= MAX_KEY_WIDTH && self.height <= MAX_KEY_HEIGHT {
            return false;
        }
        self.resize(self.width, self.height, MAX_KEY_WIDTH, MAX_KEY_HEIGHT);
        true
    }

    /// Whether the key draws anything (a non-empty cell or any line).
    #[must_use]
    pub fn is_contentful(&self) -> bool {
        match &self.visual {
            KeyVisual::Cells(cells) => cells.iter().flatten().any(Option::is_some),
            KeyVisual::Lines(lines) => !lines.is_empty(),
        }
    }

    /// Whether the key occupies exactly one cell.
    #[must_use]
    pub const fn is_single_cell(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Footprint area in cells.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Cell content at a position within the key's own coordinate space.
    #[must_use]
    pub fn cell_content(&self, row_offset: u32, col_offset: u32) -> Option<&CellContent> {
        match &self.visual {
            KeyVisual::Cells(cells) => cells
                .get(row_offset as usize)
                .and_then(|row| row.get(col_offset as usize))
                .and_then(Option::as_ref),
            KeyVisual::Lines(_) => None,
        }
    }

    /// Abbreviation to print in generated instructions, `None` when omitted.
    #[must_use]
    pub fn instruction_abbreviation(&self) -> Option<String> {
        match &self.abbreviation {
            Abbreviation::Omit => None,
            Abbreviation::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => Some(self.derived_abbreviation()),
        }
    }

    fn derived_abbreviation(&self) -> String {
        let name_initial = || {
            self.name
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
        };

        if matches!(self.visual, KeyVisual::Lines(_)) {
            return "Draw".to_string();
        }

        let from_content = match self.cell_content(0, 0) {
            Some(CellContent::Text(text)) => text.chars().next().map(String::from),
            Some(CellContent::Svg(symbol)) => symbol
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string()),
            None => None,
        };

        from_content
            .or_else(name_initial)
            .unwrap_or_else(|| "?".to_string())
    }
}

/// Pads or truncates a cell grid to exactly `height × width`.
pub(crate) fn normalize_cells(
    mut cells: Vec<Vec<Option<CellContent>>>,
    width: u32,
    height: u32,
) -> Vec<Vec<Option<CellContent>>> {
    cells.resize_with(height as usize, Vec::new);
    for row in &mut cells {
        row.resize(width as usize, None);
    }
    cells
}

/// Persisted shape of a key definition (`cells` and `lines` as optional fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyDefinitionRecord {
    #[serde(default = "generate_key_id")]
    id: String,
    #[serde(default = "default_key_name")]
    name: String,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(default = "default_dimension")]
    width: u32,
    #[serde(default = "default_dimension")]
    height: u32,
    #[serde(default = "KeyColor::default_background")]
    background_color: KeyColor,
    #[serde(default = "KeyColor::default_symbol")]
    symbol_color: KeyColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cells: Option<Vec<Vec<Option<CellContent>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<LineSegment>>,
}

fn default_key_name() -> String {
    "Untitled Key".to_string()
}

const fn default_dimension() -> u32 {
    1
}

impl From<KeyDefinitionRecord> for KeyDefinition {
    fn from(record: KeyDefinitionRecord) -> Self {
        let width = record.width.clamp(1, MAX_KEY_WIDTH);
        let height = record.height.clamp(1, MAX_KEY_HEIGHT);
        let clamped = width != record.width.max(1) || height != record.height.max(1);

        // Non-empty lines win over cells. A shrunk key keeps only the lines
        // inside its new box.
        let lines = record.lines.map(|mut lines| {
            if clamped {
                lines.retain(|line| line.fits(width, height));
            }
            lines
        });
        let visual = match lines {
            Some(lines) if !lines.is_empty() => KeyVisual::Lines(lines),
            _ => KeyVisual::Cells(normalize_cells(
                record.cells.unwrap_or_default(),
                width,
                height,
            )),
        };

        Self {
            id: record.id,
            name: record.name,
            abbreviation: Abbreviation::from_persisted(record.abbreviation),
            width,
            height,
            background_color: record.background_color,
            symbol_color: record.symbol_color,
            visual,
        }
    }
}

impl From<KeyDefinition> for KeyDefinitionRecord {
    fn from(key: KeyDefinition) -> Self {
        let (cells, lines) = match key.visual {
            KeyVisual::Cells(cells) => (Some(cells), None),
            KeyVisual::Lines(lines) => (None, Some(lines)),
        };

        Self {
            id: key.id,
            name: key.name,
            abbreviation: key.abbreviation.to_persisted(),
            width: key.width,
            height: key.height,
            background_color: key.background_color,
            symbol_color: key.symbol_color,
            cells,
            lines,
        }
    }
}
