//! Key colors: literal hex values and theme-relative sentinels.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted value for "match grid-line color" (visually transparent).
pub const GRID_LINE_SENTINEL: &str = "transparent_grid_bg";
/// Persisted value for "match theme default cell background".
pub const THEME_BACKGROUND_SENTINEL: &str = "theme_default_background";
/// Persisted value for "match theme default symbol color".
pub const THEME_SYMBOL_SENTINEL: &str = "theme_default_symbol_color";

/// RGB color value with hex string representation.
///
/// Represents a color using red, green, and blue channels (0-255 each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl RgbColor {
    /// Creates a new `RgbColor` from individual channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses an `RgbColor` from a hex string.
    ///
    /// Supports formats: "#RRGGBB", "RRGGBB", "#RGB", "RGB" (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use stitchgrid::models::RgbColor;
    ///
    /// let color = RgbColor::from_hex("#FAF9F6").unwrap();
    /// assert_eq!(color, RgbColor::new(250, 249, 246));
    ///
    /// let color = RgbColor::from_hex("#0f0").unwrap();
    /// assert_eq!(color, RgbColor::new(0, 255, 0));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid hex color format.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => anyhow::bail!(
                "Invalid hex color format '{hex}'. Expected 3 or 6 hex digits (RGB or RRGGBB)"
            ),
        };

        let channel = |range: std::ops::Range<usize>, name: &str| {
            expanded
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .context(format!("Invalid {name} channel in hex color '{hex}'"))
        };

        Ok(Self::new(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    /// Converts the color to a hex string in the format "#RRGGBB" (uppercase).
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Concrete colors a theme supplies for sentinel resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    /// Default cell background
    pub cell_background: RgbColor,
    /// Default symbol (stitch) color
    pub symbol: RgbColor,
    /// Grid line color
    pub grid_line: RgbColor,
}

impl ThemeColors {
    /// Light theme defaults.
    pub const LIGHT: Self = Self {
        cell_background: RgbColor::new(0xFA, 0xF9, 0xF6),
        symbol: RgbColor::new(0x1F, 0x29, 0x37),
        grid_line: RgbColor::new(0xD1, 0xD5, 0xDB),
    };

    /// Dark theme defaults.
    pub const DARK: Self = Self {
        cell_background: RgbColor::new(0x37, 0x41, 0x51),
        symbol: RgbColor::new(0xE5, 0xE7, 0xEB),
        grid_line: RgbColor::new(0x4B, 0x55, 0x63),
    };
}

/// Color of a key's background or symbol.
///
/// Sentinels are stored unresolved and only turned into concrete colors
/// by [`KeyColor::resolve`] at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyColor {
    /// A literal color
    Hex(RgbColor),
    /// Match the grid-line color (visually transparent)
    GridLine,
    /// Match the theme's default cell background
    ThemeBackground,
    /// Match the theme's default symbol color
    ThemeSymbol,
}

impl KeyColor {
    /// Parses a persisted color value, recognising the sentinel strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a sentinel nor a hex color.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            GRID_LINE_SENTINEL => Ok(Self::GridLine),
            THEME_BACKGROUND_SENTINEL => Ok(Self::ThemeBackground),
            THEME_SYMBOL_SENTINEL => Ok(Self::ThemeSymbol),
            other => RgbColor::from_hex(other).map(Self::Hex),
        }
    }

    /// Resolves this color against a theme.
    #[must_use]
    pub const fn resolve(&self, theme: &ThemeColors) -> RgbColor {
        match self {
            Self::Hex(color) => *color,
            Self::GridLine => theme.grid_line,
            Self::ThemeBackground => theme.cell_background,
            Self::ThemeSymbol => theme.symbol,
        }
    }

    /// Default background for newly loaded or created keys.
    #[must_use]
    pub const fn default_background() -> Self {
        Self::Hex(ThemeColors::LIGHT.cell_background)
    }

    /// Default symbol color for newly loaded or created keys.
    #[must_use]
    pub const fn default_symbol() -> Self {
        Self::Hex(ThemeColors::LIGHT.symbol)
    }
}

impl TryFrom<String> for KeyColor {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<KeyColor> for String {
    fn from(color: KeyColor) -> Self {
        match color {
            KeyColor::Hex(rgb) => rgb.to_hex(),
            KeyColor::GridLine => GRID_LINE_SENTINEL.to_string(),
            KeyColor::ThemeBackground => THEME_BACKGROUND_SENTINEL.to_string(),
            KeyColor::ThemeSymbol => THEME_SYMBOL_SENTINEL.to_string(),
        }
    }
}
