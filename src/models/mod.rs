//! Data models for stitch keys, layers, sheets and documents.
//!
//! This module contains all the core data structures used throughout the application.
//! Models are independent of the CLI and of persistence details; operations
//! that compile or restructure grids live in [`crate::services`].

pub mod chart;
pub mod color;
pub mod document;
pub mod grid;
pub mod key;
pub mod layer;
pub mod palette;
pub mod selection;

// Re-export all model types
pub use chart::{ChartState, KeyUsage, Orientation};
pub use color::{KeyColor, RgbColor, ThemeColors};
pub use document::Document;
pub use grid::{ChartCell, ChartGrid, GridSize, Point};
pub use key::{Abbreviation, CellContent, KeyDefinition, KeyVisual, LinePoint, LineSegment};
pub use layer::{KeyInstance, Layer};
pub use palette::KeyPalette;
pub use selection::SelectionRect;
