//! Service layer for chart operations.
//!
//! Services hold the algorithms that act on the models: compiling
//! placements into grids, restructuring sheets, moving regions around and
//! reading/writing documents.

pub mod compiler;
pub mod documents;
pub mod geometry;
pub mod selection;
pub mod structure;
pub mod transfer;

// Re-export commonly used types and functions
pub use compiler::compile;
pub use documents::DocumentService;
pub use transfer::DraggedCells;
