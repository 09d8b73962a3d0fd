//! CLI command handlers for StitchGrid.
//!
//! This module provides headless, scriptable access to the chart engine
//! for automation, testing, and batch editing of chart files.

pub mod chart;
pub mod common;
pub mod edit;
pub mod transfer;

// Re-export types used by main.rs and tests
pub use chart::{InspectArgs, NewArgs, ShowArgs};
pub use common::{CliError, CliResult, ExitCode};
pub use edit::{PlaceArgs, ResizeArgs, StructureArgs, StructureOp};
pub use transfer::{CopyArgs, PasteArgs};
