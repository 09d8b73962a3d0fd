//! StitchGrid Library
//!
//! Core of a knitting chart editor: a palette of stitch keys, layers of key
//! placements compiled into cell grids, structural row/column editing,
//! region copy/paste/drag, undo history and JSON chart files.

// Module declarations
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod constants;
pub mod editor;
pub mod history;
pub mod models;
pub mod services;
