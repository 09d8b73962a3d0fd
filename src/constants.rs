//! Application-wide constants.
//!
//! This module defines the application name, the well-known key ids of the
//! built-in palette and the default chart dimensions.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "StitchGrid";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "stitchgrid";

/// Id of the base stitch every compiled cell defaults to.
pub const KEY_ID_KNIT_DEFAULT: &str = "key_knit_default";

/// Id of the built-in purl key.
pub const KEY_ID_PURL_DEFAULT: &str = "key_purl_default";

/// Id of the "no stitch" key used to clear cells.
pub const KEY_ID_EMPTY: &str = "key_empty_no_stitch";

/// Persisted abbreviation value meaning "omit from instructions".
pub const ABBREVIATION_SKIP_SENTINEL: &str = "__ABBR_SKIP__";

/// Initial number of rows for a new sheet.
pub const INITIAL_ROWS: usize = 20;

/// Initial number of columns for a new sheet.
pub const INITIAL_COLS: usize = 20;

/// Upper bound on chart rows.
pub const MAX_CHART_ROWS: usize = 200;

/// Upper bound on chart columns.
pub const MAX_CHART_COLS: usize = 200;

/// Upper bound on a key's width in cells.
pub const MAX_KEY_WIDTH: u32 = 8;

/// Upper bound on a key's height in cells.
pub const MAX_KEY_HEIGHT: u32 = 8;

/// Number of undo snapshots kept by default.
pub const MAX_HISTORY_LENGTH: usize = 50;
