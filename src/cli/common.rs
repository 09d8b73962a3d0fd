//! Shared types and helpers for CLI commands.

use crate::models::{Document, Point};
use crate::services::DocumentService;
use std::fmt;
use std::path::Path;

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Input was understood but rejected (unknown key, bad index, policy)
    Validation = 1,
    /// A file could not be read, parsed or written
    Io = 2,
    /// Arguments were malformed
    Usage = 3,
}

impl ExitCode {
    /// Numeric code passed to the OS.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// A command failure with the exit code it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code for the process
    pub kind: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// A rejected request.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// A file system or parse failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Io,
            message: message.into(),
        }
    }

    /// A malformed argument.
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Usage,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        self.kind
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Loads a chart document.
pub fn load_document(path: &Path) -> CliResult<Document> {
    DocumentService::load(path).map_err(|e| CliError::io(format!("Failed to load chart: {e:#}")))
}

/// Saves a chart document in place.
pub fn save_document(document: &Document, path: &Path) -> CliResult<()> {
    DocumentService::save(document, path)
        .map_err(|e| CliError::io(format!("Failed to save chart: {e:#}")))
}

/// Makes the named sheet (and optionally layer) the edit target.
///
/// Without names the document's own active sheet and layer are used.
pub fn select_target(
    document: &mut Document,
    sheet: Option<&str>,
    layer: Option<&str>,
) -> CliResult<()> {
    if let Some(name) = sheet {
        let id = document
            .sheet_by_name(name)
            .map(|s| s.id.clone())
            .ok_or_else(|| CliError::validation(format!("Sheet '{name}' not found")))?;
        document
            .select_sheet(&id)
            .map_err(|e| CliError::validation(e.to_string()))?;
    }

    if let Some(name) = layer {
        let sheet = document
            .active_sheet_mut()
            .ok_or_else(|| CliError::validation("Chart has no sheets"))?;
        let id = sheet
            .layer_by_name(name)
            .map(|l| l.id.clone())
            .ok_or_else(|| CliError::validation(format!("Layer '{name}' not found")))?;
        sheet
            .select_layer(&id)
            .map_err(|e| CliError::validation(e.to_string()))?;
    }
    Ok(())
}

/// Parses a `ROW,COL` cell reference into a point.
pub fn parse_cell(value: &str) -> CliResult<Point> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| CliError::usage(format!("Invalid cell '{value}', expected ROW,COL")))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| CliError::usage(format!("Invalid cell '{value}', expected ROW,COL")))
    };
    Ok(Point::at(parse(row)?, parse(col)?))
}

/// Prints a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{text}");
    Ok(())
}
