//! Clipboard functionality for stitch region copy/cut/paste operations.
//!
//! [`ClipboardData`] is the palette-independent capture of a chart region.
//! [`ChartClipboard`] holds it inside an editing session, and
//! [`SystemClipboard`] moves it through the OS clipboard as JSON so it can
//! be pasted into another window or session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{KeyDefinition, KeyInstance, Point, SelectionRect};

/// A captured chart region.
///
/// Anchors are relative to the capture's own top-left corner, and every key
/// referenced is carried along so the data can be pasted against a palette
/// that lacks those keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardData {
    /// Captured placements, anchors relative to the capture origin
    pub relative_key_instances: Vec<KeyInstance>,
    /// Width of the captured rectangle
    pub width: u32,
    /// Height of the captured rectangle
    pub height: u32,
    /// Full definitions of every key referenced
    #[serde(default)]
    pub source_key_definitions: Vec<KeyDefinition>,
}

impl ClipboardData {
    /// Serializes to the JSON text exchanged with the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize clipboard data")
    }

    /// Parses clipboard JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a stitch clipboard payload.
    pub fn from_json(text: &str) -> Result<Self> {
        let data: Self =
            serde_json::from_str(text).context("Clipboard does not contain stitch chart data")?;
        if data.width == 0 || data.height == 0 {
            anyhow::bail!(
                "Clipboard region must be at least 1x1 (got {}x{})",
                data.width,
                data.height
            );
        }
        Ok(data)
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relative_key_instances.is_empty()
    }
}

/// Clipboard state for an editing session.
#[derive(Debug, Clone, Default)]
pub struct ChartClipboard {
    content: Option<ClipboardData>,
    /// Region the content was cut from (for visual feedback)
    cut_source: Option<SelectionRect>,
}

impl ChartClipboard {
    /// Create a new empty clipboard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: None,
            cut_source: None,
        }
    }

    /// Stores copied data.
    ///
    /// Returns a description of what was copied for status message.
    pub fn copy(&mut self, data: ClipboardData) -> String {
        self.cut_source = None;
        let message = format!(
            "Copied {}x{} region ({} keys)",
            data.width,
            data.height,
            data.relative_key_instances.len()
        );
        self.content = Some(data);
        message
    }

    /// Stores data cut from `source`.
    pub fn cut(&mut self, data: ClipboardData, source: SelectionRect) -> String {
        let message = format!(
            "Cut {}x{} region ({} keys)",
            data.width,
            data.height,
            data.relative_key_instances.len()
        );
        self.content = Some(data);
        self.cut_source = Some(source.normalized());
        message
    }

    /// Check if there is content to paste.
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Check if this is a cut operation (vs copy).
    #[must_use]
    pub const fn is_cut(&self) -> bool {
        self.cut_source.is_some()
    }

    /// Get the clipboard content for pasting.
    #[must_use]
    pub const fn content(&self) -> Option<&ClipboardData> {
        self.content.as_ref()
    }

    /// Check if a cell lies in the cut source (for visual feedback).
    #[must_use]
    pub fn is_cut_source(&self, point: Point) -> bool {
        self.cut_source.is_some_and(|rect| rect.contains(point))
    }

    /// Clear the cut source after paste.
    /// The clipboard content is kept so the same data can be pasted again.
    pub fn clear_cut_source(&mut self) {
        self.cut_source = None;
    }

    /// Clear the entire clipboard.
    pub fn clear(&mut self) {
        self.content = None;
        self.cut_source = None;
    }
}

/// The operating system clipboard, carrying [`ClipboardData`] as JSON text.
pub struct SystemClipboard;

impl SystemClipboard {
    /// Writes data to the OS clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if no system clipboard is available.
    pub fn write(data: &ClipboardData) -> Result<()> {
        let text = data.to_json()?;
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .context("Failed to copy to system clipboard")
    }

    /// Reads data from the OS clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if no clipboard is available or it holds other content.
    pub fn read() -> Result<ClipboardData> {
        let text = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.get_text())
            .context("Failed to read system clipboard")?;
        ClipboardData::from_json(&text)
    }
}
