//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    APP_NAME, INITIAL_COLS, INITIAL_ROWS, MAX_CHART_COLS, MAX_CHART_ROWS, MAX_HISTORY_LENGTH,
    MAX_KEY_HEIGHT, MAX_KEY_WIDTH,
};
use crate::models::{GridSize, ThemeColors};

/// Theme display mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    /// Follow the OS theme; headless sessions use the light palette
    #[default]
    Auto,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

impl ThemeMode {
    /// Colors that theme-relative key colors resolve against.
    #[must_use]
    pub const fn colors(self) -> ThemeColors {
        match self {
            Self::Dark => ThemeColors::DARK,
            Self::Auto | Self::Light => ThemeColors::LIGHT,
        }
    }
}

/// Chart size defaults and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Rows of a newly created sheet
    pub default_rows: usize,
    /// Columns of a newly created sheet
    pub default_cols: usize,
    /// Largest row count a resize may produce
    pub max_rows: usize,
    /// Largest column count a resize may produce
    pub max_cols: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_rows: INITIAL_ROWS,
            default_cols: INITIAL_COLS,
            max_rows: MAX_CHART_ROWS,
            max_cols: MAX_CHART_COLS,
        }
    }
}

/// Key editor limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Widest key the editor allows
    pub max_key_width: u32,
    /// Tallest key the editor allows
    pub max_key_height: u32,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            max_key_width: MAX_KEY_WIDTH,
            max_key_height: MAX_KEY_HEIGHT,
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Snapshots kept before the oldest is dropped
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_HISTORY_LENGTH,
        }
    }
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Theme mode preference (Auto, Dark, Light)
    #[serde(default)]
    pub theme_mode: ThemeMode,
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/StitchGrid/config.toml`
/// - macOS: `~/Library/Application Support/StitchGrid/config.toml`
/// - Windows: `%APPDATA%\StitchGrid\config.toml`
///
/// # Validation
///
/// - Every size and limit is positive
/// - Default chart size does not exceed the maximum
/// - Key size limits do not exceed the maximum chart size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chart size settings
    #[serde(default)]
    pub chart: ChartConfig,
    /// Key editor settings
    #[serde(default)]
    pub keys: KeyConfig,
    /// Undo history settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/StitchGrid/`
    /// - macOS: `~/Library/Application Support/StitchGrid/`
    /// - Windows: `%APPDATA%\StitchGrid\`
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the platform config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from a specific file, with defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the platform config file.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or writing fails.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to a specific file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or writing fails.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        let chart = &self.chart;
        if chart.max_rows > MAX_CHART_ROWS || chart.max_cols > MAX_CHART_COLS {
            anyhow::bail!(
                "Maximum chart size cannot exceed {}x{}",
                MAX_CHART_ROWS,
                MAX_CHART_COLS
            );
        }
        if chart.default_rows == 0 || chart.default_cols == 0 {
            anyhow::bail!("Default chart size must be at least 1x1");
        }
        if chart.default_rows > chart.max_rows || chart.default_cols > chart.max_cols {
            anyhow::bail!(
                "Default chart size {}x{} exceeds the maximum {}x{}",
                chart.default_rows,
                chart.default_cols,
                chart.max_rows,
                chart.max_cols
            );
        }

        let keys = &self.keys;
        if keys.max_key_width == 0 || keys.max_key_height == 0 {
            anyhow::bail!("Maximum key size must be at least 1x1");
        }
        if keys.max_key_width > MAX_KEY_WIDTH || keys.max_key_height > MAX_KEY_HEIGHT {
            anyhow::bail!(
                "Maximum key size cannot exceed {}x{}",
                MAX_KEY_WIDTH,
                MAX_KEY_HEIGHT
            );
        }
        if keys.max_key_width as usize > chart.max_cols
            || keys.max_key_height as usize > chart.max_rows
        {
            anyhow::bail!("Maximum key size cannot exceed the maximum chart size");
        }

        if self.history.max_entries == 0 {
            anyhow::bail!("History must keep at least one entry");
        }

        Ok(())
    }

    /// Size of newly created sheets.
    #[must_use]
    pub const fn default_chart_size(&self) -> GridSize {
        GridSize::new(self.chart.default_rows, self.chart.default_cols)
    }

    /// Clamps a requested chart size into `1..=max` on both axes.
    #[must_use]
    pub fn clamp_chart_size(&self, rows: usize, cols: usize) -> GridSize {
        GridSize::new(
            rows.clamp(1, self.chart.max_rows),
            cols.clamp(1, self.chart.max_cols),
        )
    }
}
