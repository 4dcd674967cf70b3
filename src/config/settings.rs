//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::flow::NextActionPolicy;
use crate::pcb::render::MAX_CANVAS_PX;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Path to the JSON board file. Without one the board lives only in memory.
    #[serde(default)]
    pub board_path: Option<PathBuf>,

    /// Name given to a new, empty board.
    #[serde(default = "default_board_name")]
    pub board_name: String,

    /// Write the board file after every committed change.
    #[serde(default = "default_true")]
    pub autosave: bool,

    /// Flow behaviour.
    #[serde(default)]
    pub flow: FlowConfig,

    /// Board image rendering.
    #[serde(default)]
    pub render: RenderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            _schema: None,
            _comment: None,
            board_path: None,
            board_name: default_board_name(),
            autosave: default_true(),
            flow: FlowConfig::default(),
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "board_name must not be empty".to_string(),
            });
        }
        self.render.validate()
    }
}

fn default_board_name() -> String {
    "untitled".to_string()
}

const fn default_true() -> bool {
    true
}

/// Flow configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    /// Anchor for the next-action hint: "last_registered" or "executed".
    #[serde(default)]
    pub next_action: NextActionPolicy,
}

/// Render configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    #[serde(default = "default_canvas_px")]
    pub width: u32,

    /// Canvas height in pixels.
    #[serde(default = "default_canvas_px")]
    pub height: u32,

    /// Blank border around the board in pixels.
    #[serde(default = "default_margin_px")]
    pub margin_px: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_px(),
            height: default_canvas_px(),
            margin_px: default_margin_px(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > MAX_CANVAS_PX {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "render.{name} must be between 1 and {MAX_CANVAS_PX}, got {value}"
                    ),
                });
            }
        }
        if self.margin_px.saturating_mul(2) >= self.width.min(self.height) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "render.margin_px {} leaves no room on a {}x{} canvas",
                    self.margin_px, self.width, self.height
                ),
            });
        }
        Ok(())
    }
}

const fn default_canvas_px() -> u32 {
    800
}

const fn default_margin_px() -> u32 {
    20
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
