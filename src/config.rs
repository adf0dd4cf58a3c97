use std::path::{Path, PathBuf};
use std::time::Duration;

use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::PANEL_ASPECT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration. Every section falls back to its defaults, so a
/// config file only needs the keys it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZineConfig {
    pub editor: EditorConfig,
    pub print: PrintConfig,
    pub storage: StorageConfig,
}

impl ZineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Drawing surface size in scene units
    pub surface_width: f32,
    pub surface_height: f32,
    /// Quiet period before an autosave fires
    pub autosave_delay_ms: u64,
    /// Scale of the grid thumbnail relative to the surface
    pub thumbnail_scale: f32,
    /// Text inserted by a click in text mode
    pub text_placeholder: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface_width: 450.0,
            surface_height: 600.0,
            autosave_delay_ms: 300,
            thumbnail_scale: 0.3,
            text_placeholder: "Type here".to_owned(),
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn surface_size(&self) -> Vec2 {
        vec2(self.surface_width, self.surface_height)
    }

    /// Pick a 3:4 surface size that fits a viewport next to the editor chrome.
    pub fn surface_size_for_viewport(viewport_width: f32, viewport_height: f32) -> Vec2 {
        let available_height = viewport_height - 120.0;
        let available_width = viewport_width - 280.0;

        let mut height = (available_height * 0.85).min(700.0);
        let mut width = height * PANEL_ASPECT;

        if width > available_width * 0.9 {
            width = available_width * 0.9;
            height = width / PANEL_ASPECT;
        }

        vec2(width.max(300.0).floor(), height.max(400.0).floor())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub page_width_in: f32,
    pub page_height_in: f32,
    pub margin_in: f32,
    pub dpi: u32,
    /// Gray level (0-255) of the cut guides
    pub guide_gray: u8,
    pub guide_width_in: f32,
    /// Dash on/off lengths of the cut guides
    pub guide_dash_in: [f32; 2],
    pub file_name: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            page_width_in: 11.0,
            page_height_in: 8.5,
            margin_in: 0.25,
            dpi: 300,
            guide_gray: 150,
            guide_width_in: 0.01,
            guide_dash_in: [0.1, 0.05],
            file_name: "magic-fold-zine.pdf".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Name of the persisted record
    pub key: String,
    /// Directory for file-backed storage
    pub dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: "magic-fold-zine".to_owned(),
            dir: None,
        }
    }
}
