//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/caderno/config.yaml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::overlay::{OverlayConfig, Size};

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Inactivity window before an edit is saved, in milliseconds
    pub debounce_ms: u64,
    /// Maximum preview length in list views, in characters
    pub preview_length: usize,
    /// Gap between the selection and the link overlay, in pixels
    pub overlay_offset: f32,
    pub overlay_width: f32,
    pub overlay_height: f32,
    /// Viewport assumed by headless surfaces
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Where notes are stored (defaults to the platform data directory)
    pub notes_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: crate::persistence::DEFAULT_DEBOUNCE_MS,
            preview_length: 120,
            overlay_offset: 10.0,
            overlay_width: 320.0,
            overlay_height: 40.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            notes_dir: None,
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to a file
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn overlay(&self) -> OverlayConfig {
        OverlayConfig::new(self.overlay_width, self.overlay_height).with_offset(self.overlay_offset)
    }

    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }

    /// Configured notes directory, or the platform default
    pub fn resolved_notes_dir(&self) -> Option<PathBuf> {
        self.notes_dir
            .clone()
            .or_else(crate::config_paths::default_notes_dir)
    }
}
