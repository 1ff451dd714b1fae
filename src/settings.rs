//! Settings persistence for the main window
//!
//! Settings live in a JSON file under the platform config directory derived
//! from the process identity. Non-production builds use a separate
//! directory so development runs never touch real user settings:
//! - Linux Production: ~/.config/avogadro/settings.json
//! - Linux Test/Debug: ~/.config/avogadro-test/settings.json
//! - macOS: ~/Library/Application Support/org.OpenChemistry.Avogadro/settings.json
//! - Windows: %APPDATA%\OpenChemistry\Avogadro\config\settings.json

use crate::system::identity::ProcessIdentity;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_RECENT_FILES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WindowSettings {
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    800
}

/// Smallest window restored from disk
const MIN_WINDOW_WIDTH: u32 = 320;
const MIN_WINDOW_HEIGHT: u32 = 240;

/// SDL refuses windows larger than this on either axis
const MAX_WINDOW_EXTENT: u32 = 16384;

impl WindowSettings {
    /// Geometry SDL will accept, whatever was saved
    pub fn clamped(&self) -> Self {
        Self {
            width: self.width.clamp(MIN_WINDOW_WIDTH, MAX_WINDOW_EXTENT),
            height: self.height.clamp(MIN_WINDOW_HEIGHT, MAX_WINDOW_EXTENT),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub window: WindowSettings,
    /// Most recent first
    #[serde(default)]
    pub recent_files: Vec<String>,
}

impl Settings {
    /// Move `path` to the front of the recent files list
    pub fn add_recent_file(&mut self, path: &str) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_string());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

fn get_settings_file_path(identity: &ProcessIdentity) -> Result<PathBuf, String> {
    #[cfg(production)]
    let app_name = identity.application_name.clone();

    #[cfg(not(production))]
    let app_name = format!("{}-test", identity.application_name);

    let proj_dirs = ProjectDirs::from(identity.qualifier(), &identity.organization_name, &app_name)
        .ok_or_else(|| "Failed to determine config directory".to_string())?;

    Ok(proj_dirs.config_dir().join("settings.json"))
}

pub fn load_settings(identity: &ProcessIdentity) -> Result<Settings, String> {
    load_settings_from(&get_settings_file_path(identity)?)
}

pub fn save_settings(identity: &ProcessIdentity, settings: &Settings) -> Result<(), String> {
    save_settings_to(&get_settings_file_path(identity)?, settings)
}

/// Missing file means defaults; a file that exists but does not parse is an error
pub fn load_settings_from(path: &Path) -> Result<Settings, String> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| format!("Failed to read settings file: {}", e))?;

    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse settings file: {}", e))
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| format!("Failed to serialize settings: {}", e))?;

    fs::write(path, json).map_err(|e| format!("Failed to write settings file: {}", e))
}
