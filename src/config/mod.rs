//! Application state persistence
//!
//! Figure Forge remembers a small amount of state between runs: recently
//! opened figure files, the plugin directory, an optional schema override and
//! a few UI preferences.
//!
//! # Location
//!
//! State is stored in the platform configuration directory:
//! - **Linux**: `~/.config/dev.figureforge.figure-forge/`
//! - **macOS**: `~/Library/Application Support/dev.figureforge.figure-forge/`
//! - **Windows**: `%APPDATA%\dev.figureforge.figure-forge\`
//!
//! Set `FIGURE_FORGE_CONFIG_DIR` to use another directory.
//!
//! # Example
//!
//! ```ignore
//! use figure_forge::config::AppState;
//!
//! let mut state = AppState::load_or_default();
//! state.add_recent_file("plots/summary.forge");
//! state.save()?;
//! ```

use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Application identifier for configuration directories
pub const APP_ID: &str = "dev.figureforge.figure-forge";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "FIGURE_FORGE_CONFIG_DIR";

/// Name of the plugin directory inside the configuration directory
pub const PLUGIN_DIR_NAME: &str = "plugins";

/// Maximum number of recent files to remember
pub const MAX_RECENT_FILES: usize = 10;

// ==================== Config Directory ====================

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs_next::config_dir().map(|p| p.join(APP_ID)),
    }
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().ok_or_else(|| {
        ForgeError::Config("Could not determine configuration directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            ForgeError::Config(format!("Failed to create configuration directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(APP_STATE_FILE))
}

/// Default location for user plugins
pub fn default_plugin_dir() -> Option<PathBuf> {
    config_dir().map(|p| p.join(PLUGIN_DIR_NAME))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ==================== Recent File Entry ====================

/// A recently opened figure file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentFile {
    pub path: PathBuf,

    /// Display name (file name)
    pub name: String,

    /// Last opened timestamp (Unix seconds)
    pub last_opened: u64,
}

impl RecentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            last_opened: unix_now(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

// ==================== App State ====================

/// Persistent application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Recently opened figure files, most recent first
    #[serde(default)]
    pub recent_files: Vec<RecentFile>,

    #[serde(default)]
    pub last_figure_path: Option<PathBuf>,

    /// Directory scanned for `*.rhai` plugins
    #[serde(default)]
    pub plugin_dir: Option<PathBuf>,

    /// Schema document used instead of the built-in one
    #[serde(default)]
    pub schema_override: Option<PathBuf>,

    #[serde(default)]
    pub ui_preferences: UiPreferences,

    /// Log at debug level
    #[serde(default)]
    pub debug_mode: bool,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            recent_files: Vec::new(),
            last_figure_path: None,
            plugin_dir: None,
            schema_override: None,
            ui_preferences: UiPreferences::default(),
            debug_mode: false,
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            ForgeError::Config("Could not determine app state path".to_string())
        })?;
        Self::load_from(&path)
    }

    /// Load app state from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| ForgeError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_config_dir()?;
        self.save_to(&dir.join(APP_STATE_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ForgeError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ForgeError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Add or refresh a recent file and make it the last figure
    pub fn add_recent_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();

        self.recent_files.retain(|f| f.path != path);
        self.recent_files.insert(0, RecentFile::new(path.clone()));
        self.recent_files.truncate(MAX_RECENT_FILES);

        self.last_figure_path = Some(path);
    }

    /// Forget a recent file (e.g. it failed to open)
    pub fn remove_recent_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.recent_files.retain(|f| f.path != path);

        if self.last_figure_path.as_deref() == Some(path) {
            self.last_figure_path = None;
        }
    }

    /// Drop recent files that no longer exist
    pub fn cleanup_missing_files(&mut self) {
        self.recent_files.retain(|f| f.exists());

        if let Some(ref last) = self.last_figure_path {
            if !last.exists() {
                self.last_figure_path = None;
            }
        }
    }

    /// The configured plugin directory, or the default one
    pub fn effective_plugin_dir(&self) -> Option<PathBuf> {
        self.plugin_dir.clone().or_else(default_plugin_dir)
    }
}

/// UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiPreferences {
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    #[serde(default = "default_font_scale")]
    pub font_scale: f32,

    /// Show the welcome note on startup
    #[serde(default = "default_true")]
    pub show_welcome: bool,
}

fn default_true() -> bool {
    true
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            font_scale: 1.0,
            show_welcome: true,
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_app_state_default() {
        let state = AppState::default();
        assert!(state.recent_files.is_empty());
        assert!(state.last_figure_path.is_none());
        assert_eq!(state.version, 1);
        assert!(state.ui_preferences.dark_mode);
    }

    #[test]
    fn test_add_recent_file() {
        let mut state = AppState::default();

        state.add_recent_file("/figures/one.forge");
        state.add_recent_file("/figures/two.forge");
        assert_eq!(state.recent_files.len(), 2);
        assert_eq!(state.recent_files[0].name, "two.forge");

        // Re-adding moves to the front instead of duplicating
        state.add_recent_file("/figures/one.forge");
        assert_eq!(state.recent_files.len(), 2);
        assert_eq!(state.recent_files[0].name, "one.forge");
        assert_eq!(state.last_figure_path, Some(PathBuf::from("/figures/one.forge")));
    }

    #[test]
    fn test_recent_files_max_limit() {
        let mut state = AppState::default();
        for i in 0..15 {
            state.add_recent_file(format!("/figures/{}.forge", i));
        }
        assert_eq!(state.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(state.recent_files[0].name, "14.forge");
    }

    #[test]
    fn test_remove_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.forge");
        std::fs::write(&kept, "{}").unwrap();

        let mut state = AppState::default();
        state.add_recent_file(&kept);
        state.add_recent_file(dir.path().join("gone.forge"));
        state.cleanup_missing_files();
        assert_eq!(state.recent_files.len(), 1);
        assert!(state.last_figure_path.is_none());

        state.remove_recent_file(&kept);
        assert!(state.recent_files.is_empty());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let state: AppState = serde_json::from_str(r#"{ "debug_mode": true }"#).unwrap();
        assert!(state.debug_mode);
        assert_eq!(state.version, 1);
        assert_eq!(state.ui_preferences.font_scale, 1.0);
    }

    #[test]
    #[serial]
    fn test_save_and_load_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(CONFIG_DIR_ENV, dir.path());

        let mut state = AppState::default();
        state.add_recent_file("/figures/a.forge");
        state.schema_override = Some(PathBuf::from("/schemas/custom.toml"));
        state.save().unwrap();

        assert!(dir.path().join(APP_STATE_FILE).exists());
        let loaded = AppState::load().unwrap();
        assert_eq!(loaded, state);

        std::env::remove_var(CONFIG_DIR_ENV);
    }

    #[test]
    #[serial]
    fn test_corrupt_state_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(CONFIG_DIR_ENV, dir.path());
        std::fs::write(dir.path().join(APP_STATE_FILE), "not json").unwrap();

        assert!(AppState::load().is_err());
        assert_eq!(AppState::load_or_default(), AppState::default());

        std::env::remove_var(CONFIG_DIR_ENV);
    }
}
