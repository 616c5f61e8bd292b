//! Persisted user preferences.
//!
//! Preferences live in a small JSON document: a file in the user's config
//! directory on native builds, a `localStorage` entry in the browser.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FIT_MARGIN;
use crate::model::ImageDimensions;
use crate::service::FallbackPolicy;
use crate::state::ViewSettings;
use crate::zoom_math::ScaleBounds;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Persisted application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub preferences: UserPreferences,
}

fn default_app_name() -> String {
    "DentLens".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Don't show the instructions dialog on startup
    #[serde(default)]
    pub skip_instructions: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// What a failed single-image detection turns into
    #[serde(default)]
    pub detection_fallback: FallbackPolicy,

    #[serde(default)]
    pub zoom: ScaleBounds,

    #[serde(default = "default_fit_margin")]
    pub fit_margin: f64,

    /// Smallest accepted upload, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_image_size: Option<ImageDimensions>,
}

fn default_fit_margin() -> f64 {
    DEFAULT_FIT_MARGIN
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            skip_instructions: false,
            log_level: LogLevel::default(),
            detection_fallback: FallbackPolicy::default(),
            zoom: ScaleBounds::default(),
            fit_margin: default_fit_margin(),
            min_image_size: None,
        }
    }
}

impl UserPreferences {
    /// Viewer settings derived from these preferences.
    ///
    /// Invalid zoom bounds or margins fall back to the defaults.
    pub fn view_settings(&self) -> ViewSettings {
        let mut settings = ViewSettings::default();
        if self.zoom.is_valid() {
            settings.bounds = self.zoom;
        } else {
            log::warn!("Ignoring invalid zoom bounds {:?}", self.zoom);
        }
        if self.fit_margin.is_finite() && self.fit_margin > 0.0 && self.fit_margin <= 1.0 {
            settings.fit_margin = self.fit_margin;
        } else {
            log::warn!("Ignoring invalid fit margin {}", self.fit_margin);
        }
        settings
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "dentlens-config.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
        Some(base.join("dentlens").join(Self::default_filename()))
    }

    /// Try to load configuration from a file.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load from the config directory, falling back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default_path()
            .and_then(|path| Self::load_from_path(&path))
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn require_default_path() -> Result<std::path::PathBuf, ConfigError> {
        Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })
    }

    /// Save to the config directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::require_default_path()?)
    }

    /// Record that the user opted out of the instructions dialog and persist it
    /// to the config directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn dismiss_instructions(&mut self) -> Result<(), ConfigError> {
        self.dismiss_instructions_at(&Self::require_default_path()?)
    }

    /// Record the instructions opt-out and persist it to `path`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn dismiss_instructions_at(&mut self, path: &std::path::Path) -> Result<(), ConfigError> {
        self.preferences.skip_instructions = true;
        self.save_to_path(path)
    }

    /// LocalStorage key for WASM config persistence.
    #[cfg(target_arch = "wasm32")]
    const LOCALSTORAGE_KEY: &'static str = "dentlens-config";

    /// Load from localStorage, falling back to defaults.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::load_from_local_storage().unwrap_or_default()
    }

    #[cfg(target_arch = "wasm32")]
    fn load_from_local_storage() -> Option<Self> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;

        match storage.get_item(Self::LOCALSTORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from localStorage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config from localStorage: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read from localStorage: {:?}", e);
                None
            }
        }
    }

    /// Save to localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), ConfigError> {
        let window = web_sys::window()
            .ok_or_else(|| ConfigError::StorageError("No window object available".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ConfigError::StorageError(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| ConfigError::StorageError("localStorage not available".to_string()))?;

        storage
            .set_item(Self::LOCALSTORAGE_KEY, &self.to_json()?)
            .map_err(|e| {
                ConfigError::StorageError(format!("Failed to save to localStorage: {:?}", e))
            })?;

        log::info!("Saved configuration to localStorage");
        Ok(())
    }

    /// Record that the user opted out of the instructions dialog and persist it.
    #[cfg(target_arch = "wasm32")]
    pub fn dismiss_instructions(&mut self) -> Result<(), ConfigError> {
        self.preferences.skip_instructions = true;
        self.save()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config, AppConfig::new());
        assert!(!config.preferences.skip_instructions);
        assert_eq!(config.preferences.detection_fallback, FallbackPolicy::Empty);
        assert_eq!(config.preferences.zoom.max, 4.0);
    }

    #[test]
    fn test_parse_preferences() {
        let json = r#"{
            "version": 1,
            "preferences": {
                "skip_instructions": true,
                "log_level": "debug",
                "detection_fallback": "fixture",
                "min_image_size": {"width": 800, "height": 600}
            }
        }"#;
        let prefs = AppConfig::from_json(json).unwrap().preferences;
        assert!(prefs.skip_instructions);
        assert_eq!(prefs.log_level.to_level_filter(), log::LevelFilter::Debug);
        assert_eq!(prefs.detection_fallback, FallbackPolicy::Fixture);
        assert_eq!(prefs.min_image_size, Some(ImageDimensions::new(800, 600)));
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            AppConfig::from_json("{not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_view_preferences_fall_back() {
        let mut prefs = UserPreferences::default();
        prefs.zoom.min = 5.0;
        prefs.fit_margin = 0.0;
        assert_eq!(prefs.view_settings(), ViewSettings::default());

        prefs.zoom = ScaleBounds {
            min: 0.25,
            max: 8.0,
            step: 0.5,
        };
        prefs.fit_margin = 0.9;
        let settings = prefs.view_settings();
        assert_eq!(settings.bounds.max, 8.0);
        assert_eq!(settings.fit_margin, 0.9);
    }

    #[test]
    fn test_file_round_trip_keeps_skip_flag() {
        let path = std::env::temp_dir()
            .join(format!("dentlens-config-{}", std::process::id()))
            .join(AppConfig::default_filename());

        let mut config = AppConfig::new();
        config.preferences.skip_instructions = true;
        config.save_to_path(&path).unwrap();

        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert!(loaded.preferences.skip_instructions);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_dismiss_instructions_persists_flag() {
        let path = std::env::temp_dir()
            .join(format!("dentlens-dismiss-{}", std::process::id()))
            .join(AppConfig::default_filename());

        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        assert!(!config.preferences.skip_instructions);
        config.dismiss_instructions_at(&path).unwrap();
        assert!(config.preferences.skip_instructions);

        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert!(loaded.preferences.skip_instructions);
        assert_eq!(loaded.preferences.log_level, LogLevel::Debug);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let path = std::env::temp_dir().join("dentlens-does-not-exist/config.json");
        assert!(AppConfig::load_from_path(&path).is_none());
    }
}
