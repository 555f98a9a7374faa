//! Configuration management for statscout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Timestamp;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/statscout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Waiting and polling behavior while driving a page
    pub scraping: ScrapingConfig,
    /// Export file settings
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    /// - A value fails validation
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        let config: Self = if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `STATSCOUT_HEADLESS`: Override browser headless mode (true/false)
    /// - `STATSCOUT_BROWSER`: Override the browser engine name
    /// - `STATSCOUT_WAIT_TIMEOUT_MS`: Override the bounded selector wait
    /// - `STATSCOUT_EXPORT_DIR`: Override the export output directory
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("STATSCOUT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(engine) = lookup("STATSCOUT_BROWSER") {
            tracing::debug!("Override browser.engine from env: {}", engine);
            self.browser.engine = engine;
        }

        if let Some(val) = lookup("STATSCOUT_WAIT_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.scraping.wait_timeout_ms = ms;
                tracing::debug!("Override scraping.wait_timeout_ms from env: {}", ms);
            }
        }

        if let Some(dir) = lookup("STATSCOUT_EXPORT_DIR") {
            tracing::debug!("Override export.output_dir from env: {}", dir);
            self.export.output_dir = Some(PathBuf::from(dir));
        }
    }

    /// Check value constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scraping.wait_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.wait_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.scraping.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.poll_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.scraping.poll_interval_ms > self.scraping.wait_timeout_ms {
            return Err(ConfigError::InvalidValue {
                field: "scraping.poll_interval_ms".to_string(),
                reason: format!(
                    "must not exceed wait_timeout_ms ({})",
                    self.scraping.wait_timeout_ms
                ),
            });
        }

        if let Err(e) = Timestamp::check_format(&self.export.timestamp_format) {
            return Err(ConfigError::InvalidValue {
                field: "export.timestamp_format".to_string(),
                reason: e.to_string(),
            });
        }

        if !self.export.delimiter.is_ascii() {
            return Err(ConfigError::InvalidValue {
                field: "export.delimiter".to_string(),
                reason: format!("must be a single ASCII character, got {:?}", self.export.delimiter),
            });
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Directory exports land in when no destination is given.
    ///
    /// Falls back to `<data_dir>/exports`.
    pub fn export_dir(&self) -> ConfigResult<PathBuf> {
        match &self.export.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("exports")),
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/statscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/statscout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Get the cache directory path.
    ///
    /// Uses XDG base directories: `~/.cache/statscout`
    pub fn cache_dir() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().to_path_buf())
    }

    fn project_dirs() -> ConfigResult<ProjectDirs> {
        ProjectDirs::from("com", "statscout", "statscout").ok_or(ConfigError::NoConfigDir)
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Browser engine name; only Chromium-family engines are supported
    pub engine: String,
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Explicit browser executable, otherwise auto-detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    /// User agent override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
}

impl BrowserConfig {
    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: "chromium".to_string(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            executable: None,
            user_agent: None,
            navigation_timeout_secs: 30,
        }
    }
}

/// Waiting and polling behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Upper bound for any wait on a selector or refresh, in milliseconds
    pub wait_timeout_ms: u64,
    /// Interval between DOM polls while waiting, in milliseconds
    pub poll_interval_ms: u64,
    /// Pause after a triggering click before the DOM is re-read, in milliseconds
    pub settle_delay_ms: u64,
    /// Directory holding page definition TOML files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions_dir: Option<PathBuf>,
}

impl ScrapingConfig {
    /// Wait timeout as a `Duration`.
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Poll interval as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settle delay as a `Duration`.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 30_000,
            poll_interval_ms: 250,
            settle_delay_ms: 500,
            definitions_dir: None,
        }
    }
}

/// Export file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output directory for exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// `strftime` pattern for the timestamp in default export file names
    pub timestamp_format: String,
    /// Field delimiter for delimited exports
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
            delimiter: ',',
        }
    }
}
