//! Runtime settings derived from [`AppConfig`].

use crate::error::Result;
use statscout_core::{AppConfig, ConfigError};
use std::path::PathBuf;
use std::time::Duration;

/// Bounds on waiting for the page to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    /// Maximum wait for a marker or grid change
    pub timeout: Duration,
    /// Interval between polls
    pub poll_interval: Duration,
    /// Pause after an interaction before polling starts
    pub settle_delay: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Settings a [`StatPage`](crate::StatPage) runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSettings {
    /// Wait bounds
    pub wait: WaitSettings,
    /// Directory default export paths are built in
    pub export_dir: PathBuf,
    /// `chrono` format of the timestamp in default export file names
    pub timestamp_format: String,
    /// Field delimiter of written exports
    pub delimiter: u8,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            wait: WaitSettings::default(),
            export_dir: PathBuf::from("exports"),
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
            delimiter: b',',
        }
    }
}

impl ScrapeSettings {
    /// Derive settings from the application configuration.
    ///
    /// # Errors
    /// Returns error if the configuration fails validation, the export
    /// directory can't be resolved or the delimiter is not ASCII.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let delimiter = u8::try_from(config.export.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "export.delimiter".to_string(),
                reason: format!("{:?} is not an ASCII character", config.export.delimiter),
            })?;

        Ok(Self {
            wait: WaitSettings {
                timeout: config.scraping.wait_timeout(),
                poll_interval: config.scraping.poll_interval(),
                settle_delay: config.scraping.settle_delay(),
            },
            export_dir: config.export_dir()?,
            timestamp_format: config.export.timestamp_format.clone(),
            delimiter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.scraping.wait_timeout_ms = 1500;
        config.export.output_dir = Some(PathBuf::from("/tmp/statscout-out"));
        config.export.delimiter = '\t';

        let settings = ScrapeSettings::from_config(&config).expect("settings");
        assert_eq!(settings.wait.timeout, Duration::from_millis(1500));
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/statscout-out"));
        assert_eq!(settings.delimiter, b'\t');
    }

    #[test]
    fn test_from_config_rejects_wide_delimiter() {
        let mut config = AppConfig::default();
        config.export.output_dir = Some(PathBuf::from("/tmp"));
        config.export.delimiter = '§';

        assert!(ScrapeSettings::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_timestamp_format() {
        let mut config = AppConfig::default();
        config.export.output_dir = Some(PathBuf::from("/tmp"));
        config.export.timestamp_format = "%Y%m%d_%Q".to_string();

        assert!(matches!(
            ScrapeSettings::from_config(&config),
            Err(crate::ScrapeError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
