//! Statscout Core - Foundation crate for the statscout page scrapers.
//!
//! This crate provides shared types, error handling, configuration management
//! and logging setup that the browser, page and scraper crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`FilterName`, `FilterValue`, `PageId`, `Timestamp`)
//! - [`logging`] - `tracing` subscriber installation
//!
//! # Example
//!
//! ```rust
//! use statscout_core::{AppConfig, FilterName};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert!(config.browser.headless);
//!
//! let name = FilterName::new("Season1")?;
//! assert_eq!(name, FilterName::new("season1")?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, ExportConfig, ScrapingConfig};
pub use error::{ConfigError, ConfigResult, Result, StatscoutError};
pub use types::{FilterName, FilterValue, PageId, Timestamp};
