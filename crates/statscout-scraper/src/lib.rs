//! Statscout Scraper - Filter-driven extraction from statistics pages.
//!
//! This crate puts a [`StatPage`] facade over a loaded page: list its
//! filters and their options, change them, and pull the data grid as a
//! [`TableRecord`] or export it to delimited text. Grid scraping handles
//! duplicate headers, derived columns and paged grids.
//!
//! # Example
//!
//! ```rust,ignore
//! use statscout_browser::BrowserEngine;
//! use statscout_core::{AppConfig, PageId};
//! use statscout_page::{PageCatalog, PageLoader};
//! use statscout_scraper::{ScrapeSettings, StatPage};
//!
//! let config = AppConfig::load()?;
//! let catalog = PageCatalog::load_from(&PageLoader::with_default_dir()?)?;
//! let definition = catalog.get(&PageId::new("batting-leaders")?)?;
//!
//! let engine = BrowserEngine::launch(&config, AppConfig::cache_dir()?.join("downloads")).await?;
//! let mut page = StatPage::open(engine, definition, ScrapeSettings::from_config(&config)?).await?;
//!
//! page.configure("season1", "2023").await?;
//! page.configure("position", "SS").await?;
//! let path = page.export(None).await?;
//! println!("wrote {}", path.display());
//!
//! page.into_driver().shutdown().await?;
//! ```

pub mod error;
pub mod export;
pub mod facade;
pub mod record;
pub mod settings;
pub mod table;

pub use error::{Result, ScrapeError};
pub use facade::StatPage;
pub use record::TableRecord;
pub use settings::{ScrapeSettings, WaitSettings};
pub use table::{parse_table, scrape_paginated};
