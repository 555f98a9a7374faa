//! Browser automation for JavaScript-rendered statistics pages.
//!
//! Provides the [`BrowserActions`] contract the page widgets drive and a
//! chromiumoxide-backed [`BrowserEngine`] implementing it. Every wait is
//! bounded by an explicit timeout.

pub mod actions;
pub mod engine;
pub mod error;

pub use actions::BrowserActions;
pub use engine::{BrowserEngine, BrowserKind};
pub use error::{BrowserError, Result};
