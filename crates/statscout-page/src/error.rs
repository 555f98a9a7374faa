//! Error types for page definitions and query widgets.

use thiserror::Error;

/// Errors that can occur while loading page definitions or driving widgets.
#[derive(Error, Debug)]
pub enum PageError {
    /// Filter name not present in the page's widget registry
    #[error("unknown filter: {name}")]
    UnknownFilter {
        /// The requested filter name
        name: String,
    },

    /// Requested option is not one of the filter's options
    #[error("invalid option {option:?} for filter {filter}; expected one of: {available}")]
    InvalidOption {
        /// Filter being configured
        filter: String,
        /// Rejected option
        option: String,
        /// Comma-separated list of valid options
        available: String,
    },

    /// The DOM location backing a widget no longer resolves
    #[error("stale widget {filter}: {selector:?} does not resolve")]
    StaleWidget {
        /// Filter whose widget went stale
        filter: String,
        /// Selector that failed to resolve
        selector: String,
    },

    /// The DOM location resolves to an unexpected shape
    #[error("malformed widget {filter}: {reason}")]
    MalformedWidget {
        /// Filter whose widget is malformed
        filter: String,
        /// What was unexpected
        reason: String,
    },

    /// A CSS selector failed to parse
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector {
        /// The offending selector
        selector: String,
        /// Parser message
        reason: String,
    },

    /// Page definition not found
    #[error("page definition not found: {page_id}")]
    NotFound {
        /// The page ID that was not found
        page_id: String,
    },

    /// Failed to load page definition from file
    #[error("failed to load page definition from {path}: {source}")]
    LoadError {
        /// Path to the definition file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse page definition TOML
    #[error("failed to parse page definition TOML in {path}: {source}")]
    ParseError {
        /// Path to the definition file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid page definition (validation failed)
    #[error("invalid page definition for {page_id}: {reason}")]
    ValidationError {
        /// Page ID being validated
        page_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Page definition directory not found
    #[error("page definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// I/O error while accessing page definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid identifier or filter name
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] statscout_core::StatscoutError),

    /// Browser interaction failed
    #[error("browser error: {0}")]
    Browser(#[from] statscout_browser::BrowserError),
}

/// Result type for page operations.
pub type Result<T> = std::result::Result<T, PageError>;
