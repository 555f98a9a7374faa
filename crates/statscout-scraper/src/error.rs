use statscout_browser::BrowserError;
use statscout_core::{ConfigError, StatscoutError};
use statscout_page::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("cannot apply pending changes on {page}: {reason}")]
    UpdateUnavailable { page: String, reason: String },

    #[error("no table matches {selector:?}")]
    MissingTable { selector: String },

    #[error("table {selector:?} has no header cells")]
    EmptyHeader { selector: String },

    #[error("row {row} has {found} cells, header has {expected}")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column mismatch: expected {expected:?}, found {found:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("page {page} of the grid has {found} rows, expected {expected}")]
    PageSize {
        page: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid pattern for derived column {column}: {source}")]
    Pattern {
        column: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot read a page count from {text:?}")]
    PageCount { text: String },

    #[error("grid shows page {page} and declares no control back to page 1")]
    NotOnFirstPage { page: usize },

    #[error("{0}")]
    Core(#[from] StatscoutError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
