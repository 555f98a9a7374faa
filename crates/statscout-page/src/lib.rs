//! Statscout Page - Declarative statistics pages and their query widgets.
//!
//! A page definition names where a page lives, which marker says its grid is
//! ready, which filters it offers and how its data is exported. Against a
//! [`Snapshot`] of the loaded page, the definition becomes a
//! [`WidgetRegistry`] of [`Widget`]s that read and change each filter.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): page metadata, widget kinds and DOM locations
//! - **Loader** ([`loader`]): TOML loading from `page-definitions/`
//! - **Catalog** ([`catalog`]): in-memory cache of definitions
//! - **Snapshot** ([`snapshot`]): offline HTML queries over one page read
//! - **Widgets** ([`widget`]) and their per-load **Registry** ([`registry`])
//! - **Errors** ([`error`]): page-specific error types
//!
//! # Example
//!
//! ```rust
//! use statscout_page::{PageDefinition, Snapshot, WidgetRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition: PageDefinition = toml::from_str(r##"
//!     [page]
//!     id = "batting-leaders"
//!     name = "Batting leaderboard"
//!     url = "https://stats.example.com/leaders"
//!     ready_selector = "table"
//!
//!     [filters.position]
//!     kind = "selection"
//!     options = ".pos button"
//!
//!     [export]
//!     method = "table"
//!     table = "table"
//! "##)?;
//! definition.validate()?;
//!
//! let snapshot = Snapshot::new(
//!     r#"<div class="pos"><button class="active">All</button><button>C</button></div><table></table>"#,
//! );
//! let registry = WidgetRegistry::build(&definition, &snapshot)?;
//! assert_eq!(registry.get("Position")?.list_options(&snapshot)?.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalog;
pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;
pub mod snapshot;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod widget;

// Re-export commonly used types
pub use catalog::PageCatalog;
pub use definition::{
    DerivedField, ExportMethod, FilterDefinition, PageDefinition, PageMetadata, Pagination,
    QuickSplitDefinition, TableSelectors, WidgetKind, WidgetSpec,
};
pub use error::{PageError, Result};
pub use loader::PageLoader;
pub use registry::WidgetRegistry;
pub use snapshot::Snapshot;
pub use widget::{ConfigureMode, Configured, Widget};
