//! Page definition types and structures.
//!
//! A page definition is the declarative table behind one page type: where
//! the page lives, which marker says its data grid is ready, which filters
//! it exposes (widget kind plus DOM locations) and how its data is exported.

use crate::error::{PageError, Result};
use crate::snapshot::parse_selector;
use regex::Regex;
use serde::{Deserialize, Serialize};
use statscout_core::{FilterName, PageId};
use std::collections::{BTreeMap, HashSet};

/// Complete page definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDefinition {
    /// Core page metadata
    pub page: PageMetadata,

    /// Filters keyed by their human-readable name
    #[serde(default)]
    pub filters: BTreeMap<String, FilterDefinition>,

    /// Composite shortcuts that set several filters in one action
    #[serde(default)]
    pub quick_splits: BTreeMap<String, QuickSplitDefinition>,

    /// How the data grid is exported
    pub export: ExportMethod,
}

impl PageDefinition {
    /// Get the page ID.
    #[must_use]
    pub fn id(&self) -> &PageId {
        &self.page.id
    }

    /// Get the page name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.page.name
    }

    /// Validate the page definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| PageError::ValidationError {
            page_id: self.page.id.to_string(),
            reason,
        };

        if self.page.name.trim().is_empty() {
            return Err(invalid("page name cannot be empty".to_string()));
        }

        if !(self.page.url.starts_with("http://") || self.page.url.starts_with("https://")) {
            return Err(invalid(format!(
                "page URL must be http(s), got {:?}",
                self.page.url
            )));
        }

        check_selector(&self.page.ready_selector, "page.ready_selector").map_err(invalid)?;
        if let Some(selector) = &self.page.overlay_dismiss {
            check_selector(selector, "page.overlay_dismiss").map_err(invalid)?;
        }
        if let Some(selector) = &self.page.submit_button {
            check_selector(selector, "page.submit_button").map_err(invalid)?;
        }

        let mut seen = HashSet::new();
        for (name, filter) in &self.filters {
            let filter_name = FilterName::new(name)
                .map_err(|e| invalid(format!("filter {name:?}: {e}")))?;
            if !seen.insert(filter_name.key().to_string()) {
                return Err(invalid(format!(
                    "filter names must be unique ignoring case, {name:?} is repeated"
                )));
            }

            for (field, selector) in filter.widget.selectors() {
                check_selector(selector, &format!("filters.{name}.{field}")).map_err(invalid)?;
            }

            if filter.requires_submit && self.page.submit_button.is_none() {
                tracing::debug!(
                    page_id = %self.page.id,
                    filter = %name,
                    "filter requires submit but the page declares no submit button"
                );
            }
        }

        for (name, split) in &self.quick_splits {
            check_selector(&split.control, &format!("quick_splits.{name}.control"))
                .map_err(invalid)?;
        }

        self.export.validate().map_err(invalid)?;

        Ok(())
    }
}

/// Core page metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Unique page identifier (e.g., "batting-leaders", "depth-chart")
    pub id: PageId,

    /// Human-readable page name
    pub name: String,

    /// Canonical address of the page
    pub url: String,

    /// Selector whose presence means the data grid is ready
    pub ready_selector: String,

    /// Close button of a transient overlay (ad) that blocks interaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_dismiss: Option<String>,

    /// Control applying pending filter changes when they don't auto-apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button: Option<String>,
}

/// One filter: its widget and whether a change needs the submit control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Widget kind and DOM locations
    #[serde(flatten)]
    pub widget: WidgetSpec,

    /// The page's submit control must be clicked after configuring
    #[serde(default)]
    pub requires_submit: bool,
}

/// Widget kinds a filter can be rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Tab or button group; one sibling carries an active marker
    Selection,
    /// Option list attached to an input, or a native choice list
    Dropdown,
    /// Binary checked state
    Checkbox,
    /// Binary toggle marked by an active class
    Switch,
}

fn default_active_class() -> String {
    "active".to_string()
}

fn default_highlighted_class() -> String {
    "highlighted".to_string()
}

/// DOM locations of one widget, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WidgetSpec {
    /// Button group; `options` matches every sibling control
    Selection {
        /// Selector matching all sibling controls in order
        options: String,
        /// Class marking the active sibling
        #[serde(default = "default_active_class")]
        active_class: String,
    },

    /// Option list attached to a visible input whose `value` holds the current option
    Dropdown {
        /// The visible input
        input: String,
        /// Control opening the list, the input itself when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        toggle: Option<String>,
        /// Selector matching all list entries in order
        options: String,
        /// Several entries may be highlighted at once
        #[serde(default)]
        multiple: bool,
        /// Class marking highlighted entries of a multi-select list
        #[serde(default = "default_highlighted_class")]
        highlighted_class: String,
    },

    /// Native `<select>` element
    NativeDropdown {
        /// The `<select>` element
        select: String,
    },

    /// Checkbox input
    Checkbox {
        /// The checkbox input
        input: String,
    },

    /// Toggle switch
    Switch {
        /// The clickable switch control
        control: String,
        /// Class present while the switch is on
        #[serde(default = "default_active_class")]
        active_class: String,
    },
}

impl WidgetSpec {
    /// Kind of widget these locations describe.
    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Selection { .. } => WidgetKind::Selection,
            Self::Dropdown { .. } | Self::NativeDropdown { .. } => WidgetKind::Dropdown,
            Self::Checkbox { .. } => WidgetKind::Checkbox,
            Self::Switch { .. } => WidgetKind::Switch,
        }
    }

    /// Location that must resolve for the widget to be usable.
    #[must_use]
    pub fn primary_selector(&self) -> &str {
        match self {
            Self::Selection { options, .. } => options,
            Self::Dropdown { input, .. } => input,
            Self::NativeDropdown { select } => select,
            Self::Checkbox { input } => input,
            Self::Switch { control, .. } => control,
        }
    }

    /// All selectors of the spec, labeled by field name.
    #[must_use]
    pub fn selectors(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Selection { options, .. } => vec![("options", options.as_str())],
            Self::Dropdown {
                input,
                toggle,
                options,
                ..
            } => {
                let mut selectors = vec![("input", input.as_str()), ("options", options.as_str())];
                if let Some(toggle) = toggle {
                    selectors.push(("toggle", toggle.as_str()));
                }
                selectors
            }
            Self::NativeDropdown { select } => vec![("select", select.as_str())],
            Self::Checkbox { input } => vec![("input", input.as_str())],
            Self::Switch { control, .. } => vec![("control", control.as_str())],
        }
    }
}

/// Composite shortcut control (quick split).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickSplitDefinition {
    /// Control applying the split
    pub control: String,

    /// The page's submit control must be clicked afterwards
    #[serde(default)]
    pub requires_submit: bool,
}

/// Export methods for a page's data grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum ExportMethod {
    /// The site offers an export control producing a downloaded file
    Download {
        /// Control triggering the download
        control: String,
    },

    /// No native export, the visible grid is scraped
    Table(TableSelectors),
}

impl ExportMethod {
    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Self::Download { control } => check_selector(control, "export.control"),
            Self::Table(table) => table.validate(),
        }
    }
}

fn default_header_cells() -> String {
    "thead th".to_string()
}

fn default_body_rows() -> String {
    "tbody tr".to_string()
}

fn default_cells() -> String {
    "td".to_string()
}

/// CSS selectors locating a data grid, relative to the `table` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSelectors {
    /// The table node
    pub table: String,

    /// Header cells, relative to the table
    #[serde(default = "default_header_cells")]
    pub header_cells: String,

    /// Body rows, relative to the table
    #[serde(default = "default_body_rows")]
    pub body_rows: String,

    /// Cells, relative to a body row
    #[serde(default = "default_cells")]
    pub cells: String,

    /// Extra columns parsed out of each row
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<DerivedField>,

    /// Multi-page grids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl TableSelectors {
    /// Selectors for a plain `<table>` with `<thead>`/`<tbody>` markup.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            header_cells: default_header_cells(),
            body_rows: default_body_rows(),
            cells: default_cells(),
            derived: Vec::new(),
            pagination: None,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        check_selector(&self.table, "export.table")?;
        check_selector(&self.header_cells, "export.header_cells")?;
        check_selector(&self.body_rows, "export.body_rows")?;
        check_selector(&self.cells, "export.cells")?;

        for field in &self.derived {
            if field.column.trim().is_empty() {
                return Err("derived column name cannot be empty".to_string());
            }
            if let Some(selector) = &field.selector {
                check_selector(selector, &format!("derived.{}.selector", field.column))?;
            }
            let regex = Regex::new(&field.pattern)
                .map_err(|e| format!("derived.{}.pattern: {e}", field.column))?;
            if regex.captures_len() < 2 {
                return Err(format!(
                    "derived.{}.pattern needs a capture group",
                    field.column
                ));
            }
        }

        if let Some(pagination) = &self.pagination {
            check_selector(&pagination.next, "pagination.next")?;
            check_selector(&pagination.total_pages, "pagination.total_pages")?;
            if let Some(current) = &pagination.current_page {
                check_selector(current, "pagination.current_page")?;
            }
            if let Some(first) = &pagination.first {
                check_selector(first, "pagination.first")?;
            }
        }

        Ok(())
    }
}

/// Column derived from each row by regex, e.g. an ID inside a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedField {
    /// Name of the appended column
    pub column: String,

    /// Node within the row to read, the row itself when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Attribute to read, the node's text when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Regex whose first capture group is the value
    pub pattern: String,
}

/// Paging controls of a multi-page grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Control advancing to the next page
    pub next: String,

    /// Node whose text reports the total page count
    pub total_pages: String,

    /// Node whose text reports the current page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<String>,

    /// Control returning the grid to its first page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
}

fn check_selector(selector: &str, field: &str) -> std::result::Result<(), String> {
    if selector.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    parse_selector(selector)
        .map(|_| ())
        .map_err(|e| format!("{field}: {e}"))
}
