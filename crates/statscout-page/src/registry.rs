//! Per-page-load registry of query widgets.

use crate::definition::PageDefinition;
use crate::error::{PageError, Result};
use crate::snapshot::Snapshot;
use crate::widget::Widget;
use statscout_core::FilterName;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Entry {
    widget: Widget,
    requires_submit: bool,
}

/// Filter name to widget map for one page load.
///
/// Built from a definition against the snapshot of a freshly loaded page;
/// every widget's primary location must resolve in that snapshot. Lookups
/// ignore case.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: BTreeMap<FilterName, Entry>,
}

impl WidgetRegistry {
    /// Build the registry for `definition` against `snapshot`.
    ///
    /// # Errors
    /// Returns `StaleWidget` for the first filter whose location does not
    /// resolve, or `InvalidId` for an unusable filter name.
    pub fn build(definition: &PageDefinition, snapshot: &Snapshot) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for (name, filter) in &definition.filters {
            let name = FilterName::new(name)?;
            let widget = Widget::new(name.clone(), filter.widget.clone());
            widget.ensure_resolves(snapshot)?;
            entries.insert(
                name,
                Entry {
                    widget,
                    requires_submit: filter.requires_submit,
                },
            );
        }

        tracing::debug!(
            page_id = %definition.id(),
            widgets = entries.len(),
            "built widget registry"
        );

        Ok(Self { entries })
    }

    /// Widget backing `name`.
    ///
    /// # Errors
    /// Returns `UnknownFilter` if the page has no such filter.
    pub fn get(&self, name: &str) -> Result<&Widget> {
        self.entry(name).map(|entry| &entry.widget)
    }

    /// Whether changing `name` only takes effect after the submit control.
    ///
    /// # Errors
    /// Returns `UnknownFilter` if the page has no such filter.
    pub fn requires_submit(&self, name: &str) -> Result<bool> {
        self.entry(name).map(|entry| entry.requires_submit)
    }

    /// Filter names, sorted ignoring case.
    #[must_use]
    pub fn names(&self) -> Vec<FilterName> {
        self.entries.keys().cloned().collect()
    }

    /// Whether `name` is a filter of this page.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_ok()
    }

    /// Number of widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the page has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Widgets in name order.
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.entries.values().map(|entry| &entry.widget)
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        let unknown = || PageError::UnknownFilter {
            name: name.to_string(),
        };
        let key = FilterName::new(name).map_err(|_| unknown())?;
        self.entries.get(&key).ok_or_else(unknown)
    }
}
