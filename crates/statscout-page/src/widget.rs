//! Query widgets: uniform read/write access to one on-page control.
//!
//! Reads go through the page [`Snapshot`] except for state that only lives
//! in the DOM properties (checkbox state, native select index), which is
//! read through the driver. Configuring performs the triggering interaction
//! and returns; re-reading the page is the caller's job.

use crate::definition::{WidgetKind, WidgetSpec};
use crate::error::{PageError, Result};
use crate::snapshot::Snapshot;
use statscout_browser::BrowserActions;
use statscout_core::types::labels_match;
use statscout_core::{FilterName, FilterValue};
use std::collections::BTreeSet;
use std::time::Duration;

/// How a multi-select dropdown treats the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigureMode {
    /// The given options become the whole selection
    #[default]
    Replace,
    /// The given options are added to the current selection
    Combine,
}

/// Outcome of a configure call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configured {
    /// The requested value was already current; nothing was clicked
    Unchanged,
    /// The triggering interaction was performed
    Applied,
}

/// A filter's widget, valid for the page load it was built from.
#[derive(Debug, Clone)]
pub struct Widget {
    name: FilterName,
    spec: WidgetSpec,
}

impl Widget {
    /// Create a widget for `name` from its DOM locations.
    #[must_use]
    pub fn new(name: FilterName, spec: WidgetSpec) -> Self {
        Self { name, spec }
    }

    /// Filter this widget backs.
    #[must_use]
    pub fn name(&self) -> &FilterName {
        &self.name
    }

    /// Widget kind.
    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        self.spec.kind()
    }

    /// DOM locations.
    #[must_use]
    pub fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    /// Fail with `StaleWidget` unless the primary location resolves.
    pub fn ensure_resolves(&self, snapshot: &Snapshot) -> Result<()> {
        let selector = self.spec.primary_selector();
        if snapshot.exists(selector)? {
            Ok(())
        } else {
            Err(PageError::StaleWidget {
                filter: self.name.to_string(),
                selector: selector.to_string(),
            })
        }
    }

    /// Every option the filter offers. Never touches the page.
    pub fn list_options(&self, snapshot: &Snapshot) -> Result<Vec<FilterValue>> {
        match &self.spec {
            WidgetSpec::Checkbox { .. } | WidgetSpec::Switch { .. } => {
                self.ensure_resolves(snapshot)?;
                Ok(vec![FilterValue::Flag(true), FilterValue::Flag(false)])
            }
            _ => Ok(self
                .labels(snapshot)?
                .into_iter()
                .map(FilterValue::Text)
                .collect()),
        }
    }

    /// The option the page currently shows.
    ///
    /// Multi-select dropdowns return `Many` with the highlighted entries in
    /// document order.
    pub async fn current_option<D>(&self, snapshot: &Snapshot, driver: &D) -> Result<FilterValue>
    where
        D: BrowserActions + ?Sized,
    {
        self.ensure_resolves(snapshot)?;

        match &self.spec {
            WidgetSpec::Selection {
                options,
                active_class,
            } => {
                let labels = self.labels(snapshot)?;
                let active = snapshot.flags_with_class(options, active_class)?;
                active
                    .iter()
                    .position(|&is_active| is_active)
                    .map(|i| FilterValue::Text(labels[i].clone()))
                    .ok_or_else(|| self.malformed(format!("no option carries class {active_class:?}")))
            }
            WidgetSpec::Dropdown {
                input,
                options,
                multiple: false,
                ..
            } => {
                let value = snapshot
                    .attr(input, "value")?
                    .ok_or_else(|| self.malformed(format!("{input:?} has no value attribute")))?;
                tracing::trace!(filter = %self.name, options = %options, %value, "read dropdown value");
                Ok(FilterValue::Text(value.trim().to_string()))
            }
            WidgetSpec::Dropdown {
                options,
                multiple: true,
                highlighted_class,
                ..
            } => {
                let labels = self.labels(snapshot)?;
                let highlighted = snapshot.flags_with_class(options, highlighted_class)?;
                Ok(FilterValue::Many(
                    labels
                        .into_iter()
                        .zip(highlighted)
                        .filter_map(|(label, on)| on.then_some(label))
                        .collect(),
                ))
            }
            WidgetSpec::NativeDropdown { select } => {
                Ok(FilterValue::Text(driver.selected_text(select).await?))
            }
            WidgetSpec::Checkbox { input } => Ok(FilterValue::Flag(driver.is_checked(input).await?)),
            WidgetSpec::Switch {
                control,
                active_class,
            } => snapshot
                .has_class(control, active_class)?
                .map(FilterValue::Flag)
                .ok_or_else(|| self.stale(control)),
        }
    }

    /// Make `value` the filter's current option.
    ///
    /// Options are matched case-insensitively against [`Widget::list_options`];
    /// anything else fails with `InvalidOption` before the page is touched.
    /// `timeout` bounds the wait for a dropdown's list to open.
    pub async fn configure<D>(
        &self,
        value: &FilterValue,
        mode: ConfigureMode,
        snapshot: &Snapshot,
        driver: &D,
        timeout: Duration,
    ) -> Result<Configured>
    where
        D: BrowserActions + ?Sized,
    {
        tracing::debug!(filter = %self.name, option = %value, ?mode, "configuring widget");

        match &self.spec {
            WidgetSpec::Checkbox { input: selector }
            | WidgetSpec::Switch {
                control: selector, ..
            } => {
                let wanted = value.as_flag().ok_or_else(|| self.invalid(value, "true, false"))?;
                let current = self.current_option(snapshot, driver).await?;
                if current == FilterValue::Flag(wanted) {
                    return Ok(Configured::Unchanged);
                }
                driver.click(selector).await?;
            }
            WidgetSpec::Selection { options, .. } => {
                let index = self.resolve_single(value, snapshot)?;
                if self.is_current(value, snapshot, driver).await? {
                    return Ok(Configured::Unchanged);
                }
                driver.click_nth(options, index).await?;
            }
            WidgetSpec::NativeDropdown { select } => {
                let index = self.resolve_single(value, snapshot)?;
                if self.is_current(value, snapshot, driver).await? {
                    return Ok(Configured::Unchanged);
                }
                driver.select_index(select, index).await?;
            }
            WidgetSpec::Dropdown {
                input,
                toggle,
                options,
                multiple: false,
                ..
            } => {
                let index = self.resolve_single(value, snapshot)?;
                if self.is_current(value, snapshot, driver).await? {
                    return Ok(Configured::Unchanged);
                }
                driver.click(toggle.as_deref().unwrap_or(input)).await?;
                driver.wait_for_selector(options, timeout).await?;
                driver.click_nth(options, index).await?;
            }
            WidgetSpec::Dropdown {
                input,
                toggle,
                options,
                multiple: true,
                highlighted_class,
            } => {
                let labels = self.labels(snapshot)?;
                let requested = value.labels();
                if requested.is_empty() {
                    return Err(self.invalid(value, &labels.join(", ")));
                }

                let mut wanted = BTreeSet::new();
                for label in requested {
                    let index = labels
                        .iter()
                        .position(|candidate| labels_match(candidate, label))
                        .ok_or_else(|| self.invalid(value, &labels.join(", ")))?;
                    wanted.insert(index);
                }

                let highlighted = snapshot.flags_with_class(options, highlighted_class)?;
                let current: BTreeSet<usize> = highlighted
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &on)| on.then_some(i))
                    .collect();
                if mode == ConfigureMode::Combine {
                    wanted.extend(current.iter().copied());
                }
                if wanted == current {
                    return Ok(Configured::Unchanged);
                }

                driver.click(toggle.as_deref().unwrap_or(input)).await?;
                driver.wait_for_selector(options, timeout).await?;
                for index in 0..labels.len() {
                    if wanted.contains(&index) != current.contains(&index) {
                        driver.click_nth(options, index).await?;
                    }
                }
            }
        }

        Ok(Configured::Applied)
    }

    /// Option labels of the text kinds; empty lists are malformed.
    fn labels(&self, snapshot: &Snapshot) -> Result<Vec<String>> {
        self.ensure_resolves(snapshot)?;

        let labels = match &self.spec {
            WidgetSpec::Selection { options, .. } | WidgetSpec::Dropdown { options, .. } => {
                snapshot.texts(options)?
            }
            WidgetSpec::NativeDropdown { select } => snapshot.texts(&format!("{select} option"))?,
            WidgetSpec::Checkbox { .. } | WidgetSpec::Switch { .. } => {
                return Ok(vec!["true".to_string(), "false".to_string()]);
            }
        };

        if labels.is_empty() {
            return Err(self.malformed("option list is empty".to_string()));
        }
        if labels.iter().any(String::is_empty) {
            return Err(self.malformed("option without a label".to_string()));
        }
        Ok(labels)
    }

    /// Index of a single requested option.
    fn resolve_single(&self, value: &FilterValue, snapshot: &Snapshot) -> Result<usize> {
        let labels = self.labels(snapshot)?;
        let requested = match value {
            FilterValue::Text(text) => text.as_str(),
            FilterValue::Many(items) if items.len() == 1 => items[0].as_str(),
            _ => return Err(self.invalid(value, &labels.join(", "))),
        };

        labels
            .iter()
            .position(|label| labels_match(label, requested))
            .ok_or_else(|| self.invalid(value, &labels.join(", ")))
    }

    async fn is_current<D>(&self, value: &FilterValue, snapshot: &Snapshot, driver: &D) -> Result<bool>
    where
        D: BrowserActions + ?Sized,
    {
        let current = self.current_option(snapshot, driver).await?;
        Ok(match (&current, value.labels().as_slice()) {
            (FilterValue::Text(current), [requested]) => labels_match(current, requested),
            _ => false,
        })
    }

    fn invalid(&self, value: &FilterValue, available: &str) -> PageError {
        PageError::InvalidOption {
            filter: self.name.to_string(),
            option: value.to_string(),
            available: available.to_string(),
        }
    }

    fn malformed(&self, reason: String) -> PageError {
        PageError::MalformedWidget {
            filter: self.name.to_string(),
            reason,
        }
    }

    fn stale(&self, selector: &str) -> PageError {
        PageError::StaleWidget {
            filter: self.name.to_string(),
            selector: selector.to_string(),
        }
    }
}
