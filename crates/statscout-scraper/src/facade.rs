//! The page facade: one statistics page behind its filters.
//!
//! A [`StatPage`] owns the driver, the page definition, the snapshot of the
//! last page read and the widget registry built from it. Every call that
//! changes the page waits for the ready marker and refreshes both, so reads
//! never see a stale document.

use crate::error::{Result, ScrapeError};
use crate::export::{default_export_path, move_file};
use crate::record::TableRecord;
use crate::settings::ScrapeSettings;
use crate::table::scrape_paginated;
use statscout_browser::BrowserActions;
use statscout_core::types::labels_match;
use statscout_core::{FilterName, FilterValue, Timestamp};
use statscout_page::{
    ConfigureMode, Configured, ExportMethod, PageDefinition, PageError, QuickSplitDefinition,
    Snapshot, WidgetRegistry,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Delimiter of files the sites themselves export.
const DOWNLOAD_DELIMITER: u8 = b',';

/// A loaded statistics page.
pub struct StatPage<D: BrowserActions> {
    driver: D,
    definition: PageDefinition,
    settings: ScrapeSettings,
    snapshot: Snapshot,
    registry: WidgetRegistry,
}

impl<D: BrowserActions> StatPage<D> {
    /// Load the page described by `definition` in its default state.
    ///
    /// # Errors
    /// Returns error if the definition is invalid, the page doesn't become
    /// ready in time or a filter's widget is missing.
    pub async fn open(driver: D, definition: PageDefinition, settings: ScrapeSettings) -> Result<Self> {
        definition.validate()?;

        let mut page = Self {
            driver,
            definition,
            settings,
            snapshot: Snapshot::default(),
            registry: WidgetRegistry::default(),
        };
        page.reset().await?;
        Ok(page)
    }

    /// Page definition.
    #[must_use]
    pub fn definition(&self) -> &PageDefinition {
        &self.definition
    }

    /// The driver.
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Snapshot of the last page read.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Navigate to the canonical address, restoring every filter's default.
    pub async fn reset(&mut self) -> Result<()> {
        info!(
            page_id = %self.definition.id(),
            url = %self.definition.page.url,
            "loading page"
        );

        self.driver.navigate(&self.definition.page.url).await?;
        self.await_ready().await?;
        self.dismiss_overlay().await?;
        self.refresh().await
    }

    /// Re-read the document and rebuild the widget registry.
    pub async fn refresh(&mut self) -> Result<()> {
        let snapshot = Snapshot::new(self.driver.content().await?);
        let registry = WidgetRegistry::build(&self.definition, &snapshot)?;

        self.snapshot = snapshot;
        self.registry = registry;
        Ok(())
    }

    /// Filter names, sorted ignoring case.
    #[must_use]
    pub fn list_queries(&self) -> Vec<FilterName> {
        self.registry.names()
    }

    /// Every option of a filter.
    pub fn list_options(&self, name: &str) -> Result<Vec<FilterValue>> {
        Ok(self.registry.get(name)?.list_options(&self.snapshot)?)
    }

    /// The option a filter currently shows.
    pub async fn current_option(&self, name: &str) -> Result<FilterValue> {
        let widget = self.registry.get(name)?;
        Ok(widget.current_option(&self.snapshot, &self.driver).await?)
    }

    /// Set a filter, replacing any multi-selection.
    pub async fn configure(&mut self, name: &str, value: impl Into<FilterValue>) -> Result<Configured> {
        self.configure_with(name, value, ConfigureMode::default()).await
    }

    /// Set a filter.
    ///
    /// Filters that only apply through the submit control get it clicked;
    /// `UpdateUnavailable` is raised before the widget is touched when that
    /// control is missing. Once anything changed, the page is awaited and refreshed before this
    /// returns.
    pub async fn configure_with(
        &mut self,
        name: &str,
        value: impl Into<FilterValue>,
        mode: ConfigureMode,
    ) -> Result<Configured> {
        let value = value.into();
        let widget = self.registry.get(name)?.clone();
        let requires_submit = self.registry.requires_submit(name)?;
        if requires_submit {
            self.submit_control().await?;
        }

        if self.dismiss_overlay().await? {
            self.refresh().await?;
        }

        let outcome = widget
            .configure(&value, mode, &self.snapshot, &self.driver, self.settings.wait.timeout)
            .await?;
        if outcome == Configured::Unchanged {
            debug!(filter = %widget.name(), option = %value, "filter already set");
            return Ok(outcome);
        }

        if requires_submit {
            self.click_submit().await?;
        }
        self.settle().await?;

        info!(filter = %widget.name(), option = %value, "configured filter");
        Ok(outcome)
    }

    /// Click the page's submit control and wait for the update.
    ///
    /// # Errors
    /// Returns `UpdateUnavailable` if the page has no submit control.
    pub async fn submit(&mut self) -> Result<()> {
        self.click_submit().await?;
        self.settle().await
    }

    /// Quick split names in order.
    #[must_use]
    pub fn list_quick_splits(&self) -> Vec<&str> {
        self.definition.quick_splits.keys().map(String::as_str).collect()
    }

    /// Apply a composite shortcut setting several filters at once.
    pub async fn apply_quick_split(&mut self, name: &str) -> Result<()> {
        let split = self.quick_split(name)?.clone();
        if split.requires_submit {
            self.submit_control().await?;
        }

        if self.dismiss_overlay().await? {
            self.refresh().await?;
        }
        self.driver.click(&split.control).await?;
        if split.requires_submit {
            self.click_submit().await?;
        }
        self.settle().await?;

        info!(split = name, "applied quick split");
        Ok(())
    }

    /// The grid's data under the current filters.
    ///
    /// Scraped grids are walked page by page; downloadable grids are fetched
    /// through the export control and read back.
    pub async fn records(&mut self) -> Result<TableRecord> {
        match self.definition.export.clone() {
            ExportMethod::Table(selectors) => {
                let record = scrape_paginated(&self.driver, &selectors, &self.settings.wait).await?;
                if selectors.pagination.is_some() {
                    self.refresh().await?;
                }
                Ok(record)
            }
            ExportMethod::Download { control } => {
                let path = self
                    .driver
                    .download(&control, self.settings.wait.timeout)
                    .await?;
                let record = TableRecord::read_csv(&path, DOWNLOAD_DELIMITER);
                let removed = std::fs::remove_file(&path);
                let record = record?;
                removed?;
                Ok(record)
            }
        }
    }

    /// Save the grid's data as delimited text.
    ///
    /// Without a destination the file lands at
    /// `<export_dir>/<page-id>_<timestamp>.csv`. Returns the written path.
    pub async fn export(&mut self, destination: Option<&Path>) -> Result<PathBuf> {
        let destination = match destination {
            Some(path) => path.to_path_buf(),
            None => self.default_destination()?,
        };

        match self.definition.export.clone() {
            ExportMethod::Download { control } => {
                let downloaded = self
                    .driver
                    .download(&control, self.settings.wait.timeout)
                    .await?;
                move_file(&downloaded, &destination)?;
            }
            ExportMethod::Table(_) => {
                let record = self.records().await?;
                record.write_csv(&destination, self.settings.delimiter)?;
            }
        }

        info!(
            page_id = %self.definition.id(),
            path = %destination.display(),
            "exported grid"
        );
        Ok(destination)
    }

    /// Release the driver, e.g. to shut the browser down.
    pub fn into_driver(self) -> D {
        self.driver
    }

    fn default_destination(&self) -> Result<PathBuf> {
        default_export_path(
            &self.settings.export_dir,
            self.definition.id(),
            &Timestamp::now(),
            &self.settings.timestamp_format,
        )
    }

    fn quick_split(&self, name: &str) -> Result<&QuickSplitDefinition> {
        self.definition
            .quick_splits
            .iter()
            .find(|(key, _)| labels_match(key, name))
            .map(|(_, split)| split)
            .ok_or_else(|| {
                PageError::UnknownFilter {
                    name: name.to_string(),
                }
                .into()
            })
    }

    async fn await_ready(&self) -> Result<()> {
        self.driver
            .wait_for_selector(&self.definition.page.ready_selector, self.settings.wait.timeout)
            .await?;
        Ok(())
    }

    /// Close the transient overlay if it is showing. Returns whether it was.
    async fn dismiss_overlay(&self) -> Result<bool> {
        let Some(selector) = &self.definition.page.overlay_dismiss else {
            return Ok(false);
        };

        let live = Snapshot::new(self.driver.content().await?);
        if !live.exists(selector)? {
            return Ok(false);
        }

        self.driver.click(selector).await?;
        debug!(page_id = %self.definition.id(), "dismissed overlay");
        Ok(true)
    }

    /// Selector of the submit control, failing unless it is declared and on the page.
    async fn submit_control(&self) -> Result<&str> {
        let unavailable = |reason: String| ScrapeError::UpdateUnavailable {
            page: self.definition.id().to_string(),
            reason,
        };

        let selector = self
            .definition
            .page
            .submit_button
            .as_deref()
            .ok_or_else(|| unavailable("no submit control declared".to_string()))?;

        let live = Snapshot::new(self.driver.content().await?);
        if !live.exists(selector)? {
            return Err(unavailable(format!("submit control {selector:?} is not on the page")));
        }
        Ok(selector)
    }

    async fn click_submit(&self) -> Result<()> {
        let selector = self.submit_control().await?;
        self.driver.click(selector).await?;
        Ok(())
    }

    async fn settle(&mut self) -> Result<()> {
        tokio::time::sleep(self.settings.wait.settle_delay).await;
        self.await_ready().await?;
        self.refresh().await
    }
}
