use crate::actions::{extract_domain, BrowserActions};
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use statscout_core::AppConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Suffix Chromium gives files that are still being written.
const PARTIAL_DOWNLOAD_SUFFIX: &str = ".crdownload";

/// Browser engines statscout can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    /// Chromium or Google Chrome over the DevTools protocol
    Chromium,
}

impl FromStr for BrowserKind {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chromium" | "chrome" | "google-chrome" => Ok(Self::Chromium),
            other => Err(BrowserError::UnsupportedBrowser(other.to_string())),
        }
    }
}

/// Engine settings resolved from the application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EngineSettings {
    kind: BrowserKind,
    navigation_timeout: Duration,
    poll_interval: Duration,
}

impl EngineSettings {
    fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            kind: config.browser.engine.parse()?,
            navigation_timeout: config.browser.navigation_timeout(),
            poll_interval: config.scraping.poll_interval(),
        })
    }
}

/// Browser automation engine owning one browser process and one page.
///
/// Call [`BrowserEngine::shutdown`] when done. Dropping the engine stops the
/// event handler, and chromiumoxide kills the child process.
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    download_dir: PathBuf,
    navigation_timeout: Duration,
    poll_interval: Duration,
}

impl BrowserEngine {
    /// Launch a browser with default settings, downloading into the system temp dir.
    pub async fn new() -> Result<Self> {
        let download_dir = std::env::temp_dir().join("statscout-downloads");
        Self::launch(&AppConfig::default(), download_dir).await
    }

    /// Launch a browser according to `config`.
    ///
    /// Browser settings come from `config.browser`; waits poll the DOM every
    /// `config.scraping.poll_interval_ms`.
    pub async fn launch(config: &AppConfig, download_dir: impl Into<PathBuf>) -> Result<Self> {
        let settings = EngineSettings::from_config(config)?;
        let config = &config.browser;
        let download_dir = download_dir.into();
        std::fs::create_dir_all(&download_dir)?;

        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={user_agent}"));
        }
        let chromium_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chromium_config).await?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "browser handler event error");
                }
            }
        });

        let download_behavior = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(download_dir.display().to_string())
            .build()
            .map_err(BrowserError::ChromiumError)?;
        browser.execute(download_behavior).await?;

        let page = browser.new_page("about:blank").await?;

        tracing::info!(
            kind = ?settings.kind,
            headless = config.headless,
            download_dir = %download_dir.display(),
            "launched browser"
        );

        Ok(Self {
            browser,
            page,
            handler,
            download_dir,
            navigation_timeout: settings.navigation_timeout,
            poll_interval: settings.poll_interval,
        })
    }

    /// Interval between DOM polls while waiting.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Directory downloads are written to.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Close the browser and wait for the process to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        self.handler.abort();
        tracing::info!("browser shut down");
        Ok(())
    }

    async fn nth_element(&self, selector: &str, index: usize) -> Result<chromiumoxide::Element> {
        let mut elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;

        if index >= elements.len() {
            return Err(BrowserError::SelectorNotFound(format!(
                "{selector} (index {index} of {})",
                elements.len()
            )));
        }
        Ok(elements.swap_remove(index))
    }

    async fn element(&self, selector: &str) -> Result<chromiumoxide::Element> {
        self.page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))
    }

    fn list_downloads(&self) -> Result<HashSet<PathBuf>> {
        let mut files = HashSet::new();
        for entry in std::fs::read_dir(&self.download_dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.insert(path);
            }
        }
        Ok(files)
    }
}

impl Drop for BrowserEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str) -> Result<()> {
        let domain = extract_domain(url)?;
        tracing::debug!(%domain, url, "navigating");

        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout {
                what: format!("navigation to {url}"),
                waited: self.navigation_timeout,
            })?
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;

        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.element(selector).await?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await?;
        element.click().await?;
        element.type_str(value).await?;
        Ok(())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        let element = self.nth_element(selector, index).await?;
        element.click().await?;
        tracing::trace!(selector, index, "clicked");
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(BrowserError::Timeout {
                    what: selector.to_string(),
                    waited: timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn extract_text(&self, selector: &str) -> Result<String> {
        let element = self.element(selector).await?;
        let text = element.inner_text().await?.unwrap_or_default();
        Ok(text.trim().to_string())
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let element = self.element(selector).await?;
        Ok(element.attribute(name).await?)
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn evaluate(&self, selector: &str, function: &str) -> Result<serde_json::Value> {
        let element = self.element(selector).await?;
        let returns = element.call_js_fn(function, false).await?;

        if let Some(exception) = returns.exception_details {
            return Err(BrowserError::EvaluationError {
                selector: selector.to_string(),
                reason: exception.text,
            });
        }

        Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        let value = self
            .evaluate(selector, "function() { return this.checked === true; }")
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn selected_text(&self, selector: &str) -> Result<String> {
        let value = self
            .evaluate(
                selector,
                "function() { const o = this.options[this.selectedIndex]; return o ? o.text.trim() : ''; }",
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn select_index(&self, selector: &str, index: usize) -> Result<()> {
        let function = format!(
            "function() {{ this.selectedIndex = {index}; \
             this.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return this.selectedIndex; }}"
        );
        let value = self.evaluate(selector, &function).await?;

        if value.as_u64() == Some(index as u64) {
            Ok(())
        } else {
            Err(BrowserError::EvaluationError {
                selector: selector.to_string(),
                reason: format!("option index {index} out of range"),
            })
        }
    }

    async fn download(&self, selector: &str, timeout: Duration) -> Result<PathBuf> {
        let before = self.list_downloads()?;
        self.click(selector).await?;

        let started = Instant::now();
        loop {
            let finished = self.list_downloads()?.into_iter().find(|path| {
                !before.contains(path)
                    && !path.to_string_lossy().ends_with(PARTIAL_DOWNLOAD_SUFFIX)
            });
            if let Some(path) = finished {
                tracing::debug!(path = %path.display(), "download finished");
                return Ok(path);
            }
            if started.elapsed() >= timeout {
                return Err(BrowserError::Timeout {
                    what: format!("download triggered by {selector}"),
                    waited: timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self
            .page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await?)
    }
}
