//! In-memory page driver for tests.
//!
//! A [`FakeSite`] renders its state to HTML and reacts to clicks; a
//! [`FakePage`] wraps it behind [`BrowserActions`] and records every
//! interaction so tests can assert how many clicks an operation cost.

use crate::snapshot::{element_text, parse_selector, Snapshot};
use scraper::Html;
use statscout_browser::{BrowserActions, BrowserError, Result};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A scripted site: state plus reactions to interactions.
pub trait FakeSite: Send {
    /// Serialize the current state as a document.
    fn render(&self) -> String;

    /// React to a click on the `index`-th match of `selector`.
    fn click(&mut self, selector: &str, index: usize);

    /// React to choosing entry `index` of the native `<select>` at `selector`.
    fn select(&mut self, _selector: &str, _index: usize) {}

    /// React to typing into a field.
    fn fill(&mut self, _selector: &str, _value: &str) {}

    /// React to a navigation; sites usually reset their state here.
    fn navigate(&mut self, _url: &str) {}

    /// Contents of the file a click on `selector` downloads, if any.
    fn download(&mut self, _selector: &str) -> Option<String> {
        None
    }
}

struct State<S> {
    site: S,
    clicks: Vec<(String, usize)>,
    navigations: Vec<String>,
    downloads: usize,
}

/// [`BrowserActions`] over a [`FakeSite`].
pub struct FakePage<S> {
    state: Mutex<State<S>>,
    download_dir: PathBuf,
}

impl<S: FakeSite> FakePage<S> {
    /// Wrap a site. Downloads go to a per-process directory under the system temp dir.
    pub fn new(site: S) -> Self {
        let download_dir =
            std::env::temp_dir().join(format!("statscout-fake-downloads-{}", std::process::id()));
        Self {
            state: Mutex::new(State {
                site,
                clicks: Vec::new(),
                navigations: Vec::new(),
                downloads: 0,
            }),
            download_dir,
        }
    }

    /// Write downloads into `dir` instead.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Mutate the site directly, bypassing the recorded interactions.
    pub fn with_site<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.lock().site)
    }

    /// Every click so far as `(selector, index)`.
    pub fn clicks(&self) -> Vec<(String, usize)> {
        self.lock().clicks.clone()
    }

    /// Number of clicks so far.
    pub fn click_count(&self) -> usize {
        self.lock().clicks.len()
    }

    /// Every URL navigated to so far.
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    /// Forget recorded interactions.
    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.clicks.clear();
        state.navigations.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State<S>> {
        // A panicking test poisons the lock; the state is still usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn rendered(&self) -> Snapshot {
        Snapshot::new(self.lock().site.render())
    }

    fn count(&self, selector: &str) -> Result<usize> {
        self.rendered()
            .count(selector)
            .map_err(|e| BrowserError::SelectorNotFound(e.to_string()))
    }

    fn require(&self, selector: &str, index: usize) -> Result<()> {
        let found = self.count(selector)?;
        if index < found {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(format!(
                "{selector} (index {index} of {found})"
            )))
        }
    }
}

#[async_trait::async_trait]
impl<S: FakeSite> BrowserActions for FakePage<S> {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.navigations.push(url.to_string());
        state.site.navigate(url);
        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        self.require(selector, 0)?;
        self.lock().site.fill(selector, value);
        Ok(())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        self.require(selector, index)?;
        let mut state = self.lock();
        state.clicks.push((selector.to_string(), index));
        state.site.click(selector, index);
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        // Fake sites change only on interaction, so one look is final.
        if self.count(selector)? > 0 {
            Ok(())
        } else {
            Err(BrowserError::Timeout {
                what: selector.to_string(),
                waited: timeout,
            })
        }
    }

    async fn extract_text(&self, selector: &str) -> Result<String> {
        self.rendered()
            .text(selector)
            .map_err(|e| BrowserError::SelectorNotFound(e.to_string()))?
            .ok_or_else(|| BrowserError::SelectorNotFound(selector.to_string()))
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        self.require(selector, 0)?;
        self.rendered()
            .attr(selector, name)
            .map_err(|e| BrowserError::SelectorNotFound(e.to_string()))
    }

    async fn content(&self) -> Result<String> {
        Ok(self.lock().site.render())
    }

    async fn evaluate(&self, selector: &str, _function: &str) -> Result<serde_json::Value> {
        Err(BrowserError::EvaluationError {
            selector: selector.to_string(),
            reason: "fake pages do not run scripts".to_string(),
        })
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        self.require(selector, 0)?;
        Ok(self
            .rendered()
            .attr(selector, "checked")
            .map_err(|e| BrowserError::SelectorNotFound(e.to_string()))?
            .is_some())
    }

    async fn selected_text(&self, selector: &str) -> Result<String> {
        self.require(selector, 0)?;
        let document = Html::parse_document(&self.lock().site.render());
        let options = parse_selector(&format!("{selector} option"))
            .map_err(|e| BrowserError::SelectorNotFound(e.to_string()))?;

        let mut entries = document.select(&options).peekable();
        let first = entries.peek().map(element_text);
        let selected = entries
            .find(|el| el.value().attr("selected").is_some())
            .map(|el| element_text(&el));
        Ok(selected.or(first).unwrap_or_default())
    }

    async fn select_index(&self, selector: &str, index: usize) -> Result<()> {
        self.require(selector, 0)?;
        let entries = self.count(&format!("{selector} option"))?;
        if index >= entries {
            return Err(BrowserError::EvaluationError {
                selector: selector.to_string(),
                reason: format!("option index {index} out of range"),
            });
        }
        self.lock().site.select(selector, index);
        Ok(())
    }

    async fn download(&self, selector: &str, timeout: Duration) -> Result<PathBuf> {
        self.require(selector, 0)?;
        let (contents, n) = {
            let mut state = self.lock();
            state.clicks.push((selector.to_string(), 0));
            let contents = state.site.download(selector);
            state.downloads += 1;
            (contents, state.downloads)
        };

        let contents = contents.ok_or_else(|| BrowserError::Timeout {
            what: format!("download triggered by {selector}"),
            waited: timeout,
        })?;

        std::fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(format!("download-{n}.csv"));
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        value: usize,
        visits: usize,
    }

    impl FakeSite for Counter {
        fn render(&self) -> String {
            format!(
                r#"<p id="value" data-visits="{}">{}</p><button id="inc">+</button>
                <select id="step"><option>1</option><option selected>5</option></select>
                <input id="box" type="checkbox">"#,
                self.visits, self.value
            )
        }

        fn click(&mut self, selector: &str, _index: usize) {
            if selector == "#inc" {
                self.value += 1;
            }
        }

        fn navigate(&mut self, _url: &str) {
            self.value = 0;
            self.visits += 1;
        }

        fn download(&mut self, selector: &str) -> Option<String> {
            (selector == "#inc").then(|| format!("value\n{}\n", self.value))
        }
    }

    #[tokio::test]
    async fn test_clicks_are_recorded_and_applied() {
        let page = FakePage::new(Counter::default());
        page.click("#inc").await.unwrap();
        page.click("#inc").await.unwrap();

        assert_eq!(page.extract_text("#value").await.unwrap(), "2");
        assert_eq!(page.click_count(), 2);

        let err = page.click_nth("#inc", 1).await.unwrap_err();
        assert!(matches!(err, BrowserError::SelectorNotFound(_)));
        assert_eq!(page.click_count(), 2);
    }

    #[tokio::test]
    async fn test_navigation_resets_site() {
        let page = FakePage::new(Counter::default());
        page.click("#inc").await.unwrap();
        page.navigate("https://stats.example.com/").await.unwrap();

        assert_eq!(page.extract_text("#value").await.unwrap(), "0");
        assert_eq!(
            page.attribute("#value", "data-visits").await.unwrap(),
            Some("1".to_string())
        );
        assert_eq!(page.navigations(), vec!["https://stats.example.com/"]);
    }

    #[tokio::test]
    async fn test_form_state() {
        let page = FakePage::new(Counter::default());
        assert_eq!(page.selected_text("#step").await.unwrap(), "5");
        assert!(!page.is_checked("#box").await.unwrap());
        assert!(page.select_index("#step", 2).await.is_err());
    }

    #[tokio::test]
    async fn test_wait_for_missing_selector_times_out() {
        let page = FakePage::new(Counter::default());
        page.wait_for_selector("#inc", Duration::from_millis(10))
            .await
            .unwrap();
        let err = page
            .wait_for_selector("#grid", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let page = FakePage::new(Counter::default()).with_download_dir(dir.path());
        let path = page
            .download("#inc", Duration::from_millis(10))
            .await
            .unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "value\n0\n");
    }
}
