use crate::error::{BrowserError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Browser actions for driving one page.
///
/// Selectors are CSS selectors. Calls are strictly sequential; the page is
/// never touched by two calls at once.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Fill a form field by selector
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Click the first element matching a selector
    async fn click(&self, selector: &str) -> Result<()> {
        self.click_nth(selector, 0).await
    }

    /// Click the element at `index` among all matches of a selector
    async fn click_nth(&self, selector: &str, index: usize) -> Result<()>;

    /// Wait for a selector to appear, failing with `Timeout` after `timeout`
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Extract text from an element
    async fn extract_text(&self, selector: &str) -> Result<String>;

    /// Read an attribute of an element
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Serialized HTML of the whole document
    async fn content(&self) -> Result<String>;

    /// Run a read-only JS function declaration with `this` bound to the element
    async fn evaluate(&self, selector: &str, function: &str) -> Result<serde_json::Value>;

    /// Live checked state of a checkbox
    async fn is_checked(&self, selector: &str) -> Result<bool>;

    /// Text of the selected entry of a native `<select>`
    async fn selected_text(&self, selector: &str) -> Result<String>;

    /// Select the entry at `index` of a native `<select>` and fire `change`
    async fn select_index(&self, selector: &str, index: usize) -> Result<()>;

    /// Click a control that triggers a download and resolve the saved file
    async fn download(&self, selector: &str, timeout: Duration) -> Result<PathBuf>;

    /// Take a screenshot
    async fn screenshot(&self) -> Result<Vec<u8>>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://stats.example.com/leaders?pos=all").unwrap(),
            "stats.example.com"
        );
        assert_eq!(
            extract_domain("http://localhost:8080/depth-charts").unwrap(),
            "localhost"
        );
    }

    #[test]
    fn test_extract_domain_invalid() {
        assert!(extract_domain("not-a-url").is_err());
        assert!(extract_domain("data:text/html,<p>hi</p>").is_err());
    }
}
