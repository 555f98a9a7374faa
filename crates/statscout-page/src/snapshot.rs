//! Offline queries over one captured document.
//!
//! Reads after a refresh go through a [`Snapshot`] instead of one browser
//! round-trip per node. The HTML is re-parsed per query so the snapshot
//! stays `Send` and can be held across awaits.

use crate::error::{PageError, Result};
use scraper::{ElementRef, Html, Selector};

/// Parse a CSS selector.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PageError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Text content of an element with runs of whitespace collapsed.
#[must_use]
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Immutable copy of a page's HTML at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    source: String,
}

impl Snapshot {
    /// Wrap a serialized document.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The raw HTML.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.source
    }

    /// Parse the HTML into a queryable tree.
    #[must_use]
    pub fn document(&self) -> Html {
        Html::parse_document(&self.source)
    }

    /// Whether at least one element matches.
    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.count(selector)? > 0)
    }

    /// Number of matching elements.
    pub fn count(&self, selector: &str) -> Result<usize> {
        let selector = parse_selector(selector)?;
        Ok(self.document().select(&selector).count())
    }

    /// Texts of all matching elements in document order.
    pub fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document()
            .select(&selector)
            .map(|el| element_text(&el))
            .collect())
    }

    /// Text of the first matching element.
    pub fn text(&self, selector: &str) -> Result<Option<String>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document()
            .select(&selector)
            .next()
            .map(|el| element_text(&el)))
    }

    /// Attribute of the first matching element.
    ///
    /// `None` when nothing matches or the attribute is absent.
    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document()
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(name).map(ToString::to_string)))
    }

    /// Whether the first matching element carries `class`; `None` when nothing matches.
    pub fn has_class(&self, selector: &str, class: &str) -> Result<Option<bool>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document()
            .select(&selector)
            .next()
            .map(|el| el.value().classes().any(|c| c == class)))
    }

    /// For each matching element, whether it carries `class`.
    pub fn flags_with_class(&self, selector: &str, class: &str) -> Result<Vec<bool>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document()
            .select(&selector)
            .map(|el| el.value().classes().any(|c| c == class))
            .collect())
    }
}
