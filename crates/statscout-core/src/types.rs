//! Shared types used across statscout.
//!
//! This module defines the newtypes and enums that name filters, carry
//! filter values and identify page definitions.

use crate::error::StatscoutError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Case-insensitive identifier of one configurable control on a page.
///
/// The original spelling is kept for display; comparisons, ordering and
/// hashing use the lowercase form, so `"Season1"` and `"season1"` are the
/// same filter.
#[derive(Debug, Clone)]
pub struct FilterName {
    display: String,
    key: String,
}

impl FilterName {
    /// Create a new `FilterName`.
    ///
    /// # Errors
    /// Returns error if the name is empty after trimming.
    pub fn new(name: impl AsRef<str>) -> Result<Self, StatscoutError> {
        let display = name.as_ref().trim();
        if display.is_empty() {
            return Err(StatscoutError::Validation(
                "filter name cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            display: display.to_string(),
            key: display.to_lowercase(),
        })
    }

    /// Name as it was written in the page definition.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Normalized lookup key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for FilterName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for FilterName {}

impl Hash for FilterName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for FilterName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FilterName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for FilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

impl Serialize for FilterName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for FilterName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// One selectable value of a filter.
///
/// Dropdowns and selection groups use `Text`; checkboxes and switches use
/// `Flag`; multi-select dropdowns report (and accept) `Many`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean state of a checkbox or switch
    Flag(bool),
    /// A single option label
    Text(String),
    /// An ordered set of option labels
    Many(Vec<String>),
}

impl FilterValue {
    /// Interpret the value as a boolean.
    ///
    /// Accepts `Flag` and the texts `true`/`false` in any case.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(text) => match text.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Self::Many(_) => None,
        }
    }

    /// Option labels carried by the value; empty for `Flag`.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Self::Flag(_) => Vec::new(),
            Self::Text(text) => vec![text.as_str()],
            Self::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Case-insensitive comparison against an option label.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Self::Text(text) => labels_match(text, label),
            Self::Flag(flag) => labels_match(&flag.to_string(), label),
            Self::Many(_) => false,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Text(text) => write!(f, "{text}"),
            Self::Many(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        Self::Many(items)
    }
}

/// Case-insensitive, whitespace-tolerant label comparison.
#[must_use]
pub fn labels_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Newtype for page definition identifiers with validation.
///
/// Page IDs must be lowercase alphanumeric with hyphens, 3-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageId(String);

impl PageId {
    /// Create a new `PageId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, StatscoutError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate page ID format: lowercase alphanumeric with hyphens, 3-50 chars.
    fn validate(id: &str) -> Result<(), StatscoutError> {
        static PAGE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PAGE_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,48}[a-z0-9]$").expect("valid regex"));

        if id.len() < 3 || id.len() > 50 {
            return Err(StatscoutError::Validation(format!(
                "invalid page ID: must be 3-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(StatscoutError::Validation(format!(
                "invalid page ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for PageId {
    type Error = StatscoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageId> for String {
    fn from(id: PageId) -> Self {
        id.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Format with a `strftime`-style pattern, as used in export file names.
    ///
    /// # Errors
    /// Returns error if the pattern holds an unknown or malformed specifier.
    pub fn format(&self, pattern: &str) -> Result<String, StatscoutError> {
        Self::check_format(pattern)?;
        let mut out = String::new();
        write!(out, "{}", self.0.format(pattern)).map_err(|_| {
            StatscoutError::Validation(format!("cannot format timestamp with {pattern:?}"))
        })?;
        Ok(out)
    }

    /// Check that `pattern` is a usable `strftime`-style pattern.
    ///
    /// # Errors
    /// Returns error if the pattern holds an unknown or malformed specifier.
    pub fn check_format(pattern: &str) -> Result<(), StatscoutError> {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(StatscoutError::Validation(format!(
                "invalid timestamp format {pattern:?}"
            )));
        }
        Ok(())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}
