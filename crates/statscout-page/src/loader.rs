//! Page definition loading from TOML files.
//!
//! Definitions live one per file under a `page-definitions/` directory,
//! optionally grouped into subdirectories by site. A file is found by its
//! page ID: `batting-leaders` loads from `**/batting-leaders.toml`.

use crate::{
    definition::PageDefinition,
    error::{PageError, Result},
};
use statscout_core::PageId;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory name searched for by [`PageLoader::with_default_dir`].
pub const DEFAULT_DEFINITIONS_DIR: &str = "page-definitions";

/// Loader for page definitions from TOML files.
#[derive(Debug, Clone)]
pub struct PageLoader {
    definitions_dir: PathBuf,
}

impl PageLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns `DirectoryNotFound` if the path is missing or not a directory.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(PageError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Create a loader using the default definitions directory.
    ///
    /// Walks up from the working directory to the first ancestor holding a
    /// `page-definitions/` directory, falling back to the relative path.
    ///
    /// # Errors
    /// Returns error if no such directory exists.
    pub fn with_default_dir() -> Result<Self> {
        let current_dir = std::env::current_dir()?;

        for dir in current_dir.ancestors() {
            let candidate = dir.join(DEFAULT_DEFINITIONS_DIR);
            if candidate.is_dir() {
                return Self::new(candidate);
            }
        }

        Self::new(DEFAULT_DEFINITIONS_DIR)
    }

    /// Directory definitions are read from.
    #[must_use]
    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Load a single page definition by ID.
    ///
    /// # Errors
    /// Returns error if the file doesn't exist, can't be read, or is invalid.
    pub fn load(&self, page_id: &PageId) -> Result<PageDefinition> {
        let filename = format!("{}.toml", page_id.as_str());
        let path = find_file(&self.definitions_dir, &filename)?.ok_or_else(|| {
            PageError::NotFound {
                page_id: page_id.to_string(),
            }
        })?;

        let definition = load_from_path(&path)?;
        definition.validate()?;

        if definition.id() != page_id {
            return Err(PageError::ValidationError {
                page_id: page_id.to_string(),
                reason: format!("{} declares id {}", path.display(), definition.id()),
            });
        }

        debug!(
            page_id = %page_id,
            name = %definition.name(),
            filters = definition.filters.len(),
            "loaded page definition"
        );

        Ok(definition)
    }

    /// Load every page definition under the definitions directory.
    ///
    /// Unreadable or invalid files are logged and skipped.
    ///
    /// # Errors
    /// Returns error if a directory can't be read.
    pub fn load_all(&self) -> Result<Vec<PageDefinition>> {
        let mut definitions = Vec::new();
        walk(&self.definitions_dir, &mut definitions)?;

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded page definitions"
        );

        Ok(definitions)
    }
}

fn walk(dir: &Path, definitions: &mut Vec<PageDefinition>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, definitions)?;
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            continue;
        }

        match load_from_path(&path).and_then(|definition| {
            definition.validate()?;
            Ok(definition)
        }) {
            Ok(definition) => definitions.push(definition),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping page definition"
                );
            }
        }
    }

    Ok(())
}

fn find_file(dir: &Path, filename: &str) -> Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            if let Some(found) = find_file(&path, filename)? {
                return Ok(Some(found));
            }
        } else if path.file_name().and_then(|s| s.to_str()) == Some(filename) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Parse a page definition from a file without validating it.
///
/// # Errors
/// Returns `LoadError` when unreadable and `ParseError` on bad TOML.
pub fn load_from_path(path: &Path) -> Result<PageDefinition> {
    let contents = std::fs::read_to_string(path).map_err(|e| PageError::LoadError {
        path: path.display().to_string(),
        source: Box::new(e),
    })?;

    toml::from_str(&contents).map_err(|e| PageError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}
