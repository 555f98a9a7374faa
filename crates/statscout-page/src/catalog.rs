//! In-memory catalog of page definitions.

use crate::{
    definition::PageDefinition,
    error::{PageError, Result},
    loader::PageLoader,
};
use statscout_core::PageId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Cache of validated page definitions, shareable across tasks.
#[derive(Clone, Default)]
pub struct PageCatalog {
    definitions: Arc<RwLock<HashMap<PageId, PageDefinition>>>,
}

impl PageCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding everything the loader finds.
    ///
    /// # Errors
    /// Returns error if the definitions directory can't be read.
    pub fn load_from(loader: &PageLoader) -> Result<Self> {
        let catalog = Self::new();
        catalog.reload(loader)?;
        Ok(catalog)
    }

    /// Replace the cached definitions with a fresh load.
    ///
    /// # Errors
    /// Returns error if the definitions directory can't be read.
    pub fn reload(&self, loader: &PageLoader) -> Result<()> {
        let definitions = loader.load_all()?;

        let mut cache = self.write();
        cache.clear();
        for definition in definitions {
            cache.insert(definition.id().clone(), definition);
        }

        info!(count = cache.len(), "reloaded page definitions");
        Ok(())
    }

    /// Get a page definition by ID.
    ///
    /// # Errors
    /// Returns `NotFound` if no definition has this ID.
    pub fn get(&self, page_id: &PageId) -> Result<PageDefinition> {
        self.read()
            .get(page_id)
            .cloned()
            .ok_or_else(|| PageError::NotFound {
                page_id: page_id.to_string(),
            })
    }

    /// All definitions, sorted by ID.
    #[must_use]
    pub fn get_all(&self) -> Vec<PageDefinition> {
        let mut all: Vec<_> = self.read().values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    /// All page IDs, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<PageId> {
        let mut ids: Vec<_> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of cached definitions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Whether a definition with this ID is cached.
    #[must_use]
    pub fn contains(&self, page_id: &PageId) -> bool {
        self.read().contains_key(page_id)
    }

    /// Add or replace a definition after validating it.
    ///
    /// # Errors
    /// Returns `ValidationError` if the definition is invalid.
    pub fn insert(&self, definition: PageDefinition) -> Result<()> {
        definition.validate()?;

        let page_id = definition.id().clone();
        self.write().insert(page_id.clone(), definition);
        debug!(page_id = %page_id, "inserted page definition");
        Ok(())
    }

    /// Remove a definition. Returns whether it was present.
    pub fn remove(&self, page_id: &PageId) -> bool {
        let removed = self.write().remove(page_id).is_some();
        if removed {
            debug!(page_id = %page_id, "removed page definition");
        }
        removed
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PageId, PageDefinition>> {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PageId, PageDefinition>> {
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(id: &str) -> String {
        format!(
            r##"
[page]
id = "{id}"
name = "Page {id}"
url = "https://stats.example.com/{id}"
ready_selector = "table"

[export]
method = "table"
table = "table"
"##
        )
    }

    fn definition(id: &str) -> PageDefinition {
        toml::from_str(&source(id)).expect("parse definition")
    }

    #[test]
    fn test_catalog_insert_and_get() {
        let catalog = PageCatalog::new();
        assert_eq!(catalog.count(), 0);

        catalog.insert(definition("batting-leaders")).expect("insert");

        let page_id = PageId::new("batting-leaders").expect("valid page ID");
        assert!(catalog.contains(&page_id));
        assert_eq!(catalog.get(&page_id).expect("get").name(), "Page batting-leaders");
    }

    #[test]
    fn test_catalog_get_missing() {
        let catalog = PageCatalog::new();
        let page_id = PageId::new("depth-chart").expect("valid page ID");
        assert!(matches!(
            catalog.get(&page_id),
            Err(PageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_catalog_insert_validates() {
        let catalog = PageCatalog::new();
        let mut invalid = definition("batting-leaders");
        invalid.page.url = "ftp://stats.example.com".to_string();

        assert!(matches!(
            catalog.insert(invalid),
            Err(PageError::ValidationError { .. })
        ));
        assert_eq!(catalog.count(), 0);
    }

    #[test]
    fn test_catalog_remove() {
        let catalog = PageCatalog::new();
        catalog.insert(definition("depth-chart")).expect("insert");
        let page_id = PageId::new("depth-chart").expect("valid page ID");

        assert!(catalog.remove(&page_id));
        assert!(!catalog.contains(&page_id));
        assert!(!catalog.remove(&page_id));
    }

    #[test]
    fn test_catalog_ids_sorted_and_shared() {
        let catalog = PageCatalog::new();
        let shared = catalog.clone();
        catalog.insert(definition("pitching-leaders")).expect("insert");
        catalog.insert(definition("batting-leaders")).expect("insert");

        let ids: Vec<String> = shared.ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["batting-leaders", "pitching-leaders"]);
        assert_eq!(shared.get_all().len(), 2);
    }

    #[test]
    fn test_catalog_reload_replaces_contents() {
        let temp_dir = TempDir::new().expect("create temp dir");
        std::fs::write(temp_dir.path().join("depth-chart.toml"), source("depth-chart"))
            .expect("write");

        let loader = PageLoader::new(temp_dir.path()).expect("create loader");
        let catalog = PageCatalog::new();
        catalog.insert(definition("batting-leaders")).expect("insert");

        catalog.reload(&loader).expect("reload");
        let ids: Vec<String> = catalog.ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["depth-chart"]);

        let loaded = PageCatalog::load_from(&loader).expect("load");
        assert_eq!(loaded.count(), 1);
    }
}
