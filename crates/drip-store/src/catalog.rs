//! Read-only content catalog.

use std::path::Path;

use drip_core::ContentItem;

use crate::doc::read_doc;
use crate::error::{Result, StoreError};

/// The full pool of deliverable content, loaded once at startup.
///
/// Immutable for the process lifetime — new items require a restart.
/// Needs no locking; the scheduler shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<ContentItem>,
}

impl Catalog {
    /// Load and validate the catalog document (a JSON array of items).
    ///
    /// Duplicate ids are rejected at load time: the ledger stores bare ids,
    /// so two items sharing one would corrupt the no-repeat bookkeeping.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let items: Vec<ContentItem> = read_doc(path)?;

        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if !seen.insert(item.id) {
                return Err(StoreError::Invalid {
                    path: path.display().to_string(),
                    message: format!("duplicate content id {}", item.id),
                });
            }
        }

        Ok(Self { items })
    }

    /// Build a catalog directly from items. Test seam; production always
    /// goes through [`Catalog::load`].
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_valid_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "text": "first", "media": "photos/1.jpg"},
                {"id": 2, "text": "second", "available_from": "2099-01-01"}
            ]"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().text, "first");
        assert!(catalog.get(2).unwrap().available_from.is_some());
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "text": "a"}, {"id": 1, "text": "b"}]"#,
        )
        .unwrap();

        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Invalid { .. }));
    }

    #[test]
    fn missing_catalog_is_fatal() {
        assert!(Catalog::load("/nonexistent/catalog.json").is_err());
    }
}
