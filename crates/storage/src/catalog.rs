//! Read-only catalogs of the sets shipped with the app.
//!
//! On disk a set is `<dir>/<set-id>.json`, a JSON array of items. The set id
//! comes from the file name and overrides whatever `setId` the entries carry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quiz_core::model::{Item, ItemDraft, ItemError, ItemSet, SetId, builtin_sets};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown catalog set {0}")]
    UnknownSet(SetId),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("set {set} is not valid JSON: {source}")]
    Parse {
        set: SetId,
        #[source]
        source: serde_json::Error,
    },

    #[error("set {set} contains an invalid item: {source}")]
    InvalidItem {
        set: SetId,
        #[source]
        source: ItemError,
    },
}

/// Source of the static sets.
pub trait CatalogProvider: Send + Sync {
    /// The sets this catalog can load, in display order.
    fn sets(&self) -> Vec<ItemSet>;

    /// Every item of one set.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownSet` for a set not listed by [`sets`],
    /// or an I/O or parse error if the set data is unusable.
    ///
    /// [`sets`]: CatalogProvider::sets
    fn load_set(&self, set_id: &SetId) -> Result<Vec<Item>, CatalogError>;

    /// Every item of every set, in set order.
    ///
    /// # Errors
    ///
    /// Fails on the first set that cannot be loaded.
    fn load_all(&self) -> Result<Vec<Item>, CatalogError> {
        let mut items = Vec::new();
        for set in self.sets() {
            items.extend(self.load_set(set.id())?);
        }
        Ok(items)
    }
}

/// Parse a set file, stamping every entry with `set_id`.
///
/// # Errors
///
/// Returns `CatalogError::Parse` for malformed JSON and
/// `CatalogError::InvalidItem` for the first entry that fails validation.
pub fn parse_set(set_id: &SetId, json: &str) -> Result<Vec<Item>, CatalogError> {
    let drafts: Vec<ItemDraft> = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        set: set_id.clone(),
        source,
    })?;

    drafts
        .into_iter()
        .map(|draft| {
            ItemDraft {
                set_id: Some(set_id.clone()),
                ..draft
            }
            .validate()
            .map_err(|source| CatalogError::InvalidItem {
                set: set_id.clone(),
                source,
            })
        })
        .collect()
}

//
// ─── DIRECTORY CATALOG ─────────────────────────────────────────────────────────
//

/// The built-in JLPT sets, read from a directory of JSON files.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    dir: PathBuf,
    sets: Vec<ItemSet>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sets: builtin_sets(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, set_id: &SetId) -> PathBuf {
        self.dir.join(format!("{set_id}.json"))
    }
}

impl CatalogProvider for StaticCatalog {
    fn sets(&self) -> Vec<ItemSet> {
        self.sets.clone()
    }

    fn load_set(&self, set_id: &SetId) -> Result<Vec<Item>, CatalogError> {
        if !self.sets.iter().any(|s| s.id() == set_id) {
            return Err(CatalogError::UnknownSet(set_id.clone()));
        }
        let path = self.path_for(set_id);
        let json =
            std::fs::read_to_string(&path).map_err(|source| CatalogError::Io { path, source })?;
        let items = parse_set(set_id, &json)?;
        tracing::debug!(set = %set_id, count = items.len(), "loaded catalog set");
        Ok(items)
    }
}

//
// ─── IN-MEMORY CATALOG ─────────────────────────────────────────────────────────
//

/// Catalog held in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    sets: Vec<ItemSet>,
    items: HashMap<SetId, Vec<Item>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set; its items are re-homed into it.
    #[must_use]
    pub fn with_set(mut self, set: ItemSet, items: impl IntoIterator<Item = Item>) -> Self {
        let homed = items
            .into_iter()
            .map(|item| {
                if item.set_id() == set.id() {
                    item
                } else {
                    let draft = ItemDraft {
                        set_id: Some(set.id().clone()),
                        ..ItemDraft::from(item.clone())
                    };
                    draft.validate().unwrap_or(item)
                }
            })
            .collect();
        self.items.insert(set.id().clone(), homed);
        self.sets.push(set);
        self
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn sets(&self) -> Vec<ItemSet> {
        self.sets.clone()
    }

    fn load_set(&self, set_id: &SetId) -> Result<Vec<Item>, CatalogError> {
        self.items
            .get(set_id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownSet(set_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N5: &str = r#"[
        { "id": "n5-1", "kanji": "日", "readings": ["にち"], "meanings": ["sol", "día"] },
        { "id": "n5-2", "kanji": "月", "readings": ["げつ"], "meanings": ["luna"], "setId": "other" }
    ]"#;

    fn n5() -> SetId {
        SetId::new("n5").unwrap()
    }

    #[test]
    fn parse_set_injects_set_id() {
        let items = parse_set(&n5(), N5).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.set_id() == &n5()));
        assert_eq!(items[0].primary_meaning(), "sol");
    }

    #[test]
    fn parse_set_rejects_bad_input() {
        assert!(matches!(
            parse_set(&n5(), "{ not json"),
            Err(CatalogError::Parse { .. })
        ));
        let invalid = r#"[{ "id": "x", "kanji": "", "meanings": ["a"] }]"#;
        assert!(matches!(
            parse_set(&n5(), invalid),
            Err(CatalogError::InvalidItem { .. })
        ));
    }

    #[test]
    fn directory_catalog_reads_set_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("n5.json"), N5).unwrap();
        let catalog = StaticCatalog::new(dir.path());

        let items = catalog.load_set(&n5()).unwrap();
        assert_eq!(items.len(), 2);

        let missing = catalog.load_set(&SetId::new("n4").unwrap());
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
        assert!(catalog.load_all().is_err());

        let unknown = catalog.load_set(&SetId::new("n1").unwrap());
        assert!(matches!(unknown, Err(CatalogError::UnknownSet(_))));
    }

    #[test]
    fn in_memory_catalog_rehomes_items() {
        let items = parse_set(&SetId::new("elsewhere").unwrap(), N5).unwrap();
        let set = ItemSet::new(n5(), "JLPT N5", false).unwrap();
        let catalog = InMemoryCatalog::new().with_set(set, items);

        let loaded = catalog.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|i| i.set_id() == &n5()));
    }
}
