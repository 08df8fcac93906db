use std::sync::Arc;

use quiz_core::model::{Item, ItemDraft, ItemId, ItemSet, SetId};
use storage::catalog::CatalogProvider;
use storage::repository::{ItemRepository, ItemSetRepository, StorageError};

use crate::error::CatalogServiceError;

/// Merges the static catalog with user-authored sets and items.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogProvider>,
    items: Arc<dyn ItemRepository>,
    sets: Arc<dyn ItemSetRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        items: Arc<dyn ItemRepository>,
        sets: Arc<dyn ItemSetRepository>,
    ) -> Self {
        Self {
            catalog,
            items,
            sets,
        }
    }

    fn is_builtin(&self, set_id: &SetId) -> bool {
        self.catalog.sets().iter().any(|s| s.id() == set_id)
    }

    /// Static sets first, then custom sets.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if custom sets cannot be read.
    pub async fn list_sets(&self) -> Result<Vec<ItemSet>, CatalogServiceError> {
        let mut sets = self.catalog.sets();
        sets.extend(self.sets.list_sets().await?);
        Ok(sets)
    }

    /// Every item, static and custom, restricted to `filter` unless it is empty.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Catalog` if a static set cannot be loaded
    /// and `CatalogServiceError::Storage` if custom items cannot be read.
    pub async fn load_pool(&self, filter: &[SetId]) -> Result<Vec<Item>, CatalogServiceError> {
        let mut pool = self.catalog.load_all()?;
        pool.extend(self.items.list_items(None).await?);
        if !filter.is_empty() {
            pool.retain(|item| filter.contains(item.set_id()));
        }
        Ok(pool)
    }

    /// Items of one set matching `query` (all items for an empty query).
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`CatalogService::load_pool`].
    pub async fn browse(
        &self,
        set_id: &SetId,
        query: &str,
    ) -> Result<Vec<Item>, CatalogServiceError> {
        let items = if self.is_builtin(set_id) {
            self.catalog.load_set(set_id)?
        } else {
            self.items.list_items(Some(set_id)).await?
        };
        Ok(items.into_iter().filter(|i| i.matches(query)).collect())
    }

    /// Validate and store a custom item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Item` for invalid drafts,
    /// `CatalogServiceError::BuiltinSet` when targeting a static set, and
    /// `CatalogServiceError::Storage` if persistence fails.
    pub async fn add_item(&self, draft: ItemDraft) -> Result<Item, CatalogServiceError> {
        let item = draft.validate()?;
        if self.is_builtin(item.set_id()) {
            return Err(CatalogServiceError::BuiltinSet(item.set_id().clone()));
        }
        self.items.upsert_item(&item).await?;
        tracing::debug!(item = %item.id(), set = %item.set_id(), "stored custom item");
        Ok(item)
    }

    /// Remove a custom item. Static items cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` with `StorageError::NotFound`
    /// if no custom item has this id.
    pub async fn remove_item(&self, id: &ItemId) -> Result<(), CatalogServiceError> {
        self.items.delete_item(id).await?;
        Ok(())
    }

    /// Create a custom set holding copies of `entries`.
    ///
    /// Copies get fresh ids, so the originals and their progress stay untouched.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Item` for a blank title and
    /// `CatalogServiceError::Storage` if persistence fails.
    pub async fn create_set(
        &self,
        title: &str,
        entries: &[Item],
    ) -> Result<ItemSet, CatalogServiceError> {
        let set = ItemSet::new(SetId::random(), title, true)?;
        self.sets.upsert_set(&set).await?;
        for entry in entries {
            self.items.upsert_item(&entry.copy_into(set.id().clone())).await?;
        }
        tracing::info!(set = %set.id(), title = set.title(), items = entries.len(), "created set");
        Ok(set)
    }

    /// Remove a custom set together with its items; returns the number of
    /// items removed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::BuiltinSet` for static sets and
    /// `CatalogServiceError::Storage` with `StorageError::NotFound` if the set
    /// neither exists nor holds any items.
    pub async fn remove_set(&self, set_id: &SetId) -> Result<u64, CatalogServiceError> {
        if self.is_builtin(set_id) {
            return Err(CatalogServiceError::BuiltinSet(set_id.clone()));
        }
        let removed = self.items.delete_items_in_set(set_id).await?;
        match self.sets.delete_set(set_id).await {
            Ok(()) => {}
            Err(StorageError::NotFound) if removed > 0 => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(set = %set_id, removed, "removed set");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::catalog::InMemoryCatalog;
    use storage::repository::InMemoryRepository;

    fn draft(id: &str, kanji: &str, meaning: &str, set: Option<&str>) -> ItemDraft {
        ItemDraft {
            id: ItemId::new(id).unwrap(),
            kanji: kanji.into(),
            readings: Vec::new(),
            meanings: vec![meaning.into()],
            set_id: set.map(|s| SetId::new(s).unwrap()),
            examples: Vec::new(),
        }
    }

    fn service() -> (CatalogService, InMemoryRepository) {
        let n5 = ItemSet::new(SetId::new("n5").unwrap(), "JLPT N5", false).unwrap();
        let catalog = InMemoryCatalog::new().with_set(
            n5,
            [
                draft("n5-1", "日", "sol", None).validate().unwrap(),
                draft("n5-2", "月", "luna", None).validate().unwrap(),
            ],
        );
        let repo = InMemoryRepository::new();
        let svc = CatalogService::new(
            Arc::new(catalog),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        (svc, repo)
    }

    #[tokio::test]
    async fn pool_merges_static_and_custom_items() {
        let (svc, _) = service();
        svc.add_item(draft("c-1", "猫", "gato", None)).await.unwrap();

        let all = svc.load_pool(&[]).await.unwrap();
        assert_eq!(all.len(), 3);

        let custom = svc.load_pool(&[SetId::custom_default()]).await.unwrap();
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].kanji(), "猫");

        let none = svc.load_pool(&[SetId::new("nope").unwrap()]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn builtin_sets_are_read_only() {
        let (svc, _) = service();
        let err = svc
            .add_item(draft("x", "火", "fuego", Some("n5")))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogServiceError::BuiltinSet(_)));

        let err = svc.remove_set(&SetId::new("n5").unwrap()).await.unwrap_err();
        assert!(matches!(err, CatalogServiceError::BuiltinSet(_)));

        let err = svc.remove_item(&ItemId::new("n5-1").unwrap()).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogServiceError::Storage(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn create_set_copies_entries_under_new_ids() {
        let (svc, _) = service();
        let entries = svc.load_pool(&[]).await.unwrap();

        let set = svc.create_set("Repaso", &entries).await.unwrap();
        assert!(set.is_custom());

        let copies = svc.browse(set.id(), "").await.unwrap();
        assert_eq!(copies.len(), 2);
        for copy in &copies {
            assert!(entries.iter().all(|e| e.id() != copy.id()));
        }

        let sets = svc.list_sets().await.unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[1].title(), "Repaso");

        assert!(matches!(
            svc.create_set("  ", &[]).await,
            Err(CatalogServiceError::Item(_))
        ));
    }

    #[tokio::test]
    async fn remove_set_drops_its_items() {
        let (svc, repo) = service();
        let entries = svc.load_pool(&[]).await.unwrap();
        let set = svc.create_set("Temporal", &entries).await.unwrap();

        assert_eq!(svc.remove_set(set.id()).await.unwrap(), 2);
        assert!(repo.list_items(None).await.unwrap().is_empty());
        assert_eq!(svc.list_sets().await.unwrap().len(), 1);

        assert!(matches!(
            svc.remove_set(set.id()).await,
            Err(CatalogServiceError::Storage(StorageError::NotFound))
        ));
    }

    #[tokio::test]
    async fn browse_filters_by_query() {
        let (svc, _) = service();
        let hits = svc.browse(&SetId::new("n5").unwrap(), "LUNA").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kanji(), "月");
    }
}
