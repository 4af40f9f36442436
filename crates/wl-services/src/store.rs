//! Filter Store
//!
//! Persistence interface for saved filters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use wl_core::error::WlError;
use wl_core::traits::Id;
use wl_queries::filter::Filter;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Filter not found: {0}")]
    NotFound(Id),
    #[error("Filter title already taken: {0}")]
    Conflict(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for WlError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => WlError::not_found("Filter", "id", id),
            StoreError::Conflict(title) => {
                WlError::conflict(format!("a filter named '{title}' already exists"))
            }
            StoreError::BackendError(message) => WlError::Storage(message),
        }
    }
}

/// Filter store trait
#[async_trait]
pub trait FilterStore: Send + Sync {
    /// All filters, newest first
    async fn list(&self) -> StoreResult<Vec<Filter>>;

    async fn find(&self, id: Id) -> StoreResult<Option<Filter>>;

    async fn find_by_title(&self, title: &str) -> StoreResult<Option<Filter>>;

    /// Insert when `id` is unset, otherwise replace the stored record
    ///
    /// Fails with `Conflict` when another filter already uses the title.
    async fn save(&self, filter: Filter) -> StoreResult<Filter>;

    async fn delete(&self, id: Id) -> StoreResult<()>;
}

/// In-memory store for tests and offline use
pub struct MemoryFilterStore {
    filters: RwLock<BTreeMap<Id, Filter>>,
    next_id: AtomicI64,
}

impl Default for MemoryFilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFilterStore {
    pub fn new() -> Self {
        Self {
            filters: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl FilterStore for MemoryFilterStore {
    async fn list(&self) -> StoreResult<Vec<Filter>> {
        let filters = self.filters.read().await;
        let mut all: Vec<Filter> = filters.values().cloned().collect();
        // Ids break ties between filters created in the same instant
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn find(&self, id: Id) -> StoreResult<Option<Filter>> {
        let filters = self.filters.read().await;
        Ok(filters.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> StoreResult<Option<Filter>> {
        let filters = self.filters.read().await;
        Ok(filters.values().find(|f| f.title == title).cloned())
    }

    async fn save(&self, mut filter: Filter) -> StoreResult<Filter> {
        let mut filters = self.filters.write().await;

        if filters
            .values()
            .any(|f| f.title == filter.title && f.id != filter.id)
        {
            return Err(StoreError::Conflict(filter.title));
        }

        let id = match filter.id {
            Some(id) => {
                let existing = filters.get(&id).ok_or(StoreError::NotFound(id))?;
                filter.created_at = existing.created_at;
                debug!(id, title = %filter.title, "Filter updated");
                id
            }
            None => {
                // Ids are never reused, even after deletes
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                filter.id = Some(id);
                filter.created_at = Some(Utc::now());
                debug!(id, title = %filter.title, "Filter inserted");
                id
            }
        };

        filters.insert(id, filter.clone());
        Ok(filter)
    }

    async fn delete(&self, id: Id) -> StoreResult<()> {
        let mut filters = self.filters.write().await;
        filters.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wl_queries::builder::ConditionBuilder;

    fn filter(title: &str) -> Filter {
        Filter::from_conditions(title, &ConditionBuilder::new().project("ABC").build())
    }

    #[tokio::test]
    async fn test_memory_store_insert_assigns_id() {
        let store = MemoryFilterStore::new();

        let first = store.save(filter("A")).await.unwrap();
        let second = store.save(filter("B")).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert!(first.created_at.is_some());
    }

    #[tokio::test]
    async fn test_memory_store_list_newest_first() {
        let store = MemoryFilterStore::new();
        store.save(filter("A")).await.unwrap();
        store.save(filter("B")).await.unwrap();
        store.save(filter("C")).await.unwrap();

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_memory_store_update_keeps_created_at() {
        let store = MemoryFilterStore::new();
        let saved = store.save(filter("A")).await.unwrap();

        let mut changed = saved.clone();
        changed.title = "Renamed".to_string();
        changed.created_at = None;
        let updated = store.save(changed).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_update_unknown_id() {
        let store = MemoryFilterStore::new();
        let result = store.save(filter("A").with_id(Some(42))).await;
        assert!(matches!(result, Err(StoreError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_title() {
        let store = MemoryFilterStore::new();
        let a = store.save(filter("A")).await.unwrap();
        let b = store.save(filter("B")).await.unwrap();

        let result = store.save(filter("A")).await;
        assert!(matches!(result, Err(StoreError::Conflict(ref t)) if t == "A"));

        let mut moved = b.clone();
        moved.title = "A".to_string();
        assert!(matches!(store.save(moved).await, Err(StoreError::Conflict(_))));

        // Saving a filter under its own title is an update
        assert!(store.save(a).await.is_ok());
        assert_eq!(store.list().await.unwrap().len(), 2);

        let err: WlError = StoreError::Conflict("A".to_string()).into();
        assert_eq!(err.error_code(), "conflict");
    }

    #[tokio::test]
    async fn test_memory_store_find_and_delete() {
        let store = MemoryFilterStore::new();
        let saved = store.save(filter("A")).await.unwrap();
        let id = saved.id.unwrap();

        assert!(store.find(id).await.unwrap().is_some());
        assert_eq!(store.find_by_title("A").await.unwrap(), Some(saved));
        assert!(store.find_by_title("a").await.unwrap().is_none());

        store.delete(id).await.unwrap();
        assert!(store.find(id).await.unwrap().is_none());
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));

        let next = store.save(filter("B")).await.unwrap();
        assert_eq!(next.id, Some(id + 1));
    }
}
