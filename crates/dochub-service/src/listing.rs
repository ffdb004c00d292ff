//! Write-through cache over folder child listings.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use dochub_cache::CacheManager;
use dochub_cache::keys;
use dochub_core::result::AppResult;
use dochub_core::traits::cache::CacheProvider;
use dochub_core::traits::store::{FolderStore, StoreEntry, StoreFolder};

/// Caches "list children of folder X" results under a key derived from X
/// and invalidates that key on every mutation under X.
///
/// The cache is strictly best-effort: any cache error is logged and
/// treated as a miss, falling back to a direct store call. Correctness
/// never depends on the cache.
#[derive(Debug, Clone)]
pub struct CachedListing {
    store: Arc<dyn FolderStore>,
    cache: Arc<CacheManager>,
    ttl: Duration,
}

impl CachedListing {
    /// Create a new cached listing layer.
    pub fn new(store: Arc<dyn FolderStore>, cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    /// The underlying store adapter.
    pub fn store(&self) -> &dyn FolderStore {
        self.store.as_ref()
    }

    /// List the direct children of a folder, serving from cache when
    /// possible.
    pub async fn children_of(&self, folder_id: &str) -> AppResult<Vec<StoreEntry>> {
        let key = keys::children_of(folder_id);

        match self.cache.get_json::<Vec<StoreEntry>>(&key).await {
            Ok(Some(entries)) => return Ok(entries),
            Ok(None) => {}
            Err(e) => {
                warn!(folder_id, error = %e, "Cache read failed; falling back to store listing");
            }
        }

        let entries = self.store.list_children(folder_id).await?;

        if let Err(e) = self.cache.set_json(&key, &entries, self.ttl).await {
            warn!(folder_id, error = %e, "Failed to cache child listing");
        }

        Ok(entries)
    }

    /// Create a folder and invalidate the parent's cached listing so the
    /// next read observes the new child.
    pub async fn create_child_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> AppResult<StoreFolder> {
        let folder = self.store.create_folder(name, parent_id).await?;
        if let Some(parent) = parent_id {
            self.invalidate(parent).await;
        }
        Ok(folder)
    }

    /// Find the first child folder with the given exact name, if any.
    ///
    /// First match wins deliberately: name uniqueness within a parent is
    /// a convention the store does not enforce.
    pub async fn find_child_folder(
        &self,
        parent_id: &str,
        name: &str,
    ) -> AppResult<Option<StoreEntry>> {
        let children = self.children_of(parent_id).await?;
        Ok(children
            .into_iter()
            .find(|e| e.is_folder() && e.name == name))
    }

    /// Drop the cached listing for a folder. Best-effort.
    pub async fn invalidate(&self, folder_id: &str) {
        if let Err(e) = self.cache.delete(&keys::children_of(folder_id)).await {
            warn!(folder_id, error = %e, "Failed to invalidate child listing");
        }
    }
}
