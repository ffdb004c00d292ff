//! In-process folder store stand-in.
//!
//! Mirrors the remote store's semantics faithfully: creates are not
//! idempotent (two creates with the same name and parent yield two
//! folders), listings observe whatever exists at call time, and nothing
//! is transactional. Fault-injection hooks let the test harness simulate
//! store outages and out-of-band deletions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::traits::store::{
    EntryKind, FolderStore, PermissionRole, StoreEntry, StoreFolder, StorePermission,
};

#[derive(Debug, Clone)]
struct EntryState {
    entry: StoreEntry,
    parent_id: Option<String>,
    permissions: Vec<StorePermission>,
    /// Monotonic insertion index, used to keep listings stable.
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, EntryState>,
    next_seq: u64,
    create_calls: u64,
    failing_creates: u32,
    failing_lists: u32,
}

/// In-memory folder store.
#[derive(Debug, Clone, Default)]
pub struct MemoryFolderStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryFolderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` create calls with a retryable store error.
    pub async fn fail_next_creates(&self, n: u32) {
        self.inner.lock().await.failing_creates = n;
    }

    /// Fail the next `n` listing calls with a retryable store error.
    pub async fn fail_next_lists(&self, n: u32) {
        self.inner.lock().await.failing_lists = n;
    }

    /// Remove an entry and all its descendants, bypassing the engine.
    /// Simulates a user deleting a folder directly in the store.
    pub async fn delete_out_of_band(&self, entry_id: &str) {
        let mut inner = self.inner.lock().await;
        let mut doomed = vec![entry_id.to_string()];
        while let Some(id) = doomed.pop() {
            inner.entries.remove(&id);
            let children: Vec<String> = inner
                .entries
                .values()
                .filter(|s| s.parent_id.as_deref() == Some(id.as_str()))
                .map(|s| s.entry.id.clone())
                .collect();
            doomed.extend(children);
        }
    }

    /// Total number of create calls that reached the store (including
    /// failed ones). Test observability.
    pub async fn create_calls(&self) -> u64 {
        self.inner.lock().await.create_calls
    }

    /// Number of live folders in the store.
    pub async fn folder_count(&self) -> usize {
        self.inner
            .lock()
            .await
            .entries
            .values()
            .filter(|s| s.entry.kind == EntryKind::Folder)
            .count()
    }

    /// Folder ids with the given name under a parent. More than one
    /// element means the store holds duplicates.
    pub async fn folders_named(&self, parent_id: &str, name: &str) -> Vec<String> {
        self.inner
            .lock()
            .await
            .entries
            .values()
            .filter(|s| {
                s.entry.kind == EntryKind::Folder
                    && s.entry.name == name
                    && s.parent_id.as_deref() == Some(parent_id)
            })
            .map(|s| s.entry.id.clone())
            .collect()
    }
}

impl Inner {
    fn alloc_id(&mut self, prefix: &str) -> (String, u64) {
        self.next_seq += 1;
        (format!("{prefix}-{}", self.next_seq), self.next_seq)
    }

    fn assert_folder_exists(&self, folder_id: &str) -> AppResult<()> {
        match self.entries.get(folder_id) {
            Some(state) if state.entry.kind == EntryKind::Folder => Ok(()),
            _ => Err(AppError::store(format!(
                "Folder '{folder_id}' does not exist in the store"
            ))),
        }
    }
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> AppResult<StoreFolder> {
        let mut inner = self.inner.lock().await;
        inner.create_calls += 1;

        if inner.failing_creates > 0 {
            inner.failing_creates -= 1;
            return Err(AppError::store("Failed to create folder: store unavailable"));
        }

        if let Some(parent) = parent_id {
            inner.assert_folder_exists(parent)?;
        }

        let (id, seq) = inner.alloc_id("mf");
        let entry = StoreEntry {
            id: id.clone(),
            name: name.to_string(),
            kind: EntryKind::Folder,
            url: Some(format!("memory://folder/{id}")),
            size_bytes: None,
            mime_type: None,
            created_at: Some(Utc::now()),
        };
        inner.entries.insert(
            id.clone(),
            EntryState {
                entry: entry.clone(),
                parent_id: parent_id.map(str::to_string),
                permissions: Vec::new(),
                seq,
            },
        );

        Ok(StoreFolder {
            id,
            name: entry.name,
            url: entry.url,
        })
    }

    async fn list_children(&self, folder_id: &str) -> AppResult<Vec<StoreEntry>> {
        let mut inner = self.inner.lock().await;

        if inner.failing_lists > 0 {
            inner.failing_lists -= 1;
            return Err(AppError::store("Failed to list children: store unavailable"));
        }

        inner.assert_folder_exists(folder_id)?;

        let mut children: Vec<(u64, StoreEntry)> = inner
            .entries
            .values()
            .filter(|s| s.parent_id.as_deref() == Some(folder_id))
            .map(|s| (s.seq, s.entry.clone()))
            .collect();
        children.sort_by_key(|(seq, _)| *seq);

        Ok(children.into_iter().map(|(_, e)| e).collect())
    }

    async fn create_file(
        &self,
        data: Bytes,
        name: &str,
        mime_type: &str,
        parent_id: &str,
    ) -> AppResult<StoreEntry> {
        let mut inner = self.inner.lock().await;
        inner.create_calls += 1;

        if inner.failing_creates > 0 {
            inner.failing_creates -= 1;
            return Err(AppError::store("Failed to upload file: store unavailable"));
        }

        inner.assert_folder_exists(parent_id)?;

        let (id, seq) = inner.alloc_id("mf");
        let entry = StoreEntry {
            id: id.clone(),
            name: name.to_string(),
            kind: EntryKind::File,
            url: Some(format!("memory://file/{id}")),
            size_bytes: Some(data.len() as u64),
            mime_type: Some(mime_type.to_string()),
            created_at: Some(Utc::now()),
        };
        inner.entries.insert(
            id,
            EntryState {
                entry: entry.clone(),
                parent_id: Some(parent_id.to_string()),
                permissions: Vec::new(),
                seq,
            },
        );

        Ok(entry)
    }

    async fn rename(&self, entry_id: &str, new_name: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        let state = inner
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| AppError::store(format!("Entry '{entry_id}' does not exist")))?;
        state.entry.name = new_name.to_string();
        Ok(())
    }

    async fn move_entry(&self, entry_id: &str, new_parent_id: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.assert_folder_exists(new_parent_id)?;
        let state = inner
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| AppError::store(format!("Entry '{entry_id}' does not exist")))?;
        state.parent_id = Some(new_parent_id.to_string());
        Ok(())
    }

    async fn list_permissions(&self, entry_id: &str) -> AppResult<Vec<StorePermission>> {
        let inner = self.inner.lock().await;
        let state = inner
            .entries
            .get(entry_id)
            .ok_or_else(|| AppError::store(format!("Entry '{entry_id}' does not exist")))?;
        Ok(state.permissions.clone())
    }

    async fn grant_permission(
        &self,
        entry_id: &str,
        grantee: &str,
        role: PermissionRole,
    ) -> AppResult<StorePermission> {
        let mut inner = self.inner.lock().await;
        let (id, _) = inner.alloc_id("perm");
        let state = inner
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| AppError::store(format!("Entry '{entry_id}' does not exist")))?;
        let permission = StorePermission {
            id,
            grantee: grantee.to_string(),
            role,
        };
        state.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn revoke_permission(&self, entry_id: &str, permission_id: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        let state = inner
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| AppError::store(format!("Entry '{entry_id}' does not exist")))?;
        state.permissions.retain(|p| p.id != permission_id);
        Ok(())
    }
}
