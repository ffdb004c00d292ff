//! Folder store trait for the external document-store client.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// A folder created in the external store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoreFolder {
    /// Opaque id assigned by the store.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Browser URL of the folder, if the store exposes one.
    pub url: Option<String>,
}

/// Discriminator for entries returned by a child listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A folder.
    Folder,
    /// A file.
    File,
}

/// One entry in a folder's child listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoreEntry {
    /// Opaque id assigned by the store.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Folder or file.
    pub kind: EntryKind,
    /// Browser URL, if the store exposes one.
    pub url: Option<String>,
    /// File size in bytes (files only).
    pub size_bytes: Option<u64>,
    /// MIME type (files only).
    pub mime_type: Option<String>,
    /// Creation timestamp, if the store reports one.
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl StoreEntry {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// Access role granted by a sharing permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionRole {
    /// Read-only access.
    Reader,
    /// Read-write access.
    Writer,
    /// Full control.
    Owner,
}

/// A sharing permission on a store entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StorePermission {
    /// Opaque permission id assigned by the store.
    pub id: String,
    /// The grantee (email address or principal id).
    pub grantee: String,
    /// The granted role.
    pub role: PermissionRole,
}

/// Trait for external document-store clients.
///
/// This is a fully typed capability interface: every adapter implements
/// the complete surface, so callers never probe for supported operations
/// at runtime. The store offers **no** create-if-absent primitive: two
/// `create_folder` calls with the same name and parent create two
/// folders. Duplicate prevention is the caller's responsibility.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the adapter type name (e.g., "remote", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the store is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Create a folder. `parent_id` of `None` creates at the store root.
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> AppResult<StoreFolder>;

    /// List the direct children of a folder.
    async fn list_children(&self, folder_id: &str) -> AppResult<Vec<StoreEntry>>;

    /// Upload a file into a folder.
    async fn create_file(
        &self,
        data: Bytes,
        name: &str,
        mime_type: &str,
        parent_id: &str,
    ) -> AppResult<StoreEntry>;

    /// Rename an entry in place.
    async fn rename(&self, entry_id: &str, new_name: &str) -> AppResult<()>;

    /// Move an entry under a new parent folder.
    async fn move_entry(&self, entry_id: &str, new_parent_id: &str) -> AppResult<()>;

    /// List the sharing permissions on an entry.
    async fn list_permissions(&self, entry_id: &str) -> AppResult<Vec<StorePermission>>;

    /// Grant a sharing permission on an entry.
    async fn grant_permission(
        &self,
        entry_id: &str,
        grantee: &str,
        role: PermissionRole,
    ) -> AppResult<StorePermission>;

    /// Revoke a sharing permission from an entry.
    async fn revoke_permission(&self, entry_id: &str, permission_id: &str) -> AppResult<()>;
}
