//! HTTP adapter for the remote document-store API.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dochub_core::config::store::RemoteStoreConfig;
use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::traits::store::{
    EntryKind, FolderStore, PermissionRole, StoreEntry, StoreFolder, StorePermission,
};

/// HTTP client for the remote document store.
///
/// Every request carries the configured timeout. A timed-out write is
/// ambiguous (the folder may or may not have been created), so it is
/// surfaced as a retryable error and never silently retried here.
#[derive(Debug, Clone)]
pub struct RemoteFolderStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CreateFolderBody<'a> {
    name: &'a str,
    parent_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct FolderDto {
    id: String,
    name: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntryDto {
    id: String,
    name: String,
    kind: EntryKind,
    url: Option<String>,
    size_bytes: Option<u64>,
    mime_type: Option<String>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize)]
struct RenameBody<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct MoveBody<'a> {
    parent_id: &'a str,
}

#[derive(Debug, Serialize)]
struct GrantBody<'a> {
    grantee: &'a str,
    role: PermissionRole,
}

#[derive(Debug, Deserialize)]
struct PermissionDto {
    id: String,
    grantee: String,
    role: PermissionRole,
}

impl RemoteFolderStore {
    /// Create a new remote store adapter from configuration.
    pub fn new(config: &RemoteStoreConfig) -> AppResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if !config.api_token.is_empty() {
            let value = reqwest::header::HeaderValue::from_str(&format!(
                "Bearer {}",
                config.api_token
            ))
            .map_err(|e| AppError::configuration(format!("Invalid store API token: {e}")))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build store HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn map_err(context: &str, e: reqwest::Error) -> AppError {
        let message = if e.is_timeout() {
            format!("{context}: request timed out")
        } else {
            format!("{context}: {e}")
        };
        AppError::with_source(ErrorKind::ExternalService, message, e)
    }

    fn check_status(context: &str, status: StatusCode) -> AppResult<()> {
        if status.is_success() {
            return Ok(());
        }
        Err(AppError::store(format!(
            "{context}: store returned {status}"
        )))
    }
}

#[async_trait]
impl FolderStore for RemoteFolderStore {
    fn provider_type(&self) -> &str {
        "remote"
    }

    async fn health_check(&self) -> AppResult<bool> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| Self::map_err("Health check failed", e))?;
        Ok(response.status().is_success())
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> AppResult<StoreFolder> {
        let response = self
            .client
            .post(self.url("/folders"))
            .json(&CreateFolderBody { name, parent_id })
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to create folder", e))?;

        Self::check_status("Failed to create folder", response.status())?;

        let dto: FolderDto = response
            .json()
            .await
            .map_err(|e| Self::map_err("Failed to decode folder response", e))?;

        debug!(folder_id = %dto.id, name = %dto.name, "Created store folder");
        Ok(StoreFolder {
            id: dto.id,
            name: dto.name,
            url: dto.url,
        })
    }

    async fn list_children(&self, folder_id: &str) -> AppResult<Vec<StoreEntry>> {
        let response = self
            .client
            .get(self.url(&format!("/folders/{folder_id}/children")))
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to list children", e))?;

        Self::check_status("Failed to list children", response.status())?;

        let dtos: Vec<EntryDto> = response
            .json()
            .await
            .map_err(|e| Self::map_err("Failed to decode listing response", e))?;

        Ok(dtos
            .into_iter()
            .map(|d| StoreEntry {
                id: d.id,
                name: d.name,
                kind: d.kind,
                url: d.url,
                size_bytes: d.size_bytes,
                mime_type: d.mime_type,
                created_at: d.created_at,
            })
            .collect())
    }

    async fn create_file(
        &self,
        data: Bytes,
        name: &str,
        mime_type: &str,
        parent_id: &str,
    ) -> AppResult<StoreEntry> {
        let response = self
            .client
            .post(self.url(&format!("/folders/{parent_id}/files")))
            .query(&[("name", name)])
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(data)
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to upload file", e))?;

        Self::check_status("Failed to upload file", response.status())?;

        let dto: EntryDto = response
            .json()
            .await
            .map_err(|e| Self::map_err("Failed to decode file response", e))?;

        Ok(StoreEntry {
            id: dto.id,
            name: dto.name,
            kind: dto.kind,
            url: dto.url,
            size_bytes: dto.size_bytes,
            mime_type: dto.mime_type,
            created_at: dto.created_at,
        })
    }

    async fn rename(&self, entry_id: &str, new_name: &str) -> AppResult<()> {
        let response = self
            .client
            .patch(self.url(&format!("/entries/{entry_id}")))
            .json(&RenameBody { name: new_name })
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to rename entry", e))?;

        Self::check_status("Failed to rename entry", response.status())
    }

    async fn move_entry(&self, entry_id: &str, new_parent_id: &str) -> AppResult<()> {
        let response = self
            .client
            .patch(self.url(&format!("/entries/{entry_id}")))
            .json(&MoveBody {
                parent_id: new_parent_id,
            })
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to move entry", e))?;

        Self::check_status("Failed to move entry", response.status())
    }

    async fn list_permissions(&self, entry_id: &str) -> AppResult<Vec<StorePermission>> {
        let response = self
            .client
            .get(self.url(&format!("/entries/{entry_id}/permissions")))
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to list permissions", e))?;

        Self::check_status("Failed to list permissions", response.status())?;

        let dtos: Vec<PermissionDto> = response
            .json()
            .await
            .map_err(|e| Self::map_err("Failed to decode permissions response", e))?;

        Ok(dtos
            .into_iter()
            .map(|d| StorePermission {
                id: d.id,
                grantee: d.grantee,
                role: d.role,
            })
            .collect())
    }

    async fn grant_permission(
        &self,
        entry_id: &str,
        grantee: &str,
        role: PermissionRole,
    ) -> AppResult<StorePermission> {
        let response = self
            .client
            .post(self.url(&format!("/entries/{entry_id}/permissions")))
            .json(&GrantBody { grantee, role })
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to grant permission", e))?;

        Self::check_status("Failed to grant permission", response.status())?;

        let dto: PermissionDto = response
            .json()
            .await
            .map_err(|e| Self::map_err("Failed to decode permission response", e))?;

        Ok(StorePermission {
            id: dto.id,
            grantee: dto.grantee,
            role: dto.role,
        })
    }

    async fn revoke_permission(&self, entry_id: &str, permission_id: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/entries/{entry_id}/permissions/{permission_id}")))
            .send()
            .await
            .map_err(|e| Self::map_err("Failed to revoke permission", e))?;

        Self::check_status("Failed to revoke permission", response.status())
    }
}
