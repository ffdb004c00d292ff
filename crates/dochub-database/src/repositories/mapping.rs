//! Postgres folder-mapping repository.

use async_trait::async_trait;
use sqlx::PgPool;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::EntityRef;
use dochub_entity::mapping::{FolderMapping, NewFolderMapping};

use super::MappingRepository;

/// Name of the partial unique index over live mapping rows.
const ENTITY_LIVE_KEY: &str = "folder_mappings_entity_live_key";

/// Postgres-backed mapping repository.
#[derive(Debug, Clone)]
pub struct PgMappingRepository {
    pool: PgPool,
}

impl PgMappingRepository {
    /// Create a new mapping repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn insert(&self, data: &NewFolderMapping) -> AppResult<FolderMapping> {
        sqlx::query_as::<_, FolderMapping>(
            "INSERT INTO folder_mappings (entity_kind, entity_id, external_folder_id, external_folder_url) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.entity_kind)
        .bind(&data.entity_id)
        .bind(&data.external_folder_id)
        .bind(&data.external_folder_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(ENTITY_LIVE_KEY) => {
                AppError::conflict(format!(
                    "A live mapping for {}/{} already exists",
                    data.entity_kind, data.entity_id
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert mapping", e),
        })
    }

    async fn find_by_entity(&self, entity: &EntityRef) -> AppResult<Option<FolderMapping>> {
        sqlx::query_as::<_, FolderMapping>(
            "SELECT * FROM folder_mappings \
             WHERE entity_kind = $1 AND entity_id = $2 AND deleted_at IS NULL",
        )
        .bind(entity.kind)
        .bind(&entity.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find mapping", e))
    }

    async fn find_by_entity_including_deleted(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<FolderMapping>> {
        sqlx::query_as::<_, FolderMapping>(
            "SELECT * FROM folder_mappings \
             WHERE entity_kind = $1 AND entity_id = $2 ORDER BY created_at DESC",
        )
        .bind(entity.kind)
        .bind(&entity.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find mappings", e))
    }

    async fn soft_delete(&self, entity: &EntityRef, actor: &str, reason: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE folder_mappings \
             SET deleted_at = now(), deleted_by = $3, delete_reason = $4 \
             WHERE entity_kind = $1 AND entity_id = $2 AND deleted_at IS NULL",
        )
        .bind(entity.kind)
        .bind(&entity.id)
        .bind(actor)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to retire mapping", e))?;

        Ok(result.rows_affected() > 0)
    }
}
