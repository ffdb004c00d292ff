//! In-memory mapping repository using a Tokio mutex for single-node use.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::EntityRef;
use dochub_entity::mapping::{FolderMapping, NewFolderMapping};

use crate::repositories::MappingRepository;

/// In-memory mapping repository.
///
/// The mutex held across the duplicate check and the push makes the
/// insert atomic, mirroring the partial unique index of the Postgres
/// implementation.
#[derive(Debug, Clone, Default)]
pub struct MemoryMappingRepository {
    rows: Arc<Mutex<Vec<FolderMapping>>>,
}

impl MemoryMappingRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows, retired included. Test observability.
    pub async fn row_count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl MappingRepository for MemoryMappingRepository {
    async fn insert(&self, data: &NewFolderMapping) -> AppResult<FolderMapping> {
        let mut rows = self.rows.lock().await;

        let duplicate = rows.iter().any(|m| {
            m.entity_kind == data.entity_kind
                && m.entity_id == data.entity_id
                && m.deleted_at.is_none()
        });
        if duplicate {
            return Err(AppError::conflict(format!(
                "A live mapping for {}/{} already exists",
                data.entity_kind, data.entity_id
            )));
        }

        let mapping = FolderMapping {
            id: Uuid::new_v4(),
            entity_kind: data.entity_kind,
            entity_id: data.entity_id.clone(),
            external_folder_id: data.external_folder_id.clone(),
            external_folder_url: data.external_folder_url.clone(),
            created_at: Utc::now(),
            deleted_at: None,
            deleted_by: None,
            delete_reason: None,
        };
        rows.push(mapping.clone());
        Ok(mapping)
    }

    async fn find_by_entity(&self, entity: &EntityRef) -> AppResult<Option<FolderMapping>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|m| {
                m.entity_kind == entity.kind
                    && m.entity_id == entity.id
                    && m.deleted_at.is_none()
            })
            .cloned())
    }

    async fn find_by_entity_including_deleted(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<FolderMapping>> {
        let rows = self.rows.lock().await;
        let mut found: Vec<FolderMapping> = rows
            .iter()
            .filter(|m| m.entity_kind == entity.kind && m.entity_id == entity.id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn soft_delete(&self, entity: &EntityRef, actor: &str, reason: &str) -> AppResult<bool> {
        let mut rows = self.rows.lock().await;
        let Some(row) = rows.iter_mut().find(|m| {
            m.entity_kind == entity.kind && m.entity_id == entity.id && m.deleted_at.is_none()
        }) else {
            return Ok(false);
        };

        row.deleted_at = Some(Utc::now());
        row.deleted_by = Some(actor.to_string());
        row.delete_reason = Some(reason.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_core::types::EntityKind;

    fn new_mapping(kind: EntityKind, id: &str, folder: &str) -> NewFolderMapping {
        NewFolderMapping {
            entity_kind: kind,
            entity_id: id.to_string(),
            external_folder_id: folder.to_string(),
            external_folder_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let repo = MemoryMappingRepository::new();
        repo.insert(&new_mapping(EntityKind::Company, "C1", "f-1"))
            .await
            .unwrap();

        let found = repo
            .find_by_entity(&EntityRef::new(EntityKind::Company, "C1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.external_folder_id, "f-1");
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let repo = MemoryMappingRepository::new();
        repo.insert(&new_mapping(EntityKind::Deal, "D1", "f-1"))
            .await
            .unwrap();

        let err = repo
            .insert(&new_mapping(EntityKind::Deal, "D1", "f-2"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_same_id_different_kind_allowed() {
        let repo = MemoryMappingRepository::new();
        repo.insert(&new_mapping(EntityKind::Company, "X1", "f-1"))
            .await
            .unwrap();
        repo.insert(&new_mapping(EntityKind::Lead, "X1", "f-2"))
            .await
            .unwrap();
        assert_eq!(repo.row_count().await, 2);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_live_lookup() {
        let repo = MemoryMappingRepository::new();
        let entity = EntityRef::new(EntityKind::Lead, "L1");
        repo.insert(&new_mapping(EntityKind::Lead, "L1", "f-1"))
            .await
            .unwrap();

        assert!(repo.soft_delete(&entity, "admin", "lead removed").await.unwrap());
        assert!(repo.find_by_entity(&entity).await.unwrap().is_none());

        let all = repo.find_by_entity_including_deleted(&entity).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_deleted());
    }

    #[tokio::test]
    async fn test_insert_allowed_after_soft_delete() {
        let repo = MemoryMappingRepository::new();
        let entity = EntityRef::new(EntityKind::Company, "C9");
        repo.insert(&new_mapping(EntityKind::Company, "C9", "f-1"))
            .await
            .unwrap();
        repo.soft_delete(&entity, "admin", "retired").await.unwrap();

        // Uniqueness applies to live rows only.
        repo.insert(&new_mapping(EntityKind::Company, "C9", "f-2"))
            .await
            .unwrap();
        let live = repo.find_by_entity(&entity).await.unwrap().unwrap();
        assert_eq!(live.external_folder_id, "f-2");
    }
}
