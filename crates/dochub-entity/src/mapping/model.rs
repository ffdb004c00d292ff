//! Folder mapping entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use dochub_core::types::{EntityKind, EntityRef};

/// The association between one CRM entity and its external folder.
///
/// At most one non-deleted row exists per (entity_kind, entity_id) pair;
/// a partial unique index enforces this even across racing writers.
/// Rows are never hard-deleted; retirement sets the soft-delete triple.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FolderMapping {
    /// Unique mapping identifier.
    pub id: Uuid,
    /// The kind of entity this folder represents.
    pub entity_kind: EntityKind,
    /// The entity's primary key in the system of record.
    pub entity_id: String,
    /// Opaque folder id in the external store.
    pub external_folder_id: String,
    /// Browser URL of the folder, if the store exposes one.
    pub external_folder_url: Option<String>,
    /// When the mapping was created.
    pub created_at: DateTime<Utc>,
    /// When the mapping was retired (soft delete).
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who retired the mapping.
    pub deleted_by: Option<String>,
    /// Why the mapping was retired.
    pub delete_reason: Option<String>,
}

impl FolderMapping {
    /// Whether this mapping has been retired.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The (kind, id) pair this mapping belongs to.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_kind, self.entity_id.clone())
    }
}

/// Data required to create a new folder mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFolderMapping {
    /// The kind of entity.
    pub entity_kind: EntityKind,
    /// The entity's primary key.
    pub entity_id: String,
    /// Opaque folder id in the external store.
    pub external_folder_id: String,
    /// Browser URL of the folder.
    pub external_folder_url: Option<String>,
}

impl NewFolderMapping {
    /// Build a new mapping record for an entity and its freshly created folder.
    pub fn new(
        entity: &EntityRef,
        external_folder_id: impl Into<String>,
        external_folder_url: Option<String>,
    ) -> Self {
        Self {
            entity_kind: entity.kind,
            entity_id: entity.id.clone(),
            external_folder_id: external_folder_id.into(),
            external_folder_url,
        }
    }
}
