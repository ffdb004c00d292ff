//! Repository trait seams and their Postgres implementations.
//!
//! The traits are defined here, next to both the Postgres and the
//! in-memory implementations, so that the service crate can hold
//! `Arc<dyn ...>` handles and tests can swap in the memory backends.

pub mod directory;
pub mod mapping;
pub mod template;

use async_trait::async_trait;

use dochub_core::result::AppResult;
use dochub_core::types::{EntityKind, EntityRef};
use dochub_entity::mapping::{FolderMapping, NewFolderMapping};
use dochub_entity::record::EntityRecord;
use dochub_entity::template::{Template, TemplateNode};

pub use directory::PgEntityDirectory;
pub use mapping::PgMappingRepository;
pub use template::PgTemplateRepository;

/// The relational (entity_kind, entity_id) -> external folder mapping table.
///
/// The partial unique index over live rows is the sole mechanism
/// arbitrating races between concurrent reconciliation runs: `insert`
/// must fail with a distinguishable `Conflict` when a live mapping for
/// the same pair already exists.
#[async_trait]
pub trait MappingRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new live mapping.
    ///
    /// Fails with `ErrorKind::Conflict` when a live mapping for the same
    /// (kind, id) pair exists; the caller recovers by re-reading the
    /// winning row.
    async fn insert(&self, data: &NewFolderMapping) -> AppResult<FolderMapping>;

    /// Find the live mapping for an entity, filtering out retired rows.
    async fn find_by_entity(&self, entity: &EntityRef) -> AppResult<Option<FolderMapping>>;

    /// Find all mappings for an entity, retired rows included, newest first.
    async fn find_by_entity_including_deleted(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<FolderMapping>>;

    /// Retire the live mapping for an entity by setting the soft-delete
    /// triple. Returns `false` when no live mapping exists.
    async fn soft_delete(&self, entity: &EntityRef, actor: &str, reason: &str) -> AppResult<bool>;
}

/// Read access to the versioned folder templates.
#[async_trait]
pub trait TemplateRepository: Send + Sync + std::fmt::Debug + 'static {
    /// The active template for an entity kind with its full node forest,
    /// or `None` when the kind has no active template.
    async fn get_active_template(
        &self,
        kind: EntityKind,
    ) -> AppResult<Option<(Template, Vec<TemplateNode>)>>;
}

/// Read access to the CRM system of record.
#[async_trait]
pub trait EntityDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch an entity by reference. Returns `None` when the entity does
    /// not exist. The system root sentinel is not a directory entity and
    /// always resolves to `None`.
    async fn find(&self, entity: &EntityRef) -> AppResult<Option<EntityRecord>>;
}
