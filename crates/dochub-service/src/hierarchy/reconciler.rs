//! Hierarchy reconciler: one external folder per CRM entity.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use dochub_cache::CacheManager;
use dochub_cache::keys;
use dochub_core::config::structure::StructureConfig;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::traits::cache::CacheProvider;
use dochub_core::types::{EntityKind, EntityRef};
use dochub_database::repositories::{EntityDirectory, MappingRepository};
use dochub_entity::mapping::{FolderMapping, NewFolderMapping};
use dochub_entity::record::EntityRecord;

use crate::listing::CachedListing;
use crate::template::TemplateMaterializer;

/// Maps each of {company, lead, deal} to exactly one external folder,
/// reachable from the singleton system root via the owning company's
/// folder and a structural grouping folder.
///
/// The mapping table's partial unique index is the sole race arbiter:
/// concurrent reconciliation runs for the same entity may all reach the
/// external store, but only one mapping insert succeeds; losers re-read
/// the winner's row and abandon their folder (an accepted leak).
#[derive(Debug, Clone)]
pub struct HierarchyReconciler {
    mappings: Arc<dyn MappingRepository>,
    directory: Arc<dyn EntityDirectory>,
    listing: Arc<CachedListing>,
    materializer: Arc<TemplateMaterializer>,
    cache: Arc<CacheManager>,
    structure: StructureConfig,
    mapping_ttl: Duration,
}

impl HierarchyReconciler {
    /// Create a new reconciler.
    pub fn new(
        mappings: Arc<dyn MappingRepository>,
        directory: Arc<dyn EntityDirectory>,
        listing: Arc<CachedListing>,
        materializer: Arc<TemplateMaterializer>,
        cache: Arc<CacheManager>,
        structure: StructureConfig,
        mapping_ttl: Duration,
    ) -> Self {
        Self {
            mappings,
            directory,
            listing,
            materializer,
            cache,
            structure,
            mapping_ttl,
        }
    }

    /// Ensure the entity's folder exists exactly once and return its
    /// mapping.
    ///
    /// Idempotent: any number of calls for the same entity return the
    /// same mapping after the first. A retired (soft-deleted) mapping is
    /// never silently recreated; use [`reinstate_structure`] to
    /// provision anew for a reactivated entity.
    ///
    /// [`reinstate_structure`]: HierarchyReconciler::reinstate_structure
    pub async fn ensure_structure(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> AppResult<FolderMapping> {
        let entity = EntityRef::new(kind, entity_id);

        if kind == EntityKind::SystemRoot {
            return self.ensure_system_root().await;
        }

        if let Some(mapping) = self.lookup_live(&entity).await? {
            return Ok(mapping);
        }

        let history = self.mappings.find_by_entity_including_deleted(&entity).await?;
        if history.iter().any(FolderMapping::is_deleted) {
            return Err(AppError::conflict(format!(
                "Mapping for {entity} was retired; reinstate it explicitly to provision a new folder"
            )));
        }

        self.provision(&entity).await
    }

    /// Re-apply the active template against the entity's existing mapped
    /// folder, healing structural folders removed out-of-band.
    ///
    /// Returns `false` when the entity has no live mapping. Safe to call
    /// arbitrarily often; the materializer never duplicates nodes.
    pub async fn repair_structure(&self, kind: EntityKind, entity_id: &str) -> AppResult<bool> {
        let entity = EntityRef::new(kind, entity_id);

        let Some(mapping) = self.mappings.find_by_entity(&entity).await? else {
            debug!(entity_kind = %kind, entity_id, "No live mapping to repair");
            return Ok(false);
        };

        // Cached listings at any depth may be stale relative to an
        // out-of-band deletion; repair re-reads every level it walks.
        self.materializer
            .reapply_template(kind, &mapping.external_folder_id)
            .await?;

        info!(
            entity_kind = %kind,
            entity_id,
            folder_id = %mapping.external_folder_id,
            "Repaired folder structure"
        );
        Ok(true)
    }

    /// Retire the entity's live mapping (soft delete). The external
    /// folder is left untouched; deletion is local-only.
    pub async fn retire_structure(
        &self,
        kind: EntityKind,
        entity_id: &str,
        actor: &str,
        reason: &str,
    ) -> AppResult<bool> {
        let entity = EntityRef::new(kind, entity_id);
        let retired = self.mappings.soft_delete(&entity, actor, reason).await?;

        if retired {
            self.forget_cached_mapping(&entity).await;
            info!(entity_kind = %kind, entity_id, actor, reason, "Retired folder mapping");
        }
        Ok(retired)
    }

    /// Provision a fresh folder and mapping for an entity whose previous
    /// mapping was retired. The retired row stays retired; reactivated
    /// entities get a new folder rather than a resurrected one.
    ///
    /// Idempotent: if a live mapping already exists it is returned as-is.
    pub async fn reinstate_structure(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> AppResult<FolderMapping> {
        let entity = EntityRef::new(kind, entity_id);

        if kind == EntityKind::SystemRoot {
            return self.ensure_system_root().await;
        }

        if let Some(mapping) = self.lookup_live(&entity).await? {
            return Ok(mapping);
        }

        self.provision(&entity).await
    }

    /// Live-mapping lookup: cache first, repository on miss, write-through
    /// on hit from the repository.
    async fn lookup_live(&self, entity: &EntityRef) -> AppResult<Option<FolderMapping>> {
        let key = keys::mapping_by_entity(entity.kind.as_str(), &entity.id);

        match self.cache.get_json::<FolderMapping>(&key).await {
            Ok(Some(mapping)) => return Ok(Some(mapping)),
            Ok(None) => {}
            Err(e) => {
                warn!(entity = %entity, error = %e, "Mapping cache read failed; falling back to repository");
            }
        }

        let Some(mapping) = self.mappings.find_by_entity(entity).await? else {
            return Ok(None);
        };

        self.remember_mapping(&mapping).await;
        Ok(Some(mapping))
    }

    /// Create the entity folder, persist the mapping (recovering from a
    /// lost insert race), and materialize the template beneath it.
    async fn provision(&self, entity: &EntityRef) -> AppResult<FolderMapping> {
        let record = self
            .directory
            .find(entity)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entity {entity} not found")))?;

        let parent_folder_id = self.resolve_parent(&record).await?;

        let folder = self
            .listing
            .create_child_folder(&record.folder_name(), Some(&parent_folder_id))
            .await?;

        let new_mapping = NewFolderMapping::new(entity, &folder.id, folder.url.clone());
        let mapping = match self.mappings.insert(&new_mapping).await {
            Ok(mapping) => mapping,
            Err(e) if e.is_conflict() => {
                // A concurrent caller won the insert race. Re-read its
                // row; our folder becomes an orphan in the store.
                warn!(
                    entity = %entity,
                    abandoned_folder_id = %folder.id,
                    "Lost mapping insert race; adopting the winner's folder"
                );
                let winner = self
                    .mappings
                    .find_by_entity(entity)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal(format!(
                            "Mapping conflict for {entity} without a winning row"
                        ))
                    })?;
                self.remember_mapping(&winner).await;
                // The winner materializes its own template.
                return Ok(winner);
            }
            Err(e) => return Err(e),
        };

        info!(
            entity = %entity,
            folder_id = %mapping.external_folder_id,
            "Provisioned entity folder"
        );
        self.remember_mapping(&mapping).await;

        self.materializer
            .apply_template(entity.kind, &mapping.external_folder_id)
            .await?;

        Ok(mapping)
    }

    /// Resolve the folder the entity's own folder must be created in.
    ///
    /// Companies hang off the system root. Leads and deals hang off a
    /// structural folder inside their owning company's folder; without a
    /// company they land directly under the system root.
    async fn resolve_parent(&self, record: &EntityRecord) -> AppResult<String> {
        let root = self.ensure_system_root().await?;

        let structural_name = match record.kind {
            EntityKind::Company | EntityKind::SystemRoot => {
                return Ok(root.external_folder_id);
            }
            EntityKind::Lead => &self.structure.leads_folder_name,
            EntityKind::Deal => &self.structure.deals_folder_name,
        };

        let Some(company_id) = record.company_id.as_deref() else {
            warn!(
                entity_kind = %record.kind,
                entity_id = %record.id,
                "Entity has no owning company; placing its folder under the system root"
            );
            return Ok(root.external_folder_id);
        };

        // Recursively ensure the owning company first.
        let company =
            Box::pin(self.ensure_structure(EntityKind::Company, company_id)).await?;

        self.find_or_create_structural(&company.external_folder_id, structural_name)
            .await
    }

    /// Find-or-create a structural folder by display name. The first
    /// exact name match among the parent's children wins; name
    /// uniqueness within a parent is a convention, not enforced by the
    /// store, so an external rename causes a new folder here.
    async fn find_or_create_structural(&self, parent_id: &str, name: &str) -> AppResult<String> {
        if let Some(existing) = self.listing.find_child_folder(parent_id, name).await? {
            return Ok(existing.id);
        }

        let created = self.listing.create_child_folder(name, Some(parent_id)).await?;
        info!(
            name,
            folder_id = %created.id,
            parent_id,
            "Created structural folder"
        );
        Ok(created.id)
    }

    /// Ensure the singleton "Companies" root folder, mapped under the
    /// system-root sentinel so the regular idempotency machinery applies
    /// instead of special-cased global state.
    async fn ensure_system_root(&self) -> AppResult<FolderMapping> {
        let entity = EntityRef::system_root();

        if let Some(mapping) = self.lookup_live(&entity).await? {
            return Ok(mapping);
        }

        let folder = self
            .listing
            .create_child_folder(&self.structure.root_folder_name, None)
            .await?;

        let new_mapping = NewFolderMapping::new(&entity, &folder.id, folder.url.clone());
        let mapping = match self.mappings.insert(&new_mapping).await {
            Ok(mapping) => {
                info!(
                    folder_id = %mapping.external_folder_id,
                    "Provisioned system root folder"
                );
                mapping
            }
            Err(e) if e.is_conflict() => {
                warn!(
                    abandoned_folder_id = %folder.id,
                    "Lost system root insert race; adopting the winner's folder"
                );
                self.mappings.find_by_entity(&entity).await?.ok_or_else(|| {
                    AppError::internal("System root conflict without a winning row")
                })?
            }
            Err(e) => return Err(e),
        };

        self.remember_mapping(&mapping).await;
        Ok(mapping)
    }

    /// Best-effort write-through of a live mapping.
    async fn remember_mapping(&self, mapping: &FolderMapping) {
        let key = keys::mapping_by_entity(mapping.entity_kind.as_str(), &mapping.entity_id);
        if let Err(e) = self.cache.set_json(&key, mapping, self.mapping_ttl).await {
            warn!(entity = %mapping.entity_ref(), error = %e, "Failed to cache mapping");
        }
    }

    /// Best-effort eviction of a cached mapping.
    async fn forget_cached_mapping(&self, entity: &EntityRef) {
        let key = keys::mapping_by_entity(entity.kind.as_str(), &entity.id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(entity = %entity, error = %e, "Failed to evict cached mapping");
        }
    }
}
