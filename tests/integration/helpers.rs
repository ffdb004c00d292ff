//! Shared fixtures for the integration tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use dochub_cache::CacheManager;
use dochub_cache::memory::MemoryCacheProvider;
use dochub_core::config::cache::MemoryCacheConfig;
use dochub_core::config::structure::StructureConfig;
use dochub_core::types::EntityKind;
use dochub_database::memory::{
    MemoryEntityDirectory, MemoryMappingRepository, MemoryTemplateRepository,
};
use dochub_entity::template::{Template, TemplateNode};
use dochub_service::{CachedListing, HierarchyReconciler, TemplateMaterializer};
use dochub_store::MemoryFolderStore;

/// Full engine wired over in-memory backends.
pub struct TestEngine {
    pub store: Arc<MemoryFolderStore>,
    pub mappings: Arc<MemoryMappingRepository>,
    pub directory: Arc<MemoryEntityDirectory>,
    pub templates: Arc<MemoryTemplateRepository>,
    pub listing: Arc<CachedListing>,
    pub reconciler: HierarchyReconciler,
}

pub fn engine() -> TestEngine {
    let store = Arc::new(MemoryFolderStore::new());
    let cache = Arc::new(CacheManager::from_provider(Arc::new(
        MemoryCacheProvider::new(&MemoryCacheConfig::default(), 60),
    )));
    let mappings = Arc::new(MemoryMappingRepository::new());
    let directory = Arc::new(MemoryEntityDirectory::new());
    let templates = Arc::new(MemoryTemplateRepository::new());
    let structure = StructureConfig::default();

    let listing = Arc::new(CachedListing::new(
        store.clone(),
        Arc::clone(&cache),
        Duration::from_secs(60),
    ));
    let materializer = Arc::new(TemplateMaterializer::new(
        templates.clone(),
        Arc::clone(&listing),
    ));
    let reconciler = HierarchyReconciler::new(
        mappings.clone(),
        directory.clone(),
        Arc::clone(&listing),
        materializer,
        cache,
        structure,
        Duration::from_secs(60),
    );

    TestEngine {
        store,
        mappings,
        directory,
        templates,
        listing,
        reconciler,
    }
}

impl TestEngine {
    /// Seed an active template whose nodes are given as
    /// `(name, parent_index)` pairs; `None` means a root-level node.
    /// Nodes must appear after their parents.
    pub async fn seed_template(&self, kind: EntityKind, spec: &[(&str, Option<usize>)]) {
        let template = Template {
            id: Uuid::new_v4(),
            name: format!("{kind} template"),
            entity_kind: kind,
            active: true,
            created_at: Utc::now(),
        };
        let mut ids: Vec<Uuid> = Vec::with_capacity(spec.len());
        let nodes = spec
            .iter()
            .enumerate()
            .map(|(i, (name, parent))| {
                let id = Uuid::new_v4();
                ids.push(id);
                TemplateNode {
                    id,
                    template_id: template.id,
                    parent_id: parent.map(|p| ids[p]),
                    name: (*name).to_string(),
                    sort_order: i as i32,
                }
            })
            .collect();
        self.templates.insert(template, nodes).await;
    }

    /// Child folder names under a folder, in listing order.
    pub async fn child_names(&self, folder_id: &str) -> Vec<String> {
        self.listing.invalidate(folder_id).await;
        self.listing
            .children_of(folder_id)
            .await
            .expect("listing failed")
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    /// Id of the single child folder with the given name; panics when
    /// absent or duplicated.
    pub async fn sole_child(&self, parent_id: &str, name: &str) -> String {
        let matches = self.store.folders_named(parent_id, name).await;
        assert_eq!(
            matches.len(),
            1,
            "expected exactly one '{name}' under {parent_id}, found {}",
            matches.len()
        );
        matches.into_iter().next().unwrap()
    }
}
