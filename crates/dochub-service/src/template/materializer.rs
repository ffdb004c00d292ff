//! Template materializer: creates the active template's folder subtree
//! under a target root folder without duplicating nodes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info};

use dochub_core::result::AppResult;
use dochub_core::types::EntityKind;
use dochub_database::repositories::TemplateRepository;
use dochub_entity::template::{TemplateNode, TemplateTree};

use crate::listing::CachedListing;

/// Materializes template node forests into external folders.
///
/// The name-based existence check in [`ensure_node`] substitutes for the
/// transactional "create-if-absent" primitive the external store does
/// not offer: for any (template, root folder) pair, repeated full or
/// partial applications converge to exactly one external folder per
/// distinct template-node name.
///
/// [`ensure_node`]: TemplateMaterializer::ensure_node
#[derive(Debug, Clone)]
pub struct TemplateMaterializer {
    templates: Arc<dyn TemplateRepository>,
    listing: Arc<CachedListing>,
}

impl TemplateMaterializer {
    /// Create a new materializer.
    pub fn new(templates: Arc<dyn TemplateRepository>, listing: Arc<CachedListing>) -> Self {
        Self { templates, listing }
    }

    /// Ensure every node of the active template for `kind` has a
    /// corresponding folder beneath `root_folder_id`.
    ///
    /// A kind without an active template is a no-op, not an error.
    /// Partial failure leaves already-materialized nodes in place; a
    /// later call resumes correctly because existing nodes are reused.
    pub async fn apply_template(&self, kind: EntityKind, root_folder_id: &str) -> AppResult<()> {
        self.apply(kind, root_folder_id, false).await
    }

    /// Like [`apply_template`], but discards the cached listing of every
    /// folder it descends into before reading it. Repair goes through
    /// here: a warm cache can still list a folder that was deleted
    /// out-of-band at any depth, and reusing its id would report success
    /// without recreating anything.
    ///
    /// [`apply_template`]: TemplateMaterializer::apply_template
    pub async fn reapply_template(&self, kind: EntityKind, root_folder_id: &str) -> AppResult<()> {
        self.apply(kind, root_folder_id, true).await
    }

    async fn apply(&self, kind: EntityKind, root_folder_id: &str, refresh: bool) -> AppResult<()> {
        let Some((template, nodes)) = self.templates.get_active_template(kind).await? else {
            debug!(entity_kind = %kind, "No active template; nothing to materialize");
            return Ok(());
        };

        let tree = TemplateTree::build(nodes);
        info!(
            template = %template.name,
            entity_kind = %kind,
            root_folder_id,
            node_count = tree.len(),
            "Applying folder template"
        );

        self.materialize_level(&tree, tree.roots(), root_folder_id.to_string(), refresh)
            .await
    }

    /// Materialize one sibling level in ascending `sort_order`, then
    /// recurse into each node's children. With `refresh` set, the
    /// target's listing is dropped from the cache before the level is
    /// walked, forcing one store read per descended folder.
    fn materialize_level<'a>(
        &'a self,
        tree: &'a TemplateTree,
        nodes: &'a [TemplateNode],
        target_folder_id: String,
        refresh: bool,
    ) -> Pin<Box<dyn Future<Output = AppResult<()>> + Send + 'a>> {
        Box::pin(async move {
            if refresh {
                self.listing.invalidate(&target_folder_id).await;
            }
            for node in nodes {
                let folder_id = self.ensure_node(node, &target_folder_id).await?;

                let children = tree.children_of(node.id);
                if !children.is_empty() {
                    self.materialize_level(tree, children, folder_id, refresh)
                        .await?;
                }
            }
            Ok(())
        })
    }

    /// Resolve a single node to an external folder, creating it only if
    /// no child of the target carries its exact name.
    ///
    /// The target's listing is re-read here, per node, rather than
    /// assumed stable across the whole application.
    async fn ensure_node(&self, node: &TemplateNode, target_folder_id: &str) -> AppResult<String> {
        if let Some(existing) = self
            .listing
            .find_child_folder(target_folder_id, &node.name)
            .await?
        {
            debug!(
                node = %node.name,
                folder_id = %existing.id,
                "Template node already materialized; reusing"
            );
            return Ok(existing.id);
        }

        let created = self
            .listing
            .create_child_folder(&node.name, Some(target_folder_id))
            .await?;
        info!(
            node = %node.name,
            folder_id = %created.id,
            parent_id = %target_folder_id,
            "Materialized template folder"
        );
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use uuid::Uuid;

    use dochub_cache::CacheManager;
    use dochub_cache::memory::MemoryCacheProvider;
    use dochub_core::config::cache::MemoryCacheConfig;
    use dochub_core::traits::store::FolderStore;
    use dochub_database::memory::MemoryTemplateRepository;
    use dochub_entity::template::Template;
    use dochub_store::MemoryFolderStore;

    use super::*;

    struct Fixture {
        store: Arc<MemoryFolderStore>,
        templates: Arc<MemoryTemplateRepository>,
        materializer: TemplateMaterializer,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryFolderStore::new());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&MemoryCacheConfig::default(), 60),
        )));
        let listing = Arc::new(CachedListing::new(
            store.clone(),
            cache,
            Duration::from_secs(60),
        ));
        let templates = Arc::new(MemoryTemplateRepository::new());
        let materializer = TemplateMaterializer::new(templates.clone(), listing);
        Fixture {
            store,
            templates,
            materializer,
        }
    }

    fn node(
        template_id: Uuid,
        id: u128,
        parent: Option<u128>,
        name: &str,
        order: i32,
    ) -> TemplateNode {
        TemplateNode {
            id: Uuid::from_u128(id),
            template_id,
            parent_id: parent.map(Uuid::from_u128),
            name: name.to_string(),
            sort_order: order,
        }
    }

    #[tokio::test]
    async fn test_no_active_template_is_a_noop() {
        let fx = fixture();
        let root = fx.store.create_folder("root", None).await.unwrap();

        fx.materializer
            .apply_template(EntityKind::Deal, &root.id)
            .await
            .unwrap();

        assert!(fx.store.list_children(&root.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_application_converges() {
        let fx = fixture();
        let root = fx.store.create_folder("root", None).await.unwrap();
        fx.templates
            .seed_flat(EntityKind::Deal, "deal-v1", &["00. Admin", "01. Contracts"])
            .await;

        for _ in 0..3 {
            fx.materializer
                .apply_template(EntityKind::Deal, &root.id)
                .await
                .unwrap();
        }

        assert_eq!(fx.store.folders_named(&root.id, "00. Admin").await.len(), 1);
        assert_eq!(
            fx.store.folders_named(&root.id, "01. Contracts").await.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_nested_nodes_materialize_under_their_parent() {
        let fx = fixture();
        let root = fx.store.create_folder("root", None).await.unwrap();

        let template = Template {
            id: Uuid::new_v4(),
            name: "deal-nested".to_string(),
            entity_kind: EntityKind::Deal,
            active: true,
            created_at: Utc::now(),
        };
        let tid = template.id;
        fx.templates
            .insert(
                template,
                vec![
                    node(tid, 1, None, "00. Admin", 0),
                    node(tid, 2, Some(1), "Invoices", 0),
                ],
            )
            .await;

        fx.materializer
            .apply_template(EntityKind::Deal, &root.id)
            .await
            .unwrap();

        let admin = &fx.store.folders_named(&root.id, "00. Admin").await[0];
        assert_eq!(fx.store.folders_named(admin, "Invoices").await.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_resumes_without_duplicates() {
        let fx = fixture();
        let root = fx.store.create_folder("root", None).await.unwrap();
        fx.templates
            .seed_flat(EntityKind::Lead, "lead-v1", &["A", "B", "C"])
            .await;

        // First application dies on the very first node create.
        fx.store.fail_next_creates(1).await;
        let err = fx
            .materializer
            .apply_template(EntityKind::Lead, &root.id)
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        // The retry materializes the full set exactly once.
        fx.materializer
            .apply_template(EntityKind::Lead, &root.id)
            .await
            .unwrap();
        for name in ["A", "B", "C"] {
            assert_eq!(fx.store.folders_named(&root.id, name).await.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_out_of_band_deletion_healed_on_reapply() {
        let fx = fixture();
        let root = fx.store.create_folder("root", None).await.unwrap();
        fx.templates
            .seed_flat(EntityKind::Lead, "lead-v1", &["A", "B", "C"])
            .await;

        fx.materializer
            .apply_template(EntityKind::Lead, &root.id)
            .await
            .unwrap();

        let doomed = fx.store.folders_named(&root.id, "B").await[0].clone();
        fx.store.delete_out_of_band(&doomed).await;

        fx.materializer
            .reapply_template(EntityKind::Lead, &root.id)
            .await
            .unwrap();

        for name in ["A", "B", "C"] {
            assert_eq!(fx.store.folders_named(&root.id, name).await.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_nested_deletion_healed_despite_warm_listings() {
        let fx = fixture();
        let root = fx.store.create_folder("root", None).await.unwrap();

        let template = Template {
            id: Uuid::new_v4(),
            name: "deal-nested".to_string(),
            entity_kind: EntityKind::Deal,
            active: true,
            created_at: Utc::now(),
        };
        let tid = template.id;
        fx.templates
            .insert(
                template,
                vec![
                    node(tid, 1, None, "00. Admin", 0),
                    node(tid, 2, Some(1), "Invoices", 0),
                ],
            )
            .await;

        fx.materializer
            .apply_template(EntityKind::Deal, &root.id)
            .await
            .unwrap();
        // A second pass reuses every node, warming the listing cache of
        // each level along the way.
        fx.materializer
            .apply_template(EntityKind::Deal, &root.id)
            .await
            .unwrap();

        let admin = fx.store.folders_named(&root.id, "00. Admin").await[0].clone();
        let invoices = fx.store.folders_named(&admin, "Invoices").await[0].clone();
        fx.store.delete_out_of_band(&invoices).await;

        fx.materializer
            .reapply_template(EntityKind::Deal, &root.id)
            .await
            .unwrap();

        assert_eq!(fx.store.folders_named(&admin, "Invoices").await.len(), 1);
    }
}

