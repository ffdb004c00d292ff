//! In-memory template repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use dochub_core::result::AppResult;
use dochub_core::types::EntityKind;
use dochub_entity::template::{Template, TemplateNode};

use crate::repositories::TemplateRepository;

/// In-memory template repository.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateRepository {
    templates: Arc<Mutex<Vec<(Template, Vec<TemplateNode>)>>>,
}

impl MemoryTemplateRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a template with its nodes.
    pub async fn insert(&self, template: Template, nodes: Vec<TemplateNode>) {
        self.templates.lock().await.push((template, nodes));
    }

    /// Seed an active template whose nodes are all direct children of
    /// the entity root, ordered as given.
    pub async fn seed_flat(&self, kind: EntityKind, name: &str, node_names: &[&str]) -> Uuid {
        let template = Template {
            id: Uuid::new_v4(),
            name: name.to_string(),
            entity_kind: kind,
            active: true,
            created_at: Utc::now(),
        };
        let template_id = template.id;
        let nodes = node_names
            .iter()
            .enumerate()
            .map(|(i, n)| TemplateNode {
                id: Uuid::new_v4(),
                template_id,
                parent_id: None,
                name: (*n).to_string(),
                sort_order: i as i32,
            })
            .collect();
        self.insert(template, nodes).await;
        template_id
    }
}

#[async_trait]
impl TemplateRepository for MemoryTemplateRepository {
    async fn get_active_template(
        &self,
        kind: EntityKind,
    ) -> AppResult<Option<(Template, Vec<TemplateNode>)>> {
        let templates = self.templates.lock().await;
        Ok(templates
            .iter()
            .filter(|(t, _)| t.entity_kind == kind && t.active)
            .max_by_key(|(t, _)| t.created_at)
            .cloned())
    }
}
