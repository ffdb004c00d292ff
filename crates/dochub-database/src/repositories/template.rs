//! Postgres template repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::EntityKind;
use dochub_entity::template::{Template, TemplateNode};

use super::TemplateRepository;

/// Postgres-backed template repository.
#[derive(Debug, Clone)]
pub struct PgTemplateRepository {
    pool: PgPool,
}

impl PgTemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a template. Used by the seeding CLI, not by the engine.
    pub async fn create_template(
        &self,
        name: &str,
        kind: EntityKind,
        active: bool,
    ) -> AppResult<Template> {
        sqlx::query_as::<_, Template>(
            "INSERT INTO templates (name, entity_kind, active) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(kind)
        .bind(active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("templates_name_key") => {
                AppError::conflict(format!("Template '{name}' already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create template", e),
        })
    }

    /// Append a node to a template. Parents must already exist, which
    /// precludes cycles by construction.
    pub async fn add_node(
        &self,
        template_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        sort_order: i32,
    ) -> AppResult<TemplateNode> {
        sqlx::query_as::<_, TemplateNode>(
            "INSERT INTO template_nodes (template_id, parent_id, name, sort_order) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(template_id)
        .bind(parent_id)
        .bind(name)
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add template node", e))
    }

    /// Deactivate every template for a kind, so a newly seeded one can
    /// become the single active template.
    pub async fn deactivate_all(&self, kind: EntityKind) -> AppResult<u64> {
        let result = sqlx::query("UPDATE templates SET active = false WHERE entity_kind = $1")
            .bind(kind)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to deactivate templates", e)
            })?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TemplateRepository for PgTemplateRepository {
    async fn get_active_template(
        &self,
        kind: EntityKind,
    ) -> AppResult<Option<(Template, Vec<TemplateNode>)>> {
        let template = sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE entity_kind = $1 AND active = true \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(kind)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find active template", e)
        })?;

        let Some(template) = template else {
            return Ok(None);
        };

        let nodes = sqlx::query_as::<_, TemplateNode>(
            "SELECT * FROM template_nodes WHERE template_id = $1 ORDER BY sort_order ASC",
        )
        .bind(template.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load template nodes", e)
        })?;

        Ok(Some((template, nodes)))
    }
}
