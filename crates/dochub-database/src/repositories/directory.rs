//! Postgres system-of-record directory.

use async_trait::async_trait;
use sqlx::PgPool;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::{EntityKind, EntityRef};
use dochub_entity::record::{CompanyRecord, DealRecord, EntityRecord, LeadRecord};

use super::EntityDirectory;

/// Postgres-backed system-of-record lookups.
#[derive(Debug, Clone)]
pub struct PgEntityDirectory {
    pool: PgPool,
}

impl PgEntityDirectory {
    /// Create a new entity directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityDirectory for PgEntityDirectory {
    async fn find(&self, entity: &EntityRef) -> AppResult<Option<EntityRecord>> {
        let record = match entity.kind {
            EntityKind::Company => {
                sqlx::query_as::<_, CompanyRecord>("SELECT * FROM companies WHERE id = $1")
                    .bind(&entity.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to find company", e)
                    })?
                    .map(EntityRecord::from)
            }
            EntityKind::Lead => {
                sqlx::query_as::<_, LeadRecord>("SELECT * FROM leads WHERE id = $1")
                    .bind(&entity.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to find lead", e)
                    })?
                    .map(EntityRecord::from)
            }
            EntityKind::Deal => {
                sqlx::query_as::<_, DealRecord>("SELECT * FROM deals WHERE id = $1")
                    .bind(&entity.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to find deal", e)
                    })?
                    .map(EntityRecord::from)
            }
            // The root sentinel is not a directory entity.
            EntityKind::SystemRoot => None,
        };

        Ok(record)
    }
}
