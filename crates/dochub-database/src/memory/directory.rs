//! In-memory system-of-record directory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use dochub_core::result::AppResult;
use dochub_core::types::{EntityKind, EntityRef};
use dochub_entity::record::{CompanyRecord, DealRecord, EntityRecord, LeadRecord};

use crate::repositories::EntityDirectory;

/// In-memory system-of-record directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntityDirectory {
    records: Arc<Mutex<HashMap<(EntityKind, String), EntityRecord>>>,
}

impl MemoryEntityDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company.
    pub async fn insert_company(&self, id: &str, name: &str) {
        self.insert(
            CompanyRecord {
                id: id.to_string(),
                name: name.to_string(),
            }
            .into(),
        )
        .await;
    }

    /// Register a lead.
    pub async fn insert_lead(&self, id: &str, name: &str, company_id: Option<&str>) {
        self.insert(
            LeadRecord {
                id: id.to_string(),
                name: name.to_string(),
                company_id: company_id.map(str::to_string),
            }
            .into(),
        )
        .await;
    }

    /// Register a deal.
    pub async fn insert_deal(&self, id: &str, title: &str, company_id: Option<&str>) {
        self.insert(
            DealRecord {
                id: id.to_string(),
                title: title.to_string(),
                company_id: company_id.map(str::to_string),
            }
            .into(),
        )
        .await;
    }

    async fn insert(&self, record: EntityRecord) {
        self.records
            .lock()
            .await
            .insert((record.kind, record.id.clone()), record);
    }
}

#[async_trait]
impl EntityDirectory for MemoryEntityDirectory {
    async fn find(&self, entity: &EntityRef) -> AppResult<Option<EntityRecord>> {
        let records = self.records.lock().await;
        Ok(records.get(&(entity.kind, entity.id.clone())).cloned())
    }
}
