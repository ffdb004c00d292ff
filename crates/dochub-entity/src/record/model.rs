//! Read-only views of the CRM system-of-record tables.
//!
//! The reconciliation engine only fetches these to validate that an
//! entity exists and to derive its folder name and owning company; it
//! never writes them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dochub_core::types::EntityKind;

/// A company row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRecord {
    /// Company primary key.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A lead row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadRecord {
    /// Lead primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning company, if any. A lead without a company is permitted
    /// and produces a root-level folder.
    pub company_id: Option<String>,
}

/// A deal row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DealRecord {
    /// Deal primary key.
    pub id: String,
    /// Deal title.
    pub title: String,
    /// Owning company, if any.
    pub company_id: Option<String>,
}

/// A kind-agnostic view of one system-of-record entity, as consumed by
/// the hierarchy reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The entity kind.
    pub kind: EntityKind,
    /// Primary key in the system of record.
    pub id: String,
    /// Display name (company name, lead name, or deal title).
    pub display_name: String,
    /// Owning company, if any. Always `None` for companies.
    pub company_id: Option<String>,
}

impl EntityRecord {
    /// The display name of the entity's own folder.
    pub fn folder_name(&self) -> String {
        match self.kind {
            EntityKind::Company | EntityKind::SystemRoot => self.display_name.clone(),
            EntityKind::Lead => format!("Lead - {}", self.display_name),
            EntityKind::Deal => format!("Deal - {}", self.display_name),
        }
    }
}

impl From<CompanyRecord> for EntityRecord {
    fn from(c: CompanyRecord) -> Self {
        Self {
            kind: EntityKind::Company,
            id: c.id,
            display_name: c.name,
            company_id: None,
        }
    }
}

impl From<LeadRecord> for EntityRecord {
    fn from(l: LeadRecord) -> Self {
        Self {
            kind: EntityKind::Lead,
            id: l.id,
            display_name: l.name,
            company_id: l.company_id,
        }
    }
}

impl From<DealRecord> for EntityRecord {
    fn from(d: DealRecord) -> Self {
        Self {
            kind: EntityKind::Deal,
            id: d.id,
            display_name: d.title,
            company_id: d.company_id,
        }
    }
}
