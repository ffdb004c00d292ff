//! Template entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use dochub_core::types::EntityKind;

/// A named, versioned definition of the folder tree to create under a
/// freshly provisioned entity folder.
///
/// Exactly one active template per entity kind is the expected steady
/// state, though the database does not enforce it. Templates are seeded
/// once and read-only from the materializer's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    /// Unique template identifier.
    pub id: Uuid,
    /// Unique template name.
    pub name: String,
    /// The entity kind this template applies to.
    pub entity_kind: EntityKind,
    /// Whether this template is the active one for its entity kind.
    pub active: bool,
    /// When the template was created.
    pub created_at: DateTime<Utc>,
}

/// One node in a template's folder forest.
///
/// `parent_id` of `None` means "direct child of the entity root folder".
/// A set parent must reference a node in the same template (foreign key);
/// cycles are precluded because nodes are only created with parents that
/// already exist.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateNode {
    /// Unique node identifier.
    pub id: Uuid,
    /// The owning template.
    pub template_id: Uuid,
    /// Parent node within the same template, or `None` for root nodes.
    pub parent_id: Option<Uuid>,
    /// Display name of the folder to materialize.
    pub name: String,
    /// Sibling sort key, ascending.
    pub sort_order: i32,
}
