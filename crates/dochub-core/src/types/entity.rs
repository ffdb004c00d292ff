//! Entity kind and reference types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sentinel entity id under which the singleton "Companies" root folder
/// is mapped. The root reuses the same ensure/idempotency machinery as
/// every other entity instead of being special-cased global state.
pub const SYSTEM_ROOT_ENTITY_ID: &str = "companies-root";

/// The kind of CRM entity a folder mapping represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "entity_kind", rename_all = "snake_case")]
pub enum EntityKind {
    /// A company record.
    Company,
    /// A lead record.
    Lead,
    /// A deal record.
    Deal,
    /// The singleton system root ("Companies") folder.
    SystemRoot,
}

impl EntityKind {
    /// The snake_case string form used in cache keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Lead => "lead",
            Self::Deal => "deal",
            Self::SystemRoot => "system_root",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(Self::Company),
            "lead" => Ok(Self::Lead),
            "deal" => Ok(Self::Deal),
            "system_root" => Ok(Self::SystemRoot),
            other => Err(AppError::validation(format!(
                "Unknown entity kind: '{other}'. Expected company, lead, deal, or system_root"
            ))),
        }
    }
}

/// A (kind, id) pair identifying one entity in the system of record.
///
/// Uniqueness is on the pair: a company and a lead may share the same
/// id string without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// The entity kind.
    pub kind: EntityKind,
    /// The entity's primary key in the system of record, or
    /// [`SYSTEM_ROOT_ENTITY_ID`] for the system root.
    pub id: String,
}

impl EntityRef {
    /// Create a new entity reference.
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// The reference for the singleton system root folder.
    pub fn system_root() -> Self {
        Self::new(EntityKind::SystemRoot, SYSTEM_ROOT_ENTITY_ID)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            EntityKind::Company,
            EntityKind::Lead,
            EntityKind::Deal,
            EntityKind::SystemRoot,
        ] {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("contact".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_refs_differ_by_kind() {
        let a = EntityRef::new(EntityKind::Company, "X1");
        let b = EntityRef::new(EntityKind::Lead, "X1");
        assert_ne!(a, b);
    }
}
