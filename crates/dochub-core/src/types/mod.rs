//! Shared domain types.

pub mod entity;

pub use entity::{EntityKind, EntityRef, SYSTEM_ROOT_ENTITY_ID};
