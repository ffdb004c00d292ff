//! Cache key builders for all DocHub cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all DocHub cache keys.
const PREFIX: &str = "dochub";

// ── Child listing keys ─────────────────────────────────────

/// Cache key for the child listing of an external folder.
///
/// Every folder or file creation, move, or rename under the folder must
/// invalidate this key before the next read.
pub fn children_of(folder_id: &str) -> String {
    format!("{PREFIX}:children:{folder_id}")
}

// ── Mapping keys ───────────────────────────────────────────

/// Cache key for the live folder mapping of an entity.
pub fn mapping_by_entity(entity_kind: &str, entity_id: &str) -> String {
    format!("{PREFIX}:mapping:{entity_kind}:{entity_id}")
}
