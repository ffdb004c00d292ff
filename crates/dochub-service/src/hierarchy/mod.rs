//! Hierarchy reconciliation.

pub mod reconciler;

pub use reconciler::HierarchyReconciler;
