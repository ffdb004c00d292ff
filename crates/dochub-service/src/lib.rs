//! # dochub-service
//!
//! The reconciliation core of DocHub:
//!
//! - [`HierarchyReconciler`] maps each CRM entity to exactly one
//!   external folder, provisioning ancestors and structural folders on
//!   the way down
//! - [`TemplateMaterializer`] creates the active template's folder
//!   subtree under an entity folder without duplicating nodes
//! - [`CachedListing`] is a write-through cache over "list children" store
//!   calls, invalidated on every mutation underneath a folder
//!
//! [`HierarchyReconciler`]: hierarchy::HierarchyReconciler
//! [`TemplateMaterializer`]: template::TemplateMaterializer
//! [`CachedListing`]: listing::CachedListing

pub mod hierarchy;
pub mod listing;
pub mod template;

pub use hierarchy::HierarchyReconciler;
pub use listing::CachedListing;
pub use template::TemplateMaterializer;
