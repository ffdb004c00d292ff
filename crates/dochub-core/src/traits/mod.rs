//! Core traits defined in `dochub-core` and implemented by other crates.

pub mod cache;
pub mod store;

pub use cache::CacheProvider;
pub use store::{EntryKind, FolderStore, PermissionRole, StoreEntry, StoreFolder, StorePermission};
