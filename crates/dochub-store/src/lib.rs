//! # dochub-store
//!
//! External document-store adapters for DocHub. The [`FolderStore`]
//! trait is defined in `dochub-core`; this crate provides:
//!
//! - **remote**: HTTP adapter over the document-store REST API (reqwest)
//! - **memory**: in-process stand-in with the same non-transactional
//!   semantics, used for development and the test harness
//!
//! [`FolderStore`]: dochub_core::traits::store::FolderStore

pub mod manager;
pub mod providers;

pub use manager::StoreManager;
pub use providers::memory::MemoryFolderStore;
pub use providers::remote::RemoteFolderStore;
