//! In-memory repository implementations.
//!
//! Backed by Tokio mutexes, suitable for single-node development and
//! for the integration test harness. They honor the same contracts as
//! the Postgres implementations, including the distinguishable
//! uniqueness conflict on `insert`.

pub mod directory;
pub mod mapping;
pub mod template;

pub use directory::MemoryEntityDirectory;
pub use mapping::MemoryMappingRepository;
pub use template::MemoryTemplateRepository;
