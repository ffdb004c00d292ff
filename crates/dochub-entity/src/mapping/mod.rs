//! Folder mapping domain entities.

pub mod model;

pub use model::{FolderMapping, NewFolderMapping};
