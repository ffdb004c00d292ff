//! Folder-store adapter implementations.

pub mod memory;
pub mod remote;
