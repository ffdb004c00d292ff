//! Folder template domain entities.

pub mod model;
pub mod tree;

pub use model::{Template, TemplateNode};
pub use tree::TemplateTree;
