//! Template materialization.

pub mod materializer;

pub use materializer::TemplateMaterializer;
