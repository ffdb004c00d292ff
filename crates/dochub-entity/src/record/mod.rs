//! System-of-record entity views.

pub mod model;

pub use model::{CompanyRecord, DealRecord, EntityRecord, LeadRecord};
