//! Captured cluster objects and their normalization.

pub mod record;
pub mod sanitize;

pub use record::{OwnerReference, ResourceRecord};
pub use sanitize::sanitize;
