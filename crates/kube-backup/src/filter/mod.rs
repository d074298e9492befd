//! Decisions about which captured objects get written.

pub mod derived;
pub mod namespace;
pub mod pattern;

pub use derived::{check_derived, SkipReason, SKIP_POD_OWNERS};
pub use namespace::NamespaceFilter;
pub use pattern::{FilterPattern, PatternSet, Segment};
