//! Shared test utilities for kube-backup integration tests.
//!
//! This module provides:
//! - `TestHarness`: a temp dir with a seeded bare git remote and a checkout path
//! - `StaticCluster` / `StaticSource`: in-memory cluster and Grafana fakes
//! - Builders for configs and cluster objects

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
