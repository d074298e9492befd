//! kube-backup: snapshots the resource objects of a Kubernetes/OpenShift
//! cluster into a git repository as sanitized YAML, one file per object, and
//! mirrors an attached Grafana instance next to them.
//!
//! The pipeline for one run:
//!
//! 1. resolve the kinds to capture ([`selection`]),
//! 2. list each kind through the cluster CLI ([`cluster`]),
//! 3. drop derived objects, filtered namespaces and skip patterns ([`filter`]),
//! 4. strip volatile fields ([`resource::sanitize`]) and write the object
//!    ([`storage`]),
//! 5. run the plugins ([`plugins`]),
//! 6. summarize `git status` into a commit message ([`summary`]) and push
//!    ([`gitops`]).

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod filter;
pub mod gitops;
pub mod plugins;
pub mod resource;
pub mod runner;
pub mod sanitize;
pub mod secrets;
pub mod selection;
pub mod storage;
pub mod summary;

pub use cluster::{CliClusterClient, ClusterClient};
pub use config::BackupConfig;
pub use error::{BackupError, Result};
pub use gitops::BackupRepository;
pub use resource::ResourceRecord;
pub use runner::{backup, push, BackupReport, BackupRunner};
pub use selection::{Scope, TypeSet};
pub use summary::{summarize, ChangeSummary};
