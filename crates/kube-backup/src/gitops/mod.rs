//! Git plumbing for the backup checkout.
//!
//! Everything shells out to the `git` binary; the checkout is a shallow clone
//! of one branch and only the configured prefix is ever staged.

pub mod error;
pub mod parse;
pub mod repository;

pub use error::{classify_git_error, GitOpsError, Result};
pub use repository::BackupRepository;
