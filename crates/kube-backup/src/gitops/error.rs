//! Errors raised while driving the backup repository.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitOpsError {
    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("Git network error: {0}")]
    GitNetworkError(String),

    #[error("Git authentication failed: {0}")]
    GitAuthFailed(String),

    #[error("Git repository not initialized at '{0}'")]
    GitNotInitialized(PathBuf),

    #[error("Failed to update known hosts '{path}': {source}")]
    KnownHosts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ssh-keyscan failed for '{host}': {message}")]
    KeyScan { host: String, message: String },

    #[error("File operation failed: {0}")]
    FileOperation(String),
}

impl From<std::io::Error> for GitOpsError {
    fn from(err: std::io::Error) -> Self {
        GitOpsError::FileOperation(err.to_string())
    }
}

/// Classifies a git stderr string into a more specific error variant.
pub fn classify_git_error(stderr: &str) -> GitOpsError {
    let lower = stderr.to_lowercase();

    if lower.contains("could not resolve host")
        || lower.contains("connection refused")
        || lower.contains("connection timed out")
        || lower.contains("network is unreachable")
        || lower.contains("unable to access")
        || lower.contains("failed to connect")
        || lower.contains("couldn't connect to server")
        || lower.contains("the remote end hung up unexpectedly")
    {
        return GitOpsError::GitNetworkError(stderr.trim().to_string());
    }

    if lower.contains("authentication failed")
        || lower.contains("permission denied")
        || lower.contains("host key verification failed")
        || lower.contains("invalid credentials")
    {
        return GitOpsError::GitAuthFailed(stderr.trim().to_string());
    }

    GitOpsError::GitOperation(stderr.trim().to_string())
}

pub type Result<T> = std::result::Result<T, GitOpsError>;
