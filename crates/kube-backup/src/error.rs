use std::path::PathBuf;
use thiserror::Error;

use crate::gitops::GitOpsError;
use crate::plugins::PluginError;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cluster query failed: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Git error: {0}")]
    Git(#[from] GitOpsError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// The cluster returned an object shape the selection rules do not
    /// account for.
    #[error("Unexpected resource {kind}/{name}: {message}\n{record}")]
    Invariant {
        kind: String,
        name: String,
        message: String,
        record: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Git repo-url is required, please specify --repo-url or GIT_REPO_URL")]
    MissingRepository,

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Failed to resolve secret: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse response for '{resource}': {source}")]
    ParseJson {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Can not get resource {resource}, response:\n{response}")]
    MissingItems { resource: String, response: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize '{path}': {message}")]
    Serialize { path: PathBuf, message: String },

    #[error("Path '{path}' leaves the backup tree")]
    OutsideTree { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, BackupError>;
