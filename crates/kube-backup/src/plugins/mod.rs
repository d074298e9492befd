//! Optional mirrors of services attached to the cluster.
//!
//! A plugin owns one subtree of the backup root. When it fails, the runner
//! logs the error and resets that subtree to the last commit so a partial
//! mirror never gets pushed.

pub mod grafana;

use thiserror::Error;

use crate::config::BackupConfig;
use crate::error::{ConfigError, StorageError};
use crate::secrets::resolve_secret_optional;
use crate::storage::TreeWriter;

pub use grafana::{DashboardError, GrafanaMirror, HttpJsonSource, JsonSource, GRAFANA_DIR};

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Grafana: {0}")]
    Dashboard(#[from] DashboardError),

    #[error("Failed to write plugin output: {0}")]
    Storage(#[from] StorageError),
}

/// A mirror that writes below its own subtree of the backup root.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Directory, relative to the backup root, this plugin writes into.
    fn subtree(&self) -> &str;

    fn run(&self, writer: &TreeWriter) -> Result<(), PluginError>;
}

/// Builds the plugins enabled by the configuration.
pub fn configured_plugins(config: &BackupConfig) -> Result<Vec<Box<dyn Plugin>>, ConfigError> {
    let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();

    let grafana = &config.grafana;
    if grafana.enabled() {
        let token = resolve_secret_optional(
            grafana.token_insecure.as_deref(),
            grafana.token_file.as_deref(),
            Some(grafana.token_env_var.as_str()),
        )?;
        if token.is_none() {
            tracing::warn!("No Grafana token configured, requests will be unauthenticated");
        }

        let source = HttpJsonSource::new(&grafana.url, token).map_err(|e| {
            ConfigError::Validation {
                message: format!("grafana client: {}", e),
            }
        })?;
        plugins.push(Box::new(GrafanaMirror::new(source)));
    } else {
        tracing::info!("Skip Grafana plugin");
    }

    Ok(plugins)
}
