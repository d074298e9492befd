//! Command line surface. Every option falls back to an environment variable
//! so the binary can run as a CronJob configured purely through `env:`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{load_config, validate_config, BackupConfig};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Back up cluster resources and Grafana configuration into git
#[derive(Parser, Debug)]
#[command(name = "kube-backup", author, version, about, long_about = None)]
pub struct Cli {
    /// YAML config file; flags and env vars override its values
    #[arg(short, long, env = "KUBE_BACKUP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Git repository URL
    #[arg(long, env = "GIT_REPO_URL", global = true)]
    pub repo_url: Option<String>,

    /// Branch to clone and push
    #[arg(long, env = "GIT_BRANCH", global = true)]
    pub branch: Option<String>,

    /// Directory inside the repository that holds the backup
    #[arg(long, env = "GIT_PREFIX", global = true)]
    pub git_prefix: Option<String>,

    /// Where the repository is cloned
    #[arg(long, env = "TARGET_PATH", global = true)]
    pub target_path: Option<String>,

    /// Commit author name
    #[arg(long, env = "GIT_USERNAME", global = true)]
    pub git_name: Option<String>,

    /// Commit author email
    #[arg(long, env = "GIT_EMAIL", global = true)]
    pub git_email: Option<String>,

    /// Namespaced types to back up, replacing the defaults
    #[arg(long, env = "RESOURCES", global = true)]
    pub resources: Option<String>,

    /// Namespaced types added to the defaults
    #[arg(long, env = "EXTRA_RESOURCES", global = true)]
    pub extra_resources: Option<String>,

    /// Namespaced types removed from the defaults
    #[arg(long, env = "SKIP_RESOURCES", global = true)]
    pub skip_resources: Option<String>,

    /// Cluster-scoped types to back up, replacing the defaults
    #[arg(long, env = "GLOBAL_RESOURCES", global = true)]
    pub global_resources: Option<String>,

    /// Cluster-scoped types added to the defaults
    #[arg(long, env = "EXTRA_GLOBAL_RESOURCES", global = true)]
    pub extra_global_resources: Option<String>,

    /// Cluster-scoped types removed from the defaults
    #[arg(long, env = "SKIP_GLOBAL_RESOURCES", global = true)]
    pub skip_global_resources: Option<String>,

    /// Only back up these namespaces
    #[arg(long, env = "ONLY_NAMESPACES", global = true)]
    pub only_namespaces: Option<String>,

    /// Never back up these namespaces
    #[arg(long, env = "SKIP_NAMESPACES", global = true)]
    pub skip_namespaces: Option<String>,

    /// Object patterns to skip: `kind/name` or `namespace/kind/name`, `*` matches any segment
    #[arg(long, env = "SKIP_OBJECTS", global = true)]
    pub skip_objects: Option<String>,

    /// Cluster CLI binary (`oc` or `kubectl`)
    #[arg(long, env = "CLUSTER_CLI", global = true)]
    pub cluster_cli: Option<String>,

    /// Grafana base URL; the Grafana mirror is skipped when unset
    #[arg(long, env = "GRAFANA_URL", global = true)]
    pub grafana_url: Option<String>,

    /// Grafana API token
    #[arg(long, env = "GRAFANA_TOKEN", global = true, hide_env_values = true)]
    pub grafana_token: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Clone the repository and write the current cluster state into it
    Backup,
    /// Commit and push whatever changed in the backup tree
    Push,
    /// Backup followed by push (default)
    Run,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    /// Loads the config file, if any, applies the flag overrides and validates
    /// the result.
    pub fn build_config(&self) -> Result<BackupConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => BackupConfig::default(),
        };

        self.apply_overrides(&mut config);
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut BackupConfig) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_opt(target: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut config.target_path, &self.target_path);

        let git = &mut config.git;
        set(&mut git.repository, &self.repo_url);
        set(&mut git.branch, &self.branch);
        set(&mut git.prefix, &self.git_prefix);
        set(&mut git.user_name, &self.git_name);
        set(&mut git.user_email, &self.git_email);

        let selection = &mut config.selection;
        set_opt(&mut selection.resources, &self.resources);
        set_opt(&mut selection.extra_resources, &self.extra_resources);
        set_opt(&mut selection.skip_resources, &self.skip_resources);
        set_opt(&mut selection.global_resources, &self.global_resources);
        set_opt(&mut selection.extra_global_resources, &self.extra_global_resources);
        set_opt(&mut selection.skip_global_resources, &self.skip_global_resources);
        set_opt(&mut selection.only_namespaces, &self.only_namespaces);
        set_opt(&mut selection.skip_namespaces, &self.skip_namespaces);
        set_opt(&mut selection.skip_objects, &self.skip_objects);

        set(&mut config.cluster.cli, &self.cluster_cli);

        set(&mut config.grafana.url, &self.grafana_url);
        set_opt(&mut config.grafana.token_insecure, &self.grafana_token);
    }
}
