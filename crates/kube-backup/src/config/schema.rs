use serde::{Deserialize, Serialize};

/// Complete configuration for one backup run.
///
/// Built once at startup (from a YAML file, CLI flags, or both) and shared
/// read-only with every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupConfig {
    /// Local checkout directory of the backup repository.
    #[serde(default = "default_target_path")]
    pub target_path: String,

    #[serde(default)]
    pub git: GitSettings,

    #[serde(default)]
    pub selection: SelectionSettings,

    #[serde(default)]
    pub cluster: ClusterSettings,

    #[serde(default)]
    pub grafana: GrafanaSettings,
}

fn default_target_path() -> String {
    "/backup".to_string()
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            target_path: default_target_path(),
            git: GitSettings::default(),
            selection: SelectionSettings::default(),
            cluster: ClusterSettings::default(),
            grafana: GrafanaSettings::default(),
        }
    }
}

/// Which objects get captured.
///
/// All list fields hold comma-separated values, exactly as they are given on
/// the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSettings {
    /// Replaces the default namespaced kinds.
    #[serde(default)]
    pub resources: Option<String>,
    #[serde(default)]
    pub extra_resources: Option<String>,
    #[serde(default)]
    pub skip_resources: Option<String>,

    /// Replaces the default cluster-scoped kinds.
    #[serde(default)]
    pub global_resources: Option<String>,
    #[serde(default)]
    pub extra_global_resources: Option<String>,
    #[serde(default)]
    pub skip_global_resources: Option<String>,

    #[serde(default)]
    pub only_namespaces: Option<String>,
    #[serde(default)]
    pub skip_namespaces: Option<String>,

    /// Skip patterns such as `kube-system/Secret/*` or `Node/*`.
    #[serde(default)]
    pub skip_objects: Option<String>,
}

/// Backup repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSettings {
    /// Git repository URL.
    #[serde(default)]
    pub repository: String,

    /// Branch to clone and push.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Subdirectory of the repository that holds the backup.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Git user name for commits.
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Git user email for commits.
    #[serde(default = "default_user_email")]
    pub user_email: String,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_prefix() -> String {
    ".".to_string()
}

fn default_user_name() -> String {
    "kube-backup".to_string()
}

fn default_user_email() -> String {
    format!("kube-backup@{}", hostname())
}

fn hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            repository: String::new(),
            branch: default_branch(),
            prefix: default_prefix(),
            user_name: default_user_name(),
            user_email: default_user_email(),
        }
    }
}

/// How the cluster is queried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSettings {
    /// CLI binary used for `get` queries (`oc` or `kubectl`).
    #[serde(default = "default_cli")]
    pub cli: String,
}

fn default_cli() -> String {
    "oc".to_string()
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self { cli: default_cli() }
    }
}

/// Grafana mirroring. Disabled when `url` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrafanaSettings {
    #[serde(default)]
    pub url: String,

    /// Direct token value.
    /// WARNING: This stores the token in plaintext in the config file.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "token")]
    pub token_insecure: Option<String>,

    /// Path to a file containing the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<String>,

    /// Environment variable containing the token.
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,
}

fn default_token_env_var() -> String {
    "GRAFANA_TOKEN".to_string()
}

impl Default for GrafanaSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            token_insecure: None,
            token_file: None,
            token_env_var: default_token_env_var(),
        }
    }
}

impl GrafanaSettings {
    pub fn enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}
