use std::path::Path;

use crate::config::schema::BackupConfig;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BackupConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

/// Parses a YAML config without validating it, so CLI flags can still fill
/// in required values afterwards.
pub fn load_config_from_str(content: &str) -> Result<BackupConfig, ConfigError> {
    if content.trim().is_empty() {
        return Ok(BackupConfig::default());
    }
    let config: BackupConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

pub fn validate_config(config: &BackupConfig) -> Result<(), ConfigError> {
    if config.git.repository.trim().is_empty() {
        return Err(ConfigError::MissingRepository);
    }

    if config.target_path.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "target path must not be empty".to_string(),
        });
    }

    if config.git.branch.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "git branch must not be empty".to_string(),
        });
    }

    // The prefix is joined onto the checkout, so it must stay inside it
    let prefix = Path::new(&config.git.prefix);
    if prefix.is_absolute() || config.git.prefix.split('/').any(|part| part == "..") {
        return Err(ConfigError::Validation {
            message: format!("git prefix must be a relative path: {}", config.git.prefix),
        });
    }

    if config.cluster.cli.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "cluster CLI must not be empty".to_string(),
        });
    }

    Ok(())
}
