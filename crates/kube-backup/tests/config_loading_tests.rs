//! Config file loading through the public API.

mod common;

use kube_backup::config::{load_config, validate_config};
use kube_backup::error::ConfigError;
use kube_backup::filter::PatternSet;
use kube_backup::TypeSet;

const FULL_CONFIG: &str = r#"
targetPath: /var/lib/kube-backup
git:
  repository: git@git.example.com:ops/cluster-backup.git
  branch: production
  prefix: cluster-a
  userName: backup-bot
  userEmail: backup-bot@example.com
selection:
  extraResources: networkattachmentdefinition
  skipResources: pod, endpoints
  skipGlobalResources: node
  skipNamespaces: kube-system,openshift-monitoring
  skipObjects: "*/secret/*, clusterrole/system:*"
cluster:
  cli: kubectl
grafana:
  url: http://grafana.monitoring.svc:3000
  tokenFile: /var/run/secrets/grafana/token
"#;

#[test]
fn test_load_full_config() {
    let harness = common::TestHarness::new();
    let path = harness.temp_path().join("backup.yaml");
    std::fs::write(&path, FULL_CONFIG).unwrap();

    let config = load_config(&path).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.target_path, "/var/lib/kube-backup");
    assert_eq!(config.git.branch, "production");
    assert_eq!(config.git.prefix, "cluster-a");
    assert_eq!(config.git.user_name, "backup-bot");
    assert_eq!(config.cluster.cli, "kubectl");
    assert!(config.grafana.enabled());
    assert_eq!(config.grafana.token_env_var, "GRAFANA_TOKEN");

    let types = TypeSet::from_settings(&config.selection);
    assert!(!types.global.contains(&"node".to_string()));
    assert!(!types.namespaced.contains(&"pod".to_string()));
    assert!(!types.namespaced.contains(&"endpoints".to_string()));
    assert_eq!(
        types.namespaced.last().map(String::as_str),
        Some("networkattachmentdefinition")
    );

    let patterns = PatternSet::from_option(config.selection.skip_objects.as_deref());
    assert_eq!(patterns.global.len(), 1);
    assert_eq!(patterns.namespaced.len(), 1);
}

#[test]
fn test_missing_file() {
    let harness = common::TestHarness::new();
    let err = load_config(harness.temp_path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_config_without_repository_fails_validation() {
    let harness = common::TestHarness::new();
    let path = harness.temp_path().join("backup.yaml");
    std::fs::write(&path, "git:\n  branch: main\n").unwrap();

    let config = load_config(&path).unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::MissingRepository)
    ));
}
