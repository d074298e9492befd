//! Cluster queries through the `oc` / `kubectl` command line.

use std::process::Command;

use serde_json::Value;

use crate::error::ClusterError;
use crate::resource::ResourceRecord;
use crate::selection::Scope;

/// Lists resource objects of one kind.
pub trait ClusterClient {
    /// Returns every object of `resource`. Namespaced kinds are listed across
    /// all namespaces.
    fn list(&self, resource: &str, scope: Scope) -> Result<Vec<ResourceRecord>, ClusterError>;
}

/// Runs `<cli> get <resource> -o json` and parses the item list.
#[derive(Debug, Clone)]
pub struct CliClusterClient {
    binary: String,
}

impl CliClusterClient {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn args(resource: &str, scope: Scope) -> Vec<&str> {
        let mut args = vec!["get", resource, "-o", "json"];
        if scope == Scope::Namespaced {
            args.push("--all-namespaces");
        }
        args
    }
}

impl ClusterClient for CliClusterClient {
    fn list(&self, resource: &str, scope: Scope) -> Result<Vec<ResourceRecord>, ClusterError> {
        let args = Self::args(resource, scope);
        tracing::debug!(cli = %self.binary, args = ?args, "Querying cluster");

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| ClusterError::Spawn {
                command: format!("{} {}", self.binary, args.join(" ")),
                source: e,
            })?;

        if !output.status.success() {
            tracing::error!(
                resource,
                code = output.status.code().unwrap_or(-1),
                "{}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_items(resource, &String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses a `List` response. Empty output is treated as an empty list, so a
/// kind the cluster does not know about does not abort the run.
pub fn parse_items(resource: &str, stdout: &str) -> Result<Vec<ResourceRecord>, ClusterError> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut response: Value =
        serde_json::from_str(stdout).map_err(|e| ClusterError::ParseJson {
            resource: resource.to_string(),
            source: e,
        })?;

    let items = match response.get_mut("items").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(ClusterError::MissingItems {
                resource: resource.to_string(),
                response: stdout.trim().to_string(),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match ResourceRecord::from_value(item) {
            Some(record) => records.push(record),
            None => tracing::warn!(resource, "Ignoring non-object item in response"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_namespaced() {
        assert_eq!(
            CliClusterClient::args("deployment", Scope::Namespaced),
            vec!["get", "deployment", "-o", "json", "--all-namespaces"]
        );
        assert_eq!(
            CliClusterClient::args("node", Scope::Global),
            vec!["get", "node", "-o", "json"]
        );
    }

    #[test]
    fn test_parse_items() {
        let stdout = r#"{
            "apiVersion": "v1",
            "kind": "List",
            "items": [
                {"kind": "ConfigMap", "metadata": {"name": "a", "namespace": "prod"}},
                {"kind": "ConfigMap", "metadata": {"name": "b", "namespace": "prod"}}
            ]
        }"#;
        let records = parse_items("configmap", stdout).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "a");
        assert_eq!(records[1].namespace(), Some("prod"));
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_items("route", "").unwrap().is_empty());
        assert!(parse_items("route", "  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_items_carries_response() {
        let stdout = r#"{"kind": "Status", "message": "forbidden"}"#;
        let err = parse_items("secret", stdout).unwrap_err();
        match err {
            ClusterError::MissingItems { resource, response } => {
                assert_eq!(resource, "secret");
                assert!(response.contains("forbidden"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_items("pod", "error: the server doesn't have a resource type").unwrap_err();
        assert!(matches!(err, ClusterError::ParseJson { .. }));
    }

    #[test]
    fn test_key_order_preserved() {
        let stdout = r#"{"items": [{"spec": {}, "kind": "Service", "apiVersion": "v1"}]}"#;
        let records = parse_items("service", stdout).unwrap();
        let keys: Vec<&String> = records[0].as_map().keys().collect();
        assert_eq!(keys, vec!["spec", "kind", "apiVersion"]);
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let client = CliClusterClient::new("definitely-not-a-cluster-cli");
        let err = client.list("pod", Scope::Namespaced).unwrap_err();
        assert!(matches!(err, ClusterError::Spawn { .. }));
    }
}
