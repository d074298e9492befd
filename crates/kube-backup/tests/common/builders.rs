//! Builders for configs, cluster objects and fake collaborators.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{json, Value};

use kube_backup::config::BackupConfig;
use kube_backup::error::ClusterError;
use kube_backup::plugins::{DashboardError, JsonSource};
use kube_backup::{ClusterClient, ResourceRecord, Scope};

/// Builder for `BackupConfig` instances pointed at a harness.
pub struct ConfigBuilder {
    config: BackupConfig,
}

impl ConfigBuilder {
    pub fn new(repository: &str, target: &str) -> Self {
        let mut config = BackupConfig::default();
        config.git.repository = repository.to_string();
        config.git.user_name = "kube-backup".to_string();
        config.git.user_email = "kube-backup@test".to_string();
        config.target_path = target.to_string();
        Self { config }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.git.prefix = prefix.to_string();
        self
    }

    pub fn global_resources(mut self, list: &str) -> Self {
        self.config.selection.global_resources = Some(list.to_string());
        self
    }

    pub fn resources(mut self, list: &str) -> Self {
        self.config.selection.resources = Some(list.to_string());
        self
    }

    pub fn skip_objects(mut self, list: &str) -> Self {
        self.config.selection.skip_objects = Some(list.to_string());
        self
    }

    pub fn only_namespaces(mut self, list: &str) -> Self {
        self.config.selection.only_namespaces = Some(list.to_string());
        self
    }

    pub fn skip_namespaces(mut self, list: &str) -> Self {
        self.config.selection.skip_namespaces = Some(list.to_string());
        self
    }

    pub fn build(self) -> BackupConfig {
        self.config
    }
}

/// A cluster object with just kind and metadata.
pub fn object(kind: &str, namespace: Option<&str>, name: &str) -> Value {
    let mut metadata = json!({
        "name": name,
        "uid": format!("uid-{}", name),
        "resourceVersion": "12345",
        "creationTimestamp": "2026-10-01T12:00:00Z",
    });
    if let Some(ns) = namespace {
        metadata["namespace"] = json!(ns);
    }
    json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": metadata,
        "status": {"phase": "Active"},
    })
}

pub fn node(name: &str) -> Value {
    object("Node", None, name)
}

pub fn configmap(namespace: &str, name: &str, data: Value) -> Value {
    let mut value = object("ConfigMap", Some(namespace), name);
    value["data"] = data;
    value
}

pub fn pod_owned_by(namespace: &str, name: &str, owners: &[&str]) -> Value {
    let mut value = object("Pod", Some(namespace), name);
    let refs: Vec<Value> = owners
        .iter()
        .map(|kind| json!({"kind": kind, "name": format!("{}-owner", name)}))
        .collect();
    value["metadata"]["ownerReferences"] = json!(refs);
    value
}

pub fn service(namespace: &str, name: &str, cluster_ip: &str) -> Value {
    let mut value = object("Service", Some(namespace), name);
    value["spec"] = json!({"clusterIP": cluster_ip, "ports": [{"port": 80}]});
    value
}

pub fn pod_endpoints(namespace: &str, name: &str) -> Value {
    let mut value = object("Endpoints", Some(namespace), name);
    value["subsets"] = json!([{
        "addresses": [{"ip": "10.0.0.7", "targetRef": {"kind": "Pod", "name": format!("{}-x", name)}}]
    }]);
    value
}

pub fn service_account_token(namespace: &str, name: &str) -> Value {
    let mut value = object("Secret", Some(namespace), name);
    value["type"] = json!("kubernetes.io/service-account-token");
    value
}

/// `ClusterClient` backed by a map from resource type to items.
#[derive(Default)]
pub struct StaticCluster {
    items: HashMap<String, Vec<Value>>,
    pub queries: RefCell<Vec<(String, Scope)>>,
}

impl StaticCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: &str, items: Vec<Value>) -> Self {
        self.items.insert(resource.to_string(), items);
        self
    }

    pub fn set(&mut self, resource: &str, items: Vec<Value>) {
        self.items.insert(resource.to_string(), items);
    }
}

impl ClusterClient for StaticCluster {
    fn list(&self, resource: &str, scope: Scope) -> Result<Vec<ResourceRecord>, ClusterError> {
        self.queries
            .borrow_mut()
            .push((resource.to_string(), scope));
        Ok(self
            .items
            .get(resource)
            .into_iter()
            .flatten()
            .filter_map(|v| ResourceRecord::from_value(v.clone()))
            .collect())
    }
}

/// `JsonSource` backed by a map from API path to document.
#[derive(Default, Clone)]
pub struct StaticSource {
    documents: HashMap<String, Value>,
}

impl StaticSource {
    /// A small but complete Grafana instance.
    pub fn grafana() -> Self {
        Self::default()
            .with(
                "/api/search",
                json!([{"type": "dash-db", "uri": "db/nodes", "folderTitle": "Cluster"}]),
            )
            .with("/api/dashboards/db/nodes", json!({"dashboard": {"title": "Nodes"}}))
            .with("/api/datasources/", json!([{"id": 1, "name": "prometheus"}]))
            .with("/api/frontend/settings", json!({"buildInfo": {"version": "10.4.0"}}))
            .with("/api/org", json!({"id": 1, "name": "Main Org."}))
            .with("/api/org/users", json!([{"login": "admin", "lastSeenAt": "now"}]))
    }

    pub fn with(mut self, path: &str, value: Value) -> Self {
        self.documents.insert(path.to_string(), value);
        self
    }

    pub fn without(mut self, path: &str) -> Self {
        self.documents.remove(path);
        self
    }
}

impl JsonSource for StaticSource {
    fn get_json(&self, path: &str) -> Result<Value, DashboardError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| DashboardError::Status {
                url: path.to_string(),
                status: 500,
            })
    }
}
