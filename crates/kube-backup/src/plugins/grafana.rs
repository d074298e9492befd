//! Grafana mirror: dashboards, data sources, frontend settings, the current
//! organization and its users, written as pretty JSON below `_grafana_/`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;

use super::{Plugin, PluginError};
use crate::storage::TreeWriter;

pub const GRAFANA_DIR: &str = "_grafana_";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Volatile user fields that would change on every run.
const VOLATILE_USER_FIELDS: &[&str] = &["lastSeenAtAge", "lastSeenAt"];

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Can not connect to grafana: {url} - {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("Missing '{field}' in {context}")]
    MissingField { field: String, context: String },
}

/// Fetches JSON documents by API path.
pub trait JsonSource {
    fn get_json(&self, path: &str) -> Result<Value, DashboardError>;
}

/// [`JsonSource`] over HTTP with a bearer token.
pub struct HttpJsonSource {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpJsonSource {
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self, DashboardError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DashboardError::Http {
                url: base_url.to_string(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl JsonSource for HttpJsonSource {
    fn get_json(&self, path: &str) -> Result<Value, DashboardError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().map_err(|e| DashboardError::Http {
            url: url.clone(),
            source: e,
        })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(DashboardError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().map_err(|e| DashboardError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

/// Mirrors a Grafana instance into `_grafana_/`.
pub struct GrafanaMirror<S> {
    source: S,
}

impl<S: JsonSource> GrafanaMirror<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    fn backup_dashboards(&self, writer: &TreeWriter) -> Result<(), PluginError> {
        let path = "/api/search";
        for entry in self.get_list(path)? {
            let kind = entry.get("type").and_then(Value::as_str).unwrap_or("");
            if kind != "dash-db" && kind != "dash-folder" {
                return Err(DashboardError::UnknownType(kind.to_string()).into());
            }

            let uri = string_field(&entry, "uri", path)?;
            let name = uri.strip_prefix("db/").unwrap_or(uri);
            let folder = entry.get("folderTitle").and_then(Value::as_str);

            let mut file = format!("{}/dashboards", GRAFANA_DIR);
            if let Some(folder) = folder {
                file.push('/');
                file.push_str(&file_segment(folder));
            }
            file.push('/');
            file.push_str(&file_segment(name));
            file.push_str(".json");

            tracing::info!("Saving dashboard {}/{}", folder.unwrap_or(""), name);
            let dashboard = self.source.get_json(&format!("/api/dashboards/{}", uri))?;
            writer.write_json(&file, &dashboard)?;
        }
        Ok(())
    }

    fn backup_datasources(&self, writer: &TreeWriter) -> Result<(), PluginError> {
        let path = "/api/datasources/";
        for datasource in self.get_list(path)? {
            let name = string_field(&datasource, "name", path)?;
            tracing::info!("Saving datasource {}", name);
            writer.write_json(
                format!("{}/datasources/{}.json", GRAFANA_DIR, file_segment(name)),
                &datasource,
            )?;
        }
        Ok(())
    }

    fn backup_frontend_settings(&self, writer: &TreeWriter) -> Result<(), PluginError> {
        let settings = self.source.get_json("/api/frontend/settings")?;
        tracing::info!("Saving frontend_settings");
        writer.write_json(format!("{}/frontend_settings.json", GRAFANA_DIR), &settings)?;
        Ok(())
    }

    fn backup_org(&self, writer: &TreeWriter) -> Result<(), PluginError> {
        let org = self.source.get_json("/api/org")?;
        tracing::info!("Saving organization");
        writer.write_json(format!("{}/org.json", GRAFANA_DIR), &org)?;
        Ok(())
    }

    fn backup_org_users(&self, writer: &TreeWriter) -> Result<(), PluginError> {
        let path = "/api/org/users";
        for mut user in self.get_list(path)? {
            let login = string_field(&user, "login", path)?.to_string();
            tracing::info!("Saving user {}", login);
            if let Some(fields) = user.as_object_mut() {
                for field in VOLATILE_USER_FIELDS {
                    fields.shift_remove(*field);
                }
            }
            writer.write_json(
                format!("{}/users/{}.json", GRAFANA_DIR, file_segment(&login)),
                &user,
            )?;
        }
        Ok(())
    }

    fn get_list(&self, path: &str) -> Result<Vec<Value>, DashboardError> {
        match self.source.get_json(path)? {
            Value::Array(items) => Ok(items),
            other => Err(DashboardError::Decode {
                url: path.to_string(),
                message: format!("expected an array, got {}", type_name(&other)),
            }),
        }
    }
}

impl<S: JsonSource> Plugin for GrafanaMirror<S> {
    fn name(&self) -> &str {
        "grafana"
    }

    fn subtree(&self) -> &str {
        GRAFANA_DIR
    }

    fn run(&self, writer: &TreeWriter) -> Result<(), PluginError> {
        self.backup_dashboards(writer)?;
        self.backup_datasources(writer)?;
        self.backup_frontend_settings(writer)?;
        self.backup_org(writer)?;
        self.backup_org_users(writer)?;
        Ok(())
    }
}

fn string_field<'a>(value: &'a Value, field: &str, context: &str) -> Result<&'a str, DashboardError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| DashboardError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        })
}

/// Keeps a Grafana-supplied name to a single path segment.
fn file_segment(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
