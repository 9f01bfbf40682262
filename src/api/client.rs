//! HTTP API Client
//!
//! The host-independent client seam plus the typed calls the dashboard makes
//! against the backend. Hosts provide an [`ApiClient`]: reqwest natively,
//! gloo-net in the browser.

use async_trait::async_trait;
use serde_json::Value;

use super::error::FetchError;
use crate::manifest::PluginManifest;

/// Default API root every REST path hangs off
pub const DEFAULT_API_ROOT: &str = "/api";

/// Minimal JSON-over-HTTP surface the dashboard needs.
///
/// Paths are origin-relative (`/api/plugins`); the implementation decides
/// which origin they are sent to. Futures are `?Send` because the dashboard
/// runs on a single-threaded host.
#[async_trait(?Send)]
pub trait ApiClient {
    /// `GET` a path and decode the body as JSON
    async fn get_json(&self, path: &str) -> Result<Value, FetchError>;

    /// `POST` to a path with an empty body, ignoring the response body
    async fn post(&self, path: &str) -> Result<(), FetchError>;
}

/// Path layout of the backend REST API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    root: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self::new(DEFAULT_API_ROOT)
    }
}

impl ApiPaths {
    /// Create paths under the given API root (e.g. `/api`)
    pub fn new(root: &str) -> Self {
        let trimmed = root.trim().trim_end_matches('/');
        let root = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Self { root }
    }

    /// The API root, without trailing slash
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Manifest list endpoint
    pub fn plugins(&self) -> String {
        format!("{}/plugins", self.root)
    }

    /// System info endpoint
    pub fn info(&self) -> String {
        format!("{}/info", self.root)
    }

    /// Resolve a widget `data_endpoint` against the API root.
    ///
    /// Producers declare endpoints either relative to the root
    /// (`/plugins/x/devices`) or already carrying it (`/api/plugins/x/devices`);
    /// both resolve to the same path.
    pub fn data(&self, endpoint: &str) -> String {
        if !self.root.is_empty() {
            if let Some(rest) = endpoint.strip_prefix(self.root.as_str()) {
                if rest.is_empty() || rest.starts_with('/') {
                    return endpoint.to_string();
                }
            }
        }
        format!("{}{}", self.root, endpoint)
    }
}

/// Path of a plugin action under its `api_prefix`
pub fn action_path(api_prefix: &str, action: &str) -> String {
    format!("{}/{}", api_prefix.trim_end_matches('/'), action)
}

/// Fetch the raw manifest list
pub async fn fetch_manifests(
    client: &dyn ApiClient,
    paths: &ApiPaths,
) -> Result<Vec<PluginManifest>, FetchError> {
    let value = client.get_json(&paths.plugins()).await?;
    Ok(serde_json::from_value(value)?)
}

/// Fetch the system info object as display-ready key/value pairs
pub async fn fetch_info(
    client: &dyn ApiClient,
    paths: &ApiPaths,
) -> Result<Vec<(String, String)>, FetchError> {
    match client.get_json(&paths.info()).await? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, display_scalar(&value)))
            .collect()),
        other => Err(FetchError::Decode(format!(
            "expected an object from /info, got {}",
            json_kind(&other)
        ))),
    }
}

/// Fire the manual scan action of a plugin.
///
/// Errors are logged and swallowed; there is no retry.
pub async fn trigger_scan(client: &dyn ApiClient, manifest: &PluginManifest) {
    let path = action_path(&manifest.api_prefix, "scan");
    match client.post(&path).await {
        Ok(()) => tracing::debug!(plugin = %manifest.name, "Scan triggered"),
        Err(e) => tracing::warn!(plugin = %manifest.name, error = %e, "Scan trigger failed"),
    }
}

/// Render a JSON scalar the way a display-only key/value list shows it
pub fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
