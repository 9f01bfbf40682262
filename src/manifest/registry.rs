//! Manifest Registry
//!
//! Fetches the plugin manifests once at startup, validates and orders them,
//! and publishes them as the single source of truth for navigation and
//! widget placement.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

use super::routes::{DEFAULT_ROUTE, SETTINGS_ROUTE};
use super::types::PluginManifest;
use crate::api::{fetch_manifests, ApiClient, ApiPaths};

/// Loader-time validation failures. Any of these rejects the whole load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Duplicate plugin name: {0}")]
    DuplicateName(String),

    #[error("Duplicate route path {route} (plugins {first} and {second})")]
    DuplicateRoute {
        route: String,
        first: String,
        second: String,
    },

    #[error("Plugin {plugin} claims route {route}, which is reserved or not absolute")]
    InvalidRoute { plugin: String, route: String },

    #[error("Plugin {plugin} declares widget {widget_id} more than once")]
    DuplicateWidget { plugin: String, widget_id: String },

    #[error("Widget {plugin}/{widget_id} has data endpoint {endpoint}, which is not an absolute path")]
    InvalidEndpoint {
        plugin: String,
        widget_id: String,
        endpoint: String,
    },
}

/// A validated, ordered set of active manifests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestSet {
    manifests: Vec<PluginManifest>,
}

impl ManifestSet {
    /// Build the set from a fetched manifest list.
    ///
    /// Disabled manifests are dropped, the rest are validated and stably
    /// sorted by `sidebar_order` (ties keep fetch order).
    pub fn from_fetched(fetched: Vec<PluginManifest>) -> Result<Self, ManifestError> {
        let mut manifests: Vec<PluginManifest> =
            fetched.into_iter().filter(|m| m.enabled).collect();

        validate(&manifests)?;
        manifests.sort_by_key(|m| m.frontend.sidebar_order);

        Ok(Self { manifests })
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PluginManifest> {
        self.manifests.iter()
    }

    pub fn as_slice(&self) -> &[PluginManifest] {
        &self.manifests
    }

    /// Look up a manifest by its unique name
    pub fn get(&self, name: &str) -> Option<&PluginManifest> {
        self.manifests.iter().find(|m| m.name == name)
    }
}

impl<'a> IntoIterator for &'a ManifestSet {
    type Item = &'a PluginManifest;
    type IntoIter = std::slice::Iter<'a, PluginManifest>;

    fn into_iter(self) -> Self::IntoIter {
        self.manifests.iter()
    }
}

fn validate(manifests: &[PluginManifest]) -> Result<(), ManifestError> {
    let mut names = HashSet::new();
    let mut routes: Vec<(&str, &str)> = Vec::new();

    for manifest in manifests {
        if !names.insert(manifest.name.as_str()) {
            return Err(ManifestError::DuplicateName(manifest.name.clone()));
        }

        let route = normalize_path(&manifest.frontend.route_path);
        if !route.starts_with('/') || route == DEFAULT_ROUTE || route == SETTINGS_ROUTE {
            return Err(ManifestError::InvalidRoute {
                plugin: manifest.name.clone(),
                route: manifest.frontend.route_path.clone(),
            });
        }
        if let Some((_, first)) = routes.iter().find(|(r, _)| *r == route) {
            return Err(ManifestError::DuplicateRoute {
                route: route.to_string(),
                first: first.to_string(),
                second: manifest.name.clone(),
            });
        }
        routes.push((route, manifest.name.as_str()));

        let mut widget_ids = HashSet::new();
        for widget in &manifest.frontend.widgets {
            if !widget_ids.insert(widget.widget_id.as_str()) {
                return Err(ManifestError::DuplicateWidget {
                    plugin: manifest.name.clone(),
                    widget_id: widget.widget_id.clone(),
                });
            }
            if !widget.data_endpoint.starts_with('/') {
                return Err(ManifestError::InvalidEndpoint {
                    plugin: manifest.name.clone(),
                    widget_id: widget.widget_id.clone(),
                    endpoint: widget.data_endpoint.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Strip a trailing slash from anything but the root path
pub(crate) fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// What consumers of the registry observe. Swapped as a whole on every load.
#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    /// Current manifest set (empty until the first successful load)
    pub manifests: Rc<ManifestSet>,
    /// Message of the most recent failed load, cleared on success
    pub error: Option<String>,
    /// Whether the first load has settled, successfully or not
    pub loaded: bool,
}

impl RegistryState {
    /// Same manifest set and load flag, so views built from either are equal
    pub fn renders_same(&self, other: &RegistryState) -> bool {
        self.loaded == other.loaded && Rc::ptr_eq(&self.manifests, &other.manifests)
    }
}

/// Loads and holds the session's manifest set
pub struct ManifestRegistry {
    client: Rc<dyn ApiClient>,
    paths: ApiPaths,
    state: RefCell<RegistryState>,
    issued: Cell<u64>,
    applied: Cell<u64>,
}

impl ManifestRegistry {
    /// Create an empty registry; nothing is fetched until [`load`](Self::load)
    pub fn new(client: Rc<dyn ApiClient>, paths: ApiPaths) -> Self {
        Self {
            client,
            paths,
            state: RefCell::new(RegistryState::default()),
            issued: Cell::new(0),
            applied: Cell::new(0),
        }
    }

    /// Fetch the manifest list and publish it.
    ///
    /// Never fails: on error the previous set stays in place and the message
    /// is recorded in [`RegistryState::error`]. Returns the set in effect
    /// afterwards.
    pub async fn load(&self) -> Rc<ManifestSet> {
        let seq = self.issued.get() + 1;
        self.issued.set(seq);

        let result = fetch_manifests(self.client.as_ref(), &self.paths)
            .await
            .map_err(|e| e.to_string())
            .and_then(|fetched| ManifestSet::from_fetched(fetched).map_err(|e| e.to_string()));

        if seq < self.applied.get() {
            tracing::debug!(seq, "Discarding superseded manifest load");
            return self.manifests();
        }
        self.applied.set(seq);

        let mut state = self.state.borrow_mut();
        match result {
            Ok(set) => {
                tracing::info!(plugins = set.len(), "Loaded plugin manifests");
                *state = RegistryState {
                    manifests: Rc::new(set),
                    error: None,
                    loaded: true,
                };
            }
            Err(message) => {
                tracing::warn!(error = %message, "Failed to load plugin manifests");
                state.error = Some(message);
                state.loaded = true;
            }
        }

        Rc::clone(&state.manifests)
    }

    /// Re-fetch and atomically replace the manifest set
    pub async fn refresh(&self) -> Rc<ManifestSet> {
        self.load().await
    }

    /// Snapshot of the current registry state
    pub fn state(&self) -> RegistryState {
        self.state.borrow().clone()
    }

    /// The current manifest set
    pub fn manifests(&self) -> Rc<ManifestSet> {
        Rc::clone(&self.state.borrow().manifests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::manifest::navigation;
    use crate::testing::{manifest, widget, FakeApi};
    use crate::widgets::builtin_text_kinds;

    fn orders(set: &ManifestSet) -> Vec<(i64, String)> {
        set.iter()
            .map(|m| (m.frontend.sidebar_order, m.name.clone()))
            .collect()
    }

    #[test]
    fn test_sort_is_stable_and_ascending() {
        let set = ManifestSet::from_fetched(vec![
            manifest("c", 3, "/c"),
            manifest("first_one", 1, "/a"),
            manifest("second_one", 1, "/b"),
            manifest("d", 2, "/d"),
        ])
        .unwrap();

        assert_eq!(
            orders(&set),
            vec![
                (1, "first_one".to_string()),
                (1, "second_one".to_string()),
                (2, "d".to_string()),
                (3, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_sort_is_idempotent() {
        let once = ManifestSet::from_fetched(vec![
            manifest("c", 3, "/c"),
            manifest("a", 1, "/a"),
            manifest("b", 1, "/b"),
            manifest("d", 2, "/d"),
        ])
        .unwrap();
        let twice = ManifestSet::from_fetched(once.as_slice().to_vec()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_disabled_manifests_are_dropped() {
        let mut off = manifest("off", 1, "/off");
        off.enabled = false;

        let set = ManifestSet::from_fetched(vec![off, manifest("on", 2, "/on")]).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("off").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = ManifestSet::from_fetched(vec![manifest("a", 1, "/a"), manifest("a", 2, "/b")])
            .unwrap_err();
        assert_eq!(err, ManifestError::DuplicateName("a".to_string()));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let err = ManifestSet::from_fetched(vec![manifest("a", 1, "/x"), manifest("b", 2, "/x/")])
            .unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_reserved_route_rejected() {
        let err = ManifestSet::from_fetched(vec![manifest("a", 1, "/settings")]).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidRoute { .. }));

        let err = ManifestSet::from_fetched(vec![manifest("a", 1, "relative")]).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidRoute { .. }));
    }

    #[test]
    fn test_duplicate_widget_id_rejected() {
        let mut m = manifest("a", 1, "/a");
        m.frontend.widgets = vec![widget("w", "table"), widget("w", "chart")];

        let err = ManifestSet::from_fetched(vec![m]).unwrap_err();
        assert_eq!(
            err,
            ManifestError::DuplicateWidget {
                plugin: "a".to_string(),
                widget_id: "w".to_string()
            }
        );
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let mut m = manifest("a", 1, "/a");
        let mut w = widget("w", "table");
        w.data_endpoint = "devices".to_string();
        m.frontend.widgets = vec![w];

        let err = ManifestSet::from_fetched(vec![m]).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_load_publishes_sorted_set() {
        let api = FakeApi::new();
        api.respond_manifests(vec![manifest("b", 2, "/b"), manifest("a", 1, "/a")]);
        let registry = ManifestRegistry::new(api.clone(), ApiPaths::default());

        assert!(!registry.state().loaded);
        let set = registry.load().await;

        assert_eq!(set.as_slice()[0].name, "a");
        let state = registry.state();
        assert!(state.loaded);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_first_load_failure_gives_empty_set_and_error() {
        let api = FakeApi::new();
        api.respond("/api/plugins", Err(FetchError::status(500, "Internal Server Error")));
        let registry = ManifestRegistry::new(api.clone(), ApiPaths::default());

        let set = registry.load().await;

        assert!(set.is_empty());
        let state = registry.state();
        assert!(state.loaded);
        assert_eq!(
            state.error.as_deref(),
            Some("API error 500: Internal Server Error")
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_set() {
        let api = FakeApi::new();
        api.respond_manifests(vec![manifest("a", 1, "/a")]);
        let registry = ManifestRegistry::new(api.clone(), ApiPaths::default());
        let first = registry.load().await;

        api.respond("/api/plugins", Err(FetchError::Network("offline".into())));
        let second = registry.refresh().await;

        assert!(Rc::ptr_eq(&first, &second));
        assert!(registry.state().error.is_some());
    }

    #[tokio::test]
    async fn test_invalid_refresh_keeps_previous_set() {
        let api = FakeApi::new();
        api.respond_manifests(vec![manifest("a", 1, "/a")]);
        let registry = ManifestRegistry::new(api.clone(), ApiPaths::default());
        registry.load().await;

        api.respond_manifests(vec![manifest("a", 1, "/a"), manifest("a", 2, "/b")]);
        let set = registry.refresh().await;

        assert_eq!(set.len(), 1);
        assert_eq!(
            registry.state().error.as_deref(),
            Some("Duplicate plugin name: a")
        );
    }

    #[tokio::test]
    async fn test_refresh_replaces_set_and_clears_error() {
        let api = FakeApi::new();
        api.respond("/api/plugins", Err(FetchError::Network("offline".into())));
        let registry = ManifestRegistry::new(api.clone(), ApiPaths::default());
        registry.load().await;

        api.respond_manifests(vec![manifest("a", 1, "/a"), manifest("b", 0, "/b")]);
        let set = registry.refresh().await;

        assert_eq!(orders(&set)[0].1, "b");
        assert!(registry.state().error.is_none());
    }

    #[tokio::test]
    async fn test_no_enabled_plugins_leaves_empty_dashboard() {
        let mut hidden = manifest("lan_scanner", 1, "/lan");
        hidden.enabled = false;
        hidden.frontend.widgets = vec![widget("lan-status", "status")];

        for fetched in [vec![], vec![hidden]] {
            let api = FakeApi::new();
            api.respond_manifests(fetched);
            let registry = ManifestRegistry::new(api.clone(), ApiPaths::default());

            let set = registry.load().await;

            let state = registry.state();
            assert!(state.loaded);
            assert!(state.error.is_none());
            assert!(set.is_empty());
            assert!(builtin_text_kinds().overview_widgets(&set).is_empty());

            let labels: Vec<String> = navigation(&set).into_iter().map(|e| e.label).collect();
            assert_eq!(labels, vec!["Dashboard", "Settings"]);
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_renders_same_state() {
        let api = FakeApi::new();
        api.respond_manifests(vec![manifest("a", 1, "/a")]);
        let registry = ManifestRegistry::new(api.clone(), ApiPaths::default());
        registry.load().await;
        let before = registry.state();

        api.respond("/api/plugins", Err(FetchError::Network("offline".into())));
        registry.refresh().await;
        let after = registry.state();
        assert!(after.error.is_some());
        assert!(after.renders_same(&before));

        api.respond_manifests(vec![manifest("a", 1, "/a")]);
        registry.refresh().await;
        assert!(!registry.state().renders_same(&before));
        assert!(!RegistryState::default().renders_same(&before));
    }
}
