//! Manifest-driven navigation
//!
//! Navigation entries and route resolution derive solely from the loaded
//! manifest set; only the Dashboard and Settings routes are built in.

use super::registry::{normalize_path, ManifestSet};
use super::types::{Icon, PluginManifest};

/// The default route (overview dashboard)
pub const DEFAULT_ROUTE: &str = "/";

/// The built-in settings route
pub const SETTINGS_ROUTE: &str = "/settings";

/// One sidebar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub label: String,
    pub path: String,
    pub icon: Icon,
}

/// Where a path leads
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route<'a> {
    Dashboard,
    Settings,
    Plugin(&'a PluginManifest),
    NotFound,
}

/// Sidebar entries: Dashboard, one per manifest in display order, Settings
pub fn navigation(set: &ManifestSet) -> Vec<NavEntry> {
    let mut entries = Vec::with_capacity(set.len() + 2);
    entries.push(NavEntry {
        label: "Dashboard".to_string(),
        path: DEFAULT_ROUTE.to_string(),
        icon: Icon::LayoutDashboard,
    });
    entries.extend(set.iter().map(|m| NavEntry {
        label: m.frontend.sidebar_label.clone(),
        path: m.frontend.route_path.clone(),
        icon: m.frontend.icon(),
    }));
    entries.push(NavEntry {
        label: "Settings".to_string(),
        path: SETTINGS_ROUTE.to_string(),
        icon: Icon::Settings,
    });
    entries
}

impl ManifestSet {
    /// Resolve a URL path against the built-in routes and the manifests
    pub fn route(&self, path: &str) -> Route<'_> {
        let path = normalize_path(path);
        if path.is_empty() || path == DEFAULT_ROUTE {
            return Route::Dashboard;
        }
        if path == SETTINGS_ROUTE {
            return Route::Settings;
        }
        self.iter()
            .find(|m| normalize_path(&m.frontend.route_path) == path)
            .map(Route::Plugin)
            .unwrap_or(Route::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::manifest;

    #[test]
    fn test_navigation_without_plugins() {
        let nav = navigation(&ManifestSet::default());
        let labels: Vec<&str> = nav.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Dashboard", "Settings"]);
    }

    #[test]
    fn test_navigation_follows_sidebar_order() {
        let mut lan = manifest("lan_scanner", 2, "/lan");
        lan.frontend.icon = "Wifi".to_string();
        let set = ManifestSet::from_fetched(vec![lan, manifest("backup", 1, "/backup")]).unwrap();

        let nav = navigation(&set);
        let paths: Vec<&str> = nav.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/backup", "/lan", "/settings"]);
        assert_eq!(nav[1].icon, Icon::Box);
        assert_eq!(nav[2].icon, Icon::Wifi);
    }

    #[test]
    fn test_route_resolution() {
        let set = ManifestSet::from_fetched(vec![manifest("lan_scanner", 1, "/lan")]).unwrap();

        assert_eq!(set.route("/"), Route::Dashboard);
        assert_eq!(set.route("/settings/"), Route::Settings);
        assert!(matches!(set.route("/lan"), Route::Plugin(m) if m.name == "lan_scanner"));
        assert!(matches!(set.route("/lan/"), Route::Plugin(_)));
        assert_eq!(set.route("/nowhere"), Route::NotFound);
    }
}
