//! Plugin Manifests
//!
//! - [`types`]: the manifest data model
//! - [`registry`]: loading, validation and ordering
//! - [`routes`]: navigation and route resolution

pub mod registry;
pub mod routes;
pub mod types;

pub use registry::{ManifestError, ManifestRegistry, ManifestSet, RegistryState};
pub use routes::{navigation, NavEntry, Route, DEFAULT_ROUTE, SETTINGS_ROUTE};
pub use types::{ChartType, Icon, PluginFrontend, PluginManifest, WidgetColumn, WidgetConfig};
