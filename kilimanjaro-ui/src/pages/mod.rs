//! Pages
//!
//! Top-level page components for each route.

pub mod dashboard;
pub mod not_found;
pub mod plugin;
pub mod settings;

pub use dashboard::Dashboard;
pub use not_found::NotFound;
pub use plugin::PluginRoute;
pub use settings::Settings;
