//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod chart;
pub mod loading;
pub mod nav;
pub mod status;
pub mod table;
pub mod toast;
pub mod widget;

pub use loading::{InlineLoading, Loading};
pub use nav::Sidebar;
pub use toast::Toast;
pub use widget::WidgetHost;
