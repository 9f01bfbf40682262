//! Manifest Types
//!
//! The declarative description of pluggable dashboard sections, as served by
//! `GET /api/plugins`.

use serde::{Deserialize, Serialize};

/// One pluggable dashboard section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin key
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base path of this plugin's REST actions
    pub api_prefix: String,
    pub frontend: PluginFrontend,
}

fn default_enabled() -> bool {
    true
}

/// UI-facing metadata of a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginFrontend {
    #[serde(default)]
    pub icon: String,
    pub sidebar_label: String,
    #[serde(default)]
    pub sidebar_order: i64,
    pub route_path: String,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

impl PluginFrontend {
    /// The icon this section is shown with
    pub fn icon(&self) -> Icon {
        Icon::resolve(&self.icon)
    }
}

/// One live widget instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Render key, unique within the owning manifest
    pub widget_id: String,
    /// Kind tag resolved through the widget registry
    pub widget_type: String,
    pub title: String,
    /// Path yielding the widget's data
    pub data_endpoint: String,
    /// Topic that triggers a re-fetch, or `*` for every event
    pub refresh_event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<WidgetColumn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
}

impl WidgetConfig {
    /// Table columns, empty when none are declared
    pub fn columns(&self) -> &[WidgetColumn] {
        self.columns.as_deref().unwrap_or(&[])
    }

    /// Chart flavour, line unless declared otherwise
    pub fn chart_type(&self) -> ChartType {
        self.chart_type.unwrap_or_default()
    }
}

/// Table column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetColumn {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
}

/// Chart flavour. Unknown values fall back to a line chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Area,
}

impl From<String> for ChartType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "bar" => Self::Bar,
            "area" => Self::Area,
            _ => Self::Line,
        }
    }
}

/// Fixed icon set manifests may refer to by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Wifi,
    Box,
    LayoutDashboard,
    Settings,
}

impl Icon {
    /// Resolve a symbolic icon name, falling back to [`Icon::Box`]
    pub fn resolve(name: &str) -> Self {
        match name {
            "Wifi" => Self::Wifi,
            "LayoutDashboard" => Self::LayoutDashboard,
            "Settings" => Self::Settings,
            _ => Self::Box,
        }
    }

    /// Symbolic name of the icon
    pub fn name(self) -> &'static str {
        match self {
            Self::Wifi => "Wifi",
            Self::Box => "Box",
            Self::LayoutDashboard => "LayoutDashboard",
            Self::Settings => "Settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manifest_deserialize() {
        let manifest: PluginManifest = serde_json::from_value(json!({
            "name": "lan_scanner",
            "display_name": "LAN Scanner",
            "description": "Discover devices",
            "version": "1.0.0",
            "api_prefix": "/api/plugins/lan_scanner",
            "frontend": {
                "icon": "Wifi",
                "sidebar_label": "LAN Scanner",
                "sidebar_order": 10,
                "route_path": "/lan-scanner",
                "widgets": [{
                    "widget_id": "devices",
                    "widget_type": "table",
                    "title": "Devices",
                    "data_endpoint": "/api/plugins/lan_scanner/devices",
                    "refresh_event": "lan_scanner:scan_complete",
                    "columns": [{"key": "ip", "label": "IP", "sortable": true}]
                }]
            }
        }))
        .unwrap();

        assert!(manifest.enabled);
        assert_eq!(manifest.frontend.icon(), Icon::Wifi);
        let widget = &manifest.frontend.widgets[0];
        assert_eq!(widget.columns().len(), 1);
        assert!(widget.columns()[0].sortable);
        assert_eq!(widget.chart_type(), ChartType::Line);
    }

    #[test]
    fn test_chart_type_lenient() {
        let parse = |v: &str| -> ChartType { serde_json::from_value(json!(v)).unwrap() };
        assert_eq!(parse("bar"), ChartType::Bar);
        assert_eq!(parse("area"), ChartType::Area);
        assert_eq!(parse("pie"), ChartType::Line);
    }

    #[test]
    fn test_icon_fallback() {
        assert_eq!(Icon::resolve("Wifi"), Icon::Wifi);
        assert_eq!(Icon::resolve("Rocket"), Icon::Box);
        assert_eq!(Icon::resolve(""), Icon::Box);
    }
}
