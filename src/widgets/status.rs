//! Status widget payload
//!
//! A device summary rendered as three count tiles plus an optional
//! last-scan line.

use serde::Deserialize;
use serde_json::Value;

use super::format::format_timestamp;
use super::registry::{builtin, WidgetError};

/// Payload of a `status` widget
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusSummary {
    pub total_devices: u64,
    pub online_devices: u64,
    pub offline_devices: u64,
    #[serde(default)]
    pub last_scan_at: Option<String>,
    #[serde(default)]
    pub subnets: Vec<String>,
}

/// Visual accent of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileAccent {
    Info,
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTile {
    pub label: &'static str,
    pub value: u64,
    pub accent: TileAccent,
}

impl StatusSummary {
    pub fn decode(value: &Value) -> Result<Self, WidgetError> {
        Self::deserialize(value).map_err(|e| WidgetError::payload(builtin::STATUS, e.to_string()))
    }

    pub fn tiles(&self) -> [StatusTile; 3] {
        [
            StatusTile {
                label: "Total Devices",
                value: self.total_devices,
                accent: TileAccent::Info,
            },
            StatusTile {
                label: "Online",
                value: self.online_devices,
                accent: TileAccent::Good,
            },
            StatusTile {
                label: "Offline",
                value: self.offline_devices,
                accent: TileAccent::Bad,
            },
        ]
    }

    /// `Last scan: ... | Subnets: ...`, only once a scan has happened
    pub fn footer(&self) -> Option<String> {
        self.last_scan_at.as_deref().map(|at| {
            format!(
                "Last scan: {} | Subnets: {}",
                format_timestamp(at),
                self.subnets.join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_and_tiles() {
        let summary = StatusSummary::decode(&json!({
            "total_devices": 12,
            "online_devices": 9,
            "offline_devices": 3,
            "last_scan_at": "2024-05-01T10:00:00",
            "subnets": ["192.168.1.0/24", "10.0.0.0/24"]
        }))
        .unwrap();

        let values: Vec<(&str, u64)> = summary.tiles().iter().map(|t| (t.label, t.value)).collect();
        assert_eq!(values, vec![("Total Devices", 12), ("Online", 9), ("Offline", 3)]);
        assert_eq!(
            summary.footer().as_deref(),
            Some("Last scan: 2024-05-01 10:00:00 | Subnets: 192.168.1.0/24, 10.0.0.0/24")
        );
    }

    #[test]
    fn test_no_footer_before_first_scan() {
        let summary = StatusSummary::decode(&json!({
            "total_devices": 0,
            "online_devices": 0,
            "offline_devices": 0,
            "last_scan_at": null,
            "subnets": []
        }))
        .unwrap();
        assert!(summary.footer().is_none());
    }

    #[test]
    fn test_wrong_shape_is_payload_error() {
        let err = StatusSummary::decode(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, WidgetError::Payload { ref kind, .. } if kind == "status"));
    }
}
