//! Chart widget payload
//!
//! A time series: an array of points, each with a `timestamp` and any number
//! of numeric fields. Every numeric field seen on any point becomes a series.

use serde_json::Value;

use super::format::{format_time_of_day, humanize_key};
use super::registry::{builtin, WidgetError};
use crate::api::json_kind;
use crate::manifest::ChartType;

/// Series colours, assigned in series order
pub const SERIES_COLORS: [&str; 6] = [
    "#22c55e", // Green
    "#ef4444", // Red
    "#3b82f6", // Blue
    "#FF9800", // Orange
    "#9C27B0", // Purple
    "#00BCD4", // Cyan
];

/// Shown instead of a chart without points
pub const EMPTY_CHART: &str = "No history data yet. Waiting for scans...";

/// Fields that are never plotted
const NON_SERIES_FIELDS: [&str; 2] = ["timestamp", "id"];

/// Series that always come first, with their display labels
const KNOWN_SERIES: [(&str, &str); 3] = [
    ("online_count", "Online"),
    ("offline_count", "Offline"),
    ("total_count", "Total"),
];

/// One plotted series
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: String,
    pub label: String,
    pub color: &'static str,
    /// One value per point; `None` where the point lacks the field
    pub values: Vec<Option<f64>>,
}

/// Decoded chart payload
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub chart_type: ChartType,
    /// X-axis label per point
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartData {
    pub fn decode(value: &Value, chart_type: ChartType) -> Result<Self, WidgetError> {
        let points = value.as_array().ok_or_else(|| {
            WidgetError::payload(
                builtin::CHART,
                format!("expected an array of points, got {}", json_kind(value)),
            )
        })?;

        let mut labels = Vec::with_capacity(points.len());
        let mut keys: Vec<&str> = Vec::new();
        for (i, point) in points.iter().enumerate() {
            let fields = point.as_object().ok_or_else(|| {
                WidgetError::payload(builtin::CHART, format!("point {} is {}", i, json_kind(point)))
            })?;

            labels.push(
                fields
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .map(format_time_of_day)
                    .unwrap_or_default(),
            );
            for (key, value) in fields {
                if value.is_number()
                    && !NON_SERIES_FIELDS.contains(&key.as_str())
                    && !keys.contains(&key.as_str())
                {
                    keys.push(key.as_str());
                }
            }
        }

        keys.sort_by_key(|key| {
            KNOWN_SERIES
                .iter()
                .position(|(known, _)| known == key)
                .unwrap_or(KNOWN_SERIES.len())
        });

        let series = keys
            .iter()
            .enumerate()
            .map(|(i, key)| Series {
                key: key.to_string(),
                label: series_label(key),
                color: SERIES_COLORS[i % SERIES_COLORS.len()],
                values: points
                    .iter()
                    .map(|p| p.get(*key).and_then(Value::as_f64))
                    .collect(),
            })
            .collect();

        Ok(Self {
            chart_type,
            labels,
            series,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.is_empty()
    }

    /// Largest plotted value (0 when nothing is plotted)
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .fold(0.0_f64, |max, v| max.max(*v))
    }
}

fn series_label(key: &str) -> String {
    KNOWN_SERIES
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| humanize_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_points() {
        let chart = ChartData::decode(
            &json!([
                {"timestamp": "2024-05-01T10:00:00", "total_count": 5, "online_count": 4, "offline_count": 1},
                {"timestamp": "2024-05-01T10:05:00", "total_count": 6, "online_count": 6, "offline_count": 0},
            ]),
            ChartType::Area,
        )
        .unwrap();

        assert_eq!(chart.labels, vec!["10:00", "10:05"]);
        let labels: Vec<&str> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Online", "Offline", "Total"]);
        assert_eq!(chart.series[0].color, SERIES_COLORS[0]);
        assert_eq!(chart.series[2].values, vec![Some(5.0), Some(6.0)]);
        assert_eq!(chart.max_value(), 6.0);
    }

    #[test]
    fn test_generic_series_discovered() {
        let chart = ChartData::decode(
            &json!([
                {"id": 1, "timestamp": "2024-05-01T10:00:00Z", "latency_ms": 12.5, "host": "a"},
                {"id": 2, "timestamp": "2024-05-01T10:01:00Z", "jitter_ms": 1.5},
            ]),
            ChartType::Line,
        )
        .unwrap();

        let keys: Vec<&str> = chart.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["latency_ms", "jitter_ms"]);
        assert_eq!(chart.series[0].label, "Latency Ms");
        assert_eq!(chart.series[1].values, vec![None, Some(1.5)]);
    }

    #[test]
    fn test_empty_history() {
        let chart = ChartData::decode(&json!([]), ChartType::Bar).unwrap();
        assert!(chart.is_empty());
        assert_eq!(chart.max_value(), 0.0);
    }

    #[test]
    fn test_wrong_shape() {
        assert!(ChartData::decode(&json!({"points": []}), ChartType::Line).is_err());
        assert!(ChartData::decode(&json!(["x"]), ChartType::Line).is_err());
    }
}
