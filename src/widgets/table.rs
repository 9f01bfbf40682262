//! Table widget payload
//!
//! Rows are JSON objects; columns come from the widget config. Sorting is
//! client-side and never triggers a re-fetch.

use serde_json::{Map, Value};

use super::format::format_timestamp;
use super::registry::{builtin, WidgetError};
use crate::api::json_kind;

pub type Row = Map<String, Value>;

/// Text shown for missing or null cells
pub const EMPTY_CELL: &str = "-";

/// Text shown for a table without rows
pub const NO_DATA: &str = "No data";

/// Viewport width below which tables render as stacked cards
pub const MOBILE_MAX_WIDTH: u32 = 640;

/// Viewport width from which the desktop layout applies
pub const DESKTOP_MIN_WIDTH: u32 = 1024;

/// Decode a table payload: an array of row objects
pub fn decode_rows(value: &Value) -> Result<Vec<Row>, WidgetError> {
    let items = value.as_array().ok_or_else(|| {
        WidgetError::payload(
            builtin::TABLE,
            format!("expected an array of rows, got {}", json_kind(value)),
        )
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(row) => Ok(row.clone()),
            other => Err(WidgetError::payload(
                builtin::TABLE,
                format!("row {} is {}", i, json_kind(other)),
            )),
        })
        .collect()
}

/// Single-key sort state of one table instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    key: Option<String>,
    ascending: bool,
}

impl SortState {
    pub fn by(key: impl Into<String>, ascending: bool) -> Self {
        Self {
            key: Some(key.into()),
            ascending,
        }
    }

    /// Header click: same key flips direction, a new key sorts ascending
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.ascending = !self.ascending;
        } else {
            self.key = Some(key.to_string());
            self.ascending = true;
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    /// Header arrow for `column`, if it is the sort key
    pub fn indicator(&self, column: &str) -> Option<&'static str> {
        match self.key.as_deref() {
            Some(key) if key == column => Some(if self.ascending { "▲" } else { "▼" }),
            _ => None,
        }
    }
}

/// Rows in display order. Ties keep payload order.
pub fn sort_rows<'a>(rows: &'a [Row], sort: &SortState) -> Vec<&'a Row> {
    let mut sorted: Vec<&Row> = rows.iter().collect();
    if let Some(key) = sort.key() {
        sorted.sort_by(|a, b| {
            let (a, b) = (sort_text(a.get(key)), sort_text(b.get(key)));
            if sort.ascending() {
                a.cmp(&b)
            } else {
                b.cmp(&a)
            }
        });
    }
    sorted
}

fn sort_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Tone of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Online,
    Offline,
    Scanning,
    Unknown,
}

impl BadgeTone {
    pub fn from_status(status: &str) -> Self {
        match status {
            "online" => Self::Online,
            "offline" => Self::Offline,
            "scanning" => Self::Scanning,
            _ => Self::Unknown,
        }
    }
}

/// A formatted table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Badge { label: String, tone: BadgeTone },
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => f.write_str(EMPTY_CELL),
            Cell::Text(text) => f.write_str(text),
            Cell::Badge { label, .. } => f.write_str(label),
        }
    }
}

/// Format the value of column `key`
pub fn format_cell(key: &str, value: Option<&Value>) -> Cell {
    let text = match value {
        None | Some(Value::Null) => return Cell::Empty,
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    match key {
        "status" => Cell::Badge {
            tone: BadgeTone::from_status(&text),
            label: text,
        },
        "first_seen" | "last_seen" => Cell::Text(format_timestamp(&text)),
        _ => Cell::Text(text),
    }
}

/// Responsive layout class of the browser window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Mobile,
    Tablet,
    Desktop,
}

impl Viewport {
    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_MAX_WIDTH {
            Self::Mobile
        } else if width < DESKTOP_MIN_WIDTH {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    /// Tables collapse into one card per row on small screens
    pub fn uses_cards(self) -> bool {
        self == Self::Mobile
    }
}
