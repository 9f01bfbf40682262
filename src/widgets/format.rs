//! Display formatting shared by the widget decoders

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an ISO-8601 timestamp, with or without an offset (naive values are UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Full date and time, or the raw text when it does not parse
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Hour and minute only, for chart axes
pub fn format_time_of_day(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `online_count` -> `Online Count`
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
