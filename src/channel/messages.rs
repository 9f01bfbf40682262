//! Realtime Message Types
//!
//! Inbound frames are JSON objects `{"event": <topic>, "data": {...}}`, with
//! an optional ISO-8601 `timestamp` the producer may attach. A timestamp of
//! any other shape is ignored rather than rejecting the frame. The channel is
//! receive-only; nothing is ever sent back.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Topic marker that matches every event
pub const WILDCARD_TOPIC: &str = "*";

/// A parsed inbound event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelEvent {
    /// Topic the event was published under
    #[serde(rename = "event")]
    pub topic: String,
    /// Event body
    pub data: Map<String, Value>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub timestamp: Option<String>,
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl ChannelEvent {
    /// Parse a text frame. `None` for anything malformed.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str::<ChannelEvent>(text) {
            Ok(event) if !event.topic.is_empty() => Some(event),
            Ok(_) => None,
            Err(e) => {
                tracing::trace!(error = %e, "Unparseable realtime frame");
                None
            }
        }
    }
}

/// Derive the realtime endpoint URL from an HTTP origin.
///
/// `http://host` becomes `ws://host{path}`, `https://host` becomes
/// `wss://host{path}`.
pub fn ws_url(origin: &str, path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let origin = if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        origin.to_string()
    };
    format!("{}{}", origin, path)
}
