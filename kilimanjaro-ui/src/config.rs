//! Dashboard configuration
//!
//! The serving host can inject settings through `<meta>` tags in the HTML,
//! e.g. `<meta name="kilimanjaro:api-url" content="http://pi.local:8000">`.

use std::time::Duration;

use kilimanjaro::api::DEFAULT_API_ROOT;
use kilimanjaro::channel::{ws_url, DEFAULT_RECONNECT_DELAY};
use wasm_bindgen::JsCast;

/// Realtime endpoint path on the backend origin
pub const DEFAULT_WS_PATH: &str = "/ws";

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Backend origin (e.g. "http://localhost:8000")
    pub api_url: String,
    /// Root every REST path hangs off
    pub api_root: String,
    /// Realtime endpoint path
    pub ws_path: String,
    /// Delay before re-opening a lost realtime connection
    pub reconnect_delay: Duration,
    /// Console log level
    pub log_level: tracing::Level,
}

impl DashboardConfig {
    /// Load configuration from the page (priority order):
    /// 1. `<meta name="kilimanjaro:...">` tags (server-injected)
    /// 2. `window.__KILIMANJARO_CONFIG__` object (JavaScript injection)
    /// 3. Current window origin and built-in defaults
    pub fn load() -> Self {
        let document = web_sys::window().and_then(|w| w.document());
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_else(|| "http://localhost:8000".to_string());

        Self::from_lookup(&origin, |key| {
            document
                .as_ref()
                .and_then(|doc| get_meta_content(doc, &format!("kilimanjaro:{}", key)))
                .filter(|value| !value.is_empty())
                .or_else(|| get_js_config(&key.replace('-', "_")))
        })
    }

    /// Build a config from a `key -> value` source, falling back to `origin`
    pub fn from_lookup(origin: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let reconnect_delay = lookup("reconnect-ms")
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RECONNECT_DELAY);

        let log_level = lookup("log-level")
            .and_then(|level| level.parse().ok())
            .unwrap_or(tracing::Level::INFO);

        Self {
            api_url: lookup("api-url")
                .unwrap_or_else(|| origin.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_root: lookup("api-root").unwrap_or_else(|| DEFAULT_API_ROOT.to_string()),
            ws_path: lookup("ws-path").unwrap_or_else(|| DEFAULT_WS_PATH.to_string()),
            reconnect_delay,
            log_level,
        }
    }

    /// Realtime endpoint URL derived from the backend origin
    pub fn ws_url(&self) -> String {
        ws_url(&self.api_url, &self.ws_path)
    }
}

/// Get content from a <meta name="..."> tag
fn get_meta_content(document: &web_sys::Document, name: &str) -> Option<String> {
    let selector = format!("meta[name=\"{}\"]", name);
    document
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web_sys::HtmlMetaElement>().ok())
        .map(|meta| meta.content())
}

/// Get a value from window.__KILIMANJARO_CONFIG__
fn get_js_config(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let config = js_sys::Reflect::get(&window, &"__KILIMANJARO_CONFIG__".into()).ok()?;

    if config.is_undefined() || config.is_null() {
        return None;
    }

    let value = js_sys::Reflect::get(&config, &key.into()).ok()?;
    value.as_string().or_else(|| value.as_f64().map(|n| n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_follow_origin() {
        let config = DashboardConfig::from_lookup("https://lan.example", |_| None);
        assert_eq!(config.api_url, "https://lan.example");
        assert_eq!(config.api_root, "/api");
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.ws_url(), "wss://lan.example/ws");
    }

    #[test]
    fn test_injected_values() {
        let injected: HashMap<&str, &str> = [
            ("api-url", "http://pi.local:8000/"),
            ("reconnect-ms", "500"),
            ("log-level", "debug"),
        ]
        .into_iter()
        .collect();

        let config = DashboardConfig::from_lookup("http://ignored", |key| {
            injected.get(key).map(|v| v.to_string())
        });
        assert_eq!(config.api_url, "http://pi.local:8000");
        assert_eq!(config.ws_url(), "ws://pi.local:8000/ws");
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_delay_falls_back() {
        let config = DashboardConfig::from_lookup("http://localhost:8000", |key| {
            (key == "reconnect-ms").then(|| "soon".to_string())
        });
        assert_eq!(config.reconnect_delay, DEFAULT_RECONNECT_DELAY);
    }
}
