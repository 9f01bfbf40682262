//! # Kilimanjaro
//!
//! Manifest-driven plugin dashboard engine. The backend serves a list of
//! plugin manifests; each describes a navigable section and a set of
//! live-updating widgets. This crate turns those manifests into routes,
//! navigation and bound widget instances, and keeps one self-healing realtime
//! connection that tells widgets when to refresh.
//!
//! ## Modules
//!
//! - [`channel`]: shared realtime connection with topic fan-out
//! - [`manifest`]: manifest model, registry and routing
//! - [`widgets`]: kind dispatch, payload decoding and fault containment
//! - [`binding`]: live-bound widget instances
//! - [`api`]: backend REST client seam
//!
//! The engine is host-independent: the transport, timer, HTTP client and
//! spawner are traits supplied by the host. The `native` feature adds a
//! reqwest client, configuration, logging setup and the `kilimanjaro`
//! command-line client; the browser host lives in `kilimanjaro-ui`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kilimanjaro::api::{ApiPaths, HttpClient};
//! use kilimanjaro::manifest::{navigation, ManifestRegistry};
//! use std::rc::Rc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Rc::new(HttpClient::new("http://localhost:8000", None)?);
//!     let registry = ManifestRegistry::new(client, ApiPaths::default());
//!
//!     let manifests = registry.load().await;
//!     for entry in navigation(&manifests) {
//!         println!("{} -> {}", entry.label, entry.path);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod binding;
pub mod channel;
pub mod manifest;
pub mod widgets;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod logging;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use api::{ApiClient, ApiPaths, FetchError};
pub use binding::{LiveBinding, LiveWidget, Spawner, WidgetSnapshot};
pub use channel::{ChannelConfig, ChannelEvent, ConnectionState, RealtimeChannel, Subscription};
pub use manifest::{ManifestRegistry, ManifestSet, PluginManifest, RegistryState, WidgetConfig};
pub use widgets::{KindRegistry, WidgetError, WidgetKind};
