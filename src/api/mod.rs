//! Backend REST API
//!
//! - [`ApiClient`]: the host seam for JSON-over-HTTP
//! - [`ApiPaths`]: where manifests, info and widget data live
//! - `HttpClient` (native feature): reqwest implementation

mod client;
mod error;
#[cfg(feature = "native")]
mod http;

pub use client::{
    action_path, display_scalar, fetch_info, fetch_manifests, trigger_scan, ApiClient, ApiPaths,
    DEFAULT_API_ROOT,
};
pub(crate) use client::json_kind;
pub use error::FetchError;
#[cfg(feature = "native")]
pub use http::HttpClient;
