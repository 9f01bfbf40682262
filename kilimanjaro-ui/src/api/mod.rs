//! HTTP API Client
//!
//! gloo-net backed [`ApiClient`](kilimanjaro::ApiClient) for the browser.

pub mod client;

pub use client::BrowserClient;
