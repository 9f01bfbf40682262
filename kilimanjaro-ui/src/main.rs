//! Kilimanjaro Dashboard
//!
//! Browser front end for a manifest-driven plugin dashboard, built with
//! Leptos (WASM).
//!
//! # Features
//!
//! - Sidebar and routes generated from server-declared plugin manifests
//! - Status, table and chart widgets refreshed over one shared WebSocket
//! - Per-widget fault containment
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. The `kilimanjaro` crate supplies the engine; this crate
//! supplies the browser host (fetch client, WebSocket transport, timers)
//! and the views.

use leptos::*;

mod api;
mod app;
mod components;
mod config;
mod logging;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    let config = config::DashboardConfig::load();
    logging::init_logging(config.log_level);
    tracing::info!(api = %config.api_url, "Starting dashboard");

    // Mount the app to the document body
    mount_to_body(move || view! { <app::App config=config /> });
}
