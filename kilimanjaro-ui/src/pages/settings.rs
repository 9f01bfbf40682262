//! Settings Page
//!
//! Backend system info, connection status and loaded plugins.

use leptos::*;

use kilimanjaro::channel::ConnectionState;

use crate::components::InlineLoading;
use crate::state::global::GlobalState;

/// Settings page component
#[component]
pub fn Settings() -> impl IntoView {
    view! {
        <div class="space-y-8">
            // Header
            <div>
                <h1 class="text-3xl font-bold">"Settings"</h1>
                <p class="text-gray-400 mt-1">"System information and plugin status"</p>
            </div>

            <SystemInfo />
            <ConnectionSettings />
            <PluginList />
        </div>
    }
}

/// Key/value list from the backend's info endpoint
#[component]
fn SystemInfo() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let info = create_local_resource(
        || (),
        move |_| {
            let state = state.clone();
            async move { state.fetch_info().await }
        },
    );

    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"System Info"</h2>
            {move || match info.get() {
                None => view! { <p class="text-gray-400">"Loading..."</p> }.into_view(),
                Some(Err(message)) => view! {
                    <p class="text-red-400">{format!("Failed to load system info: {}", message)}</p>
                }
                .into_view(),
                Some(Ok(pairs)) => view! {
                    <dl class="grid grid-cols-1 sm:grid-cols-2 gap-x-6 gap-y-2 text-sm">
                        {pairs
                            .into_iter()
                            .map(|(key, value)| view! {
                                <dt class="text-gray-400">{key}</dt>
                                <dd class="font-mono">{value}</dd>
                            })
                            .collect_view()}
                    </dl>
                }
                .into_view(),
            }}
        </section>
    }
}

/// Backend endpoints and realtime status
#[component]
fn ConnectionSettings() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let connection = state.connection;

    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Connection"</h2>
            <div class="space-y-2 text-sm">
                <div class="flex items-center space-x-2">
                    <span class="text-gray-400">"API:"</span>
                    <span class="font-mono">{state.config.api_url.clone()}</span>
                </div>
                <div class="flex items-center space-x-2">
                    <span class="text-gray-400">"Realtime:"</span>
                    <span class="font-mono">{state.config.ws_url()}</span>
                </div>
                <div class="flex items-center space-x-2">
                    <span class="text-gray-400">"Status:"</span>
                    {move || match connection.get() {
                        ConnectionState::Open => view! {
                            <span class="text-green-400">"🟢 Connected"</span>
                        }.into_view(),
                        ConnectionState::Connecting => view! {
                            <span class="text-yellow-400">"🟡 Connecting"</span>
                        }.into_view(),
                        ConnectionState::Closed => view! {
                            <span class="text-red-400">"🔴 Disconnected"</span>
                        }.into_view(),
                    }}
                </div>
            </div>
        </section>
    }
}

/// Loaded manifests with a reload action
#[component]
fn PluginList() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let plugins = state.plugins;

    let state_for_reload = state.clone();
    let reload = move |_| state_for_reload.reload_plugins();

    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <div class="flex items-center justify-between mb-4">
                <h2 class="text-xl font-semibold">"Plugins"</h2>
                <button
                    on:click=reload
                    class="px-4 py-2 bg-gray-600 hover:bg-gray-500 rounded-lg text-sm font-medium transition-colors"
                >
                    "Reload"
                </button>
            </div>

            {move || plugins.with(|plugins| {
                if !plugins.loaded {
                    return view! { <InlineLoading /> }.into_view();
                }
                if plugins.manifests.is_empty() {
                    return view! { <p class="text-gray-400">"No plugins loaded"</p> }.into_view();
                }
                plugins
                    .manifests
                    .iter()
                    .map(|manifest| view! {
                        <div class="flex items-center justify-between py-2 border-t border-gray-700 text-sm">
                            <span>{manifest.display_name.clone()}</span>
                            <span class="text-gray-400 font-mono">
                                {format!("v{} · {}", manifest.version, manifest.frontend.route_path)}
                            </span>
                        </div>
                    })
                    .collect_view()
            })}
        </section>
    }
}
