//! Plugin Page
//!
//! One page per manifest, resolved from the current path at render time.

use leptos::*;
use leptos_router::*;

use kilimanjaro::manifest::{PluginManifest, Route};

use crate::components::{Loading, WidgetHost};
use crate::pages::not_found::NotFound;
use crate::state::global::GlobalState;

/// Catch-all route: a plugin page or 404
#[component]
pub fn PluginRoute() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let location = use_location();
    let plugins = state.plugins;

    move || {
        let path = location.pathname.get();
        plugins.with(|plugins| {
            if !plugins.loaded {
                return view! { <Loading /> }.into_view();
            }
            match plugins.manifests.route(&path) {
                Route::Plugin(manifest) => {
                    view! { <PluginPage manifest=manifest.clone() /> }.into_view()
                }
                _ => view! { <NotFound /> }.into_view(),
            }
        })
    }
}

/// Widgets of one plugin with its manual scan action
#[component]
fn PluginPage(manifest: PluginManifest) -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let scan_target = manifest.clone();
    let on_scan = move |_| state.scan(scan_target.clone());

    view! {
        <div class="space-y-8">
            // Page header
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">{manifest.display_name.clone()}</h1>
                    <p class="text-gray-400 mt-1">{manifest.description.clone()}</p>
                </div>

                <button
                    on:click=on_scan
                    class="px-4 py-2 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
                >
                    "Scan Now"
                </button>
            </div>

            <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-6">
                {manifest
                    .frontend
                    .widgets
                    .iter()
                    .cloned()
                    .map(|config| view! { <WidgetHost config=config /> })
                    .collect_view()}
            </div>
        </div>
    }
}
