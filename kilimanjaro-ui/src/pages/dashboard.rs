//! Dashboard Page
//!
//! Overview of every plugin: the widgets whose kind belongs on the
//! overview, in manifest display order.

use leptos::*;

use kilimanjaro::manifest::WidgetConfig;
use kilimanjaro::widgets::{NO_PLUGINS, NO_PLUGINS_HINT};

use crate::components::{Loading, WidgetHost};
use crate::state::global::GlobalState;

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let views = state.views.clone();
    let plugins = state.plugins;

    view! {
        <div class="space-y-8">
            // Page header
            <div>
                <h1 class="text-3xl font-bold">"Dashboard"</h1>
                <p class="text-gray-400 mt-1">"Overview of all plugins"</p>
            </div>

            {move || {
                plugins.with(|plugins| {
                    if !plugins.loaded {
                        return view! { <Loading /> }.into_view();
                    }

                    let widgets: Vec<WidgetConfig> = views
                        .overview_widgets(&plugins.manifests)
                        .into_iter()
                        .map(|(_, widget)| widget.clone())
                        .collect();

                    if widgets.is_empty() {
                        return view! { <EmptyState /> }.into_view();
                    }

                    view! {
                        <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-6">
                            {widgets
                                .into_iter()
                                .map(|config| view! { <WidgetHost config=config /> })
                                .collect_view()}
                        </div>
                    }
                    .into_view()
                })
            }}
        </div>
    }
}

/// Shown when no manifest contributes an overview widget
#[component]
fn EmptyState() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[40vh] text-center">
            <div class="text-6xl mb-4">"📦"</div>
            <h2 class="text-2xl font-bold mb-2">{NO_PLUGINS}</h2>
            <p class="text-gray-400">{NO_PLUGINS_HINT}</p>
        </div>
    }
}
