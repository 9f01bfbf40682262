//! Navigation Component
//!
//! Sidebar built from the loaded manifests: Dashboard, one entry per
//! plugin in display order, Settings.

use leptos::*;
use leptos_router::*;

use kilimanjaro::manifest::{navigation, Icon};

use crate::state::global::GlobalState;

/// Sidebar navigation
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (open, set_open) = create_signal(false);

    let entries = move || state.plugins.with(|plugins| navigation(&plugins.manifests));

    view! {
        // Mobile toggle
        <button
            class="md:hidden fixed top-4 left-4 z-40 px-3 py-2 bg-gray-800 rounded-lg"
            on:click=move |_| set_open.update(|o| *o = !*o)
        >
            "☰"
        </button>

        <nav class=move || {
            let base = "fixed md:static inset-y-0 left-0 z-30 w-60 bg-gray-800 border-r border-gray-700 \
                        transform transition-transform md:translate-x-0";
            if open.get() {
                format!("{} translate-x-0", base)
            } else {
                format!("{} -translate-x-full", base)
            }
        }>
            // Brand
            <A href="/" class="flex items-center space-x-3 h-16 px-6">
                <span class="text-2xl">"⛰"</span>
                <span class="text-xl font-bold text-white">"Kilimanjaro"</span>
            </A>

            <div class="flex flex-col space-y-1 px-3" on:click=move |_| set_open.set(false)>
                {move || {
                    entries()
                        .into_iter()
                        .map(|entry| view! {
                            <NavLink href=entry.path label=entry.label icon=entry.icon />
                        })
                        .collect_view()
                }}
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(href: String, label: String, icon: Icon) -> impl IntoView {
    view! {
        <A
            href=href
            exact=true
            class="flex items-center space-x-3 px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
            active_class="bg-gray-700 text-white"
        >
            <span>{icon_glyph(icon)}</span>
            <span>{label}</span>
        </A>
    }
}

/// Glyph for a manifest icon name
pub fn icon_glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Wifi => "📶",
        Icon::Box => "📦",
        Icon::LayoutDashboard => "📊",
        Icon::Settings => "⚙",
    }
}
