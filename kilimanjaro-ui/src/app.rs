//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use kilimanjaro::channel::ConnectionState;

use crate::components::{Sidebar, Toast};
use crate::config::DashboardConfig;
use crate::pages::{Dashboard, PluginRoute, Settings};
use crate::state::global::{provide_global_state, GlobalState};

/// Root application component
#[component]
pub fn App(config: DashboardConfig) -> impl IntoView {
    // Provide global state to all components; opens the realtime channel
    // and starts loading manifests
    provide_global_state(config);

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white flex">
                <Sidebar />

                <div class="flex-1 flex flex-col min-w-0">
                    // Main content area
                    <main class="flex-1 container mx-auto px-4 py-8 pb-24">
                        <Routes>
                            <Route path="/" view=Dashboard />
                            <Route path="/settings" view=Settings />
                            // Plugin routes are only known at runtime
                            <Route path="/*any" view=PluginRoute />
                        </Routes>
                    </main>

                    // Footer with connection status
                    <Footer />
                </div>

                // Toast notifications
                <Toast />
            </div>
        </Router>
    }
}

/// Footer component showing connection status
#[component]
fn Footer() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let connection = state.connection;
    let plugins = state.plugins;

    view! {
        <footer class="fixed bottom-0 left-0 right-0 md:left-60 bg-gray-800 border-t border-gray-700 py-3 px-4">
            <div class="container mx-auto flex items-center justify-between text-sm">
                // Realtime status
                <div class="flex items-center space-x-2">
                    {move || match connection.get() {
                        ConnectionState::Open => view! {
                            <span class="flex items-center space-x-1 text-green-400">
                                <span class="w-2 h-2 bg-green-400 rounded-full pulse" />
                                <span>"Live"</span>
                            </span>
                        }.into_view(),
                        ConnectionState::Connecting => view! {
                            <span class="flex items-center space-x-1 text-yellow-400">
                                <span class="w-2 h-2 bg-yellow-400 rounded-full" />
                                <span>"Connecting..."</span>
                            </span>
                        }.into_view(),
                        ConnectionState::Closed => view! {
                            <span class="flex items-center space-x-1 text-red-400">
                                <span class="w-2 h-2 bg-red-400 rounded-full" />
                                <span>"Disconnected"</span>
                            </span>
                        }.into_view(),
                    }}
                </div>

                // Plugin count
                <div class="text-gray-400">
                    {move || plugins.with(|p| format!("{} plugins", p.manifests.len()))}
                </div>
            </div>
        </footer>
    }
}
