//! Global Application State
//!
//! Reactive state shared by every component: the manifest registry, the
//! realtime connection status and the viewport class.

use futures_util::future::LocalBoxFuture;
use leptos::*;
use std::rc::Rc;

use kilimanjaro::api::{trigger_scan, ApiClient, ApiPaths};
use kilimanjaro::channel::{ConnectionState, RealtimeChannel};
use kilimanjaro::manifest::{ManifestRegistry, PluginManifest, RegistryState, WidgetConfig};
use kilimanjaro::widgets::{KindRegistry, Viewport};
use kilimanjaro::{LiveWidget, Spawner};

use super::realtime::init_realtime;
use crate::api::BrowserClient;
use crate::components::widget::{builtin_views, WidgetView};
use crate::config::DashboardConfig;

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    pub config: DashboardConfig,
    /// Current manifest set plus load status
    pub plugins: RwSignal<RegistryState>,
    /// Realtime connection status
    pub connection: RwSignal<ConnectionState>,
    /// Responsive layout class of the window
    pub viewport: RwSignal<Viewport>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
    /// Widget kind -> view strategy
    pub views: Rc<KindRegistry<dyn WidgetView>>,
    client: Rc<dyn ApiClient>,
    paths: ApiPaths,
    registry: Rc<ManifestRegistry>,
    channel: RealtimeChannel,
}

/// Provide global state to the component tree and start the session:
/// open the realtime channel and load the manifests.
pub fn provide_global_state(config: DashboardConfig) {
    let client: Rc<dyn ApiClient> = Rc::new(BrowserClient::new(&config.api_url));
    let paths = ApiPaths::new(&config.api_root);
    let registry = Rc::new(ManifestRegistry::new(Rc::clone(&client), paths.clone()));

    let channel = init_realtime(&config.ws_url(), config.reconnect_delay);
    let connection = create_rw_signal(channel.state());
    channel.on_state_change(move |next| connection.set(next));

    let viewport = create_rw_signal(current_viewport());
    // Lives as long as the app
    let _ = window_event_listener(ev::resize, move |_| {
        let next = current_viewport();
        if viewport.get_untracked() != next {
            viewport.set(next);
        }
    });

    let state = GlobalState {
        config,
        plugins: create_rw_signal(RegistryState::default()),
        connection,
        viewport,
        error: create_rw_signal(None),
        success: create_rw_signal(None),
        views: Rc::new(builtin_views()),
        client,
        paths,
        registry,
        channel,
    };
    state.reload_plugins();

    provide_context(state);
}

impl GlobalState {
    /// Re-fetch the manifest list; on failure the previous set stays
    pub fn reload_plugins(&self) {
        let registry = Rc::clone(&self.registry);
        let state = self.clone();
        spawn_local(async move {
            registry.load().await;
            let loaded = registry.state();
            if let Some(message) = &loaded.error {
                state.show_error(&format!("Failed to load plugins: {}", message));
            }
            // A failed reload keeps the same set; leave mounted widgets alone
            if !state.plugins.with_untracked(|current| current.renders_same(&loaded)) {
                state.plugins.set(loaded);
            }
        });
    }

    /// Bind a widget instance to its data endpoint and refresh topic
    pub fn mount_widget(&self, config: WidgetConfig) -> LiveWidget {
        LiveWidget::mount(
            config,
            &self.paths,
            Rc::clone(&self.client),
            &self.channel,
            spawner(),
        )
    }

    /// Fire the plugin's manual scan
    pub fn scan(&self, manifest: PluginManifest) {
        let client = Rc::clone(&self.client);
        let state = self.clone();
        spawn_local(async move {
            trigger_scan(client.as_ref(), &manifest).await;
            state.show_success(&format!("Scan requested for {}", manifest.display_name));
        });
    }

    /// Fetch the backend's system info
    pub async fn fetch_info(&self) -> Result<Vec<(String, String)>, String> {
        kilimanjaro::api::fetch_info(self.client.as_ref(), &self.paths)
            .await
            .map_err(|e| e.to_string())
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}

/// Futures run on the page's microtask queue
fn spawner() -> Spawner {
    Rc::new(|future: LocalBoxFuture<'static, ()>| {
        wasm_bindgen_futures::spawn_local(future)
    })
}

fn current_viewport() -> Viewport {
    let width = web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
        .unwrap_or(f64::from(kilimanjaro::widgets::table::DESKTOP_MIN_WIDTH));
    Viewport::from_width(width as u32)
}
