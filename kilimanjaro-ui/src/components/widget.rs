//! Widget Host
//!
//! Resolves a widget's kind to a view strategy, binds it to live data and
//! contains its failures to its own card.

use leptos::*;
use serde_json::Value;

use kilimanjaro::manifest::WidgetConfig;
use kilimanjaro::widgets::{KindRegistry, WidgetKind, FAULT_HEADING};

use super::chart::ChartView;
use super::loading::Loading;
use super::status::StatusView;
use super::table::TableView;
use crate::state::global::GlobalState;

/// Browser rendering strategy of one widget kind
pub trait WidgetView: WidgetKind {
    /// Build the widget body. Runs once per mount; `data` follows every
    /// refresh. Decode failures surface as `Err` views and land in the
    /// surrounding error boundary.
    fn render(&self, config: WidgetConfig, data: Signal<Value>) -> View;
}

/// Registry with the built-in status, table and chart views
pub fn builtin_views() -> KindRegistry<dyn WidgetView> {
    KindRegistry::<dyn WidgetView>::new()
        .with(Box::new(StatusView))
        .with(Box::new(TableView))
        .with(Box::new(ChartView))
}

/// One widget card on a page
#[component]
pub fn WidgetHost(config: WidgetConfig) -> impl IntoView {
    let state = expect_context::<GlobalState>();

    match state.views.resolve(&config.widget_type) {
        Ok(view) => {
            let class = view.layout_hint().class();
            view! { <LiveCard config=config class=class /> }.into_view()
        }
        Err(e) => view! { <UnknownWidget message=e.to_string() /> }.into_view(),
    }
}

/// Placeholder for a kind no strategy is registered for
#[component]
fn UnknownWidget(message: String) -> impl IntoView {
    view! {
        <div class="bg-yellow-900/40 border border-yellow-700 text-yellow-300 rounded-xl p-4 text-sm">
            {message}
        </div>
    }
}

#[component]
fn LiveCard(config: WidgetConfig, class: String) -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let live = state.mount_widget(config.clone());
    let snapshot = create_rw_signal(live.snapshot());
    live.on_change(move |next| snapshot.set(next.clone()));
    on_cleanup(move || live.unmount());

    let loading = create_memo(move |_| snapshot.with(|s| s.loading));
    let has_data = create_memo(move |_| snapshot.with(|s| s.data.is_some()));
    let error = create_memo(move |_| snapshot.with(|s| s.error.clone()));
    let data = create_memo(move |_| snapshot.with(|s| s.data.clone().unwrap_or(Value::Null)));

    let title = config.title.clone();
    let body = store_value((state.views.clone(), config));

    view! {
        <section class=format!("bg-gray-800 rounded-xl p-6 {}", class)>
            <div class="flex items-center justify-between mb-4">
                <h2 class="text-lg font-semibold">{title}</h2>
                // Stale payload after a failed refresh
                {move || {
                    (has_data.get() && error.get().is_some()).then(|| view! {
                        <span class="text-xs text-yellow-400" title=move || error.get().unwrap_or_default()>
                            "⚠ Refresh failed"
                        </span>
                    })
                }}
            </div>

            <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
                <Show
                    when=move || has_data.get()
                    fallback=move || {
                        error.get().map(|message| view! {
                            <p class="text-red-400 text-sm">{format!("Error: {}", message)}</p>
                        })
                    }
                >
                    <ErrorBoundary fallback=|errors| view! { <FaultCard errors=errors /> }>
                        {body.with_value(|(views, config)| {
                            views
                                .resolve(&config.widget_type)
                                .map(|view| view.render(config.clone(), data.into()))
                        })}
                    </ErrorBoundary>
                </Show>
            </Show>
        </section>
    }
}

/// Fallback shown in place of a widget whose rendering failed
#[component]
fn FaultCard(errors: RwSignal<Errors>) -> impl IntoView {
    let messages = move || {
        errors
            .get()
            .into_iter()
            .map(|(_, e)| e.to_string())
            .collect::<Vec<_>>()
    };

    create_effect(move |_| {
        for message in messages() {
            tracing::error!(error = %message, "Widget render failed");
        }
    });

    view! {
        <div class="bg-red-900/30 border border-red-700 rounded-lg p-4">
            <p class="text-red-300 font-medium">{FAULT_HEADING}</p>
            <ul class="text-red-400 text-sm mt-2 space-y-1">
                {move || messages()
                    .into_iter()
                    .map(|message| view! { <li>{message}</li> })
                    .collect_view()}
            </ul>
        </div>
    }
}
