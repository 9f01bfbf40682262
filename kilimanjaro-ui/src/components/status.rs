//! Status Widget
//!
//! Device counts as three tiles with a last-scan footer.

use leptos::*;
use serde_json::Value;

use kilimanjaro::manifest::WidgetConfig;
use kilimanjaro::widgets::{builtin, LayoutHint, StatusSummary, TileAccent, WidgetKind};

use super::widget::WidgetView;

/// `status` kind view
pub struct StatusView;

impl WidgetKind for StatusView {
    fn kind(&self) -> &'static str {
        builtin::STATUS
    }

    fn layout_hint(&self) -> LayoutHint {
        builtin::STATUS_LAYOUT
    }

    fn on_overview(&self) -> bool {
        true
    }
}

impl WidgetView for StatusView {
    fn render(&self, _config: WidgetConfig, data: Signal<Value>) -> View {
        view! { <StatusTiles data=data /> }.into_view()
    }
}

#[component]
fn StatusTiles(data: Signal<Value>) -> impl IntoView {
    move || {
        StatusSummary::decode(&data.get()).map(|summary| {
            view! {
                <div class="grid grid-cols-1 sm:grid-cols-3 gap-4">
                    {summary
                        .tiles()
                        .into_iter()
                        .map(|tile| view! {
                            <div class="bg-gray-900 rounded-lg p-4">
                                <div class="text-sm text-gray-400">{tile.label}</div>
                                <div class=format!("text-3xl font-bold {}", accent_class(tile.accent))>
                                    {tile.value}
                                </div>
                            </div>
                        })
                        .collect_view()}
                </div>
                {summary.footer().map(|footer| view! {
                    <p class="text-xs text-gray-500 mt-4">{footer}</p>
                })}
            }
        })
    }
}

fn accent_class(accent: TileAccent) -> &'static str {
    match accent {
        TileAccent::Info => "text-blue-400",
        TileAccent::Good => "text-green-400",
        TileAccent::Bad => "text-red-400",
    }
}
