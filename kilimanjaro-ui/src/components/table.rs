//! Table Widget
//!
//! Sortable device table. Collapses into one card per row on mobile.

use leptos::*;
use serde_json::Value;

use kilimanjaro::manifest::{WidgetColumn, WidgetConfig};
use kilimanjaro::widgets::{
    builtin, decode_rows, format_cell, sort_rows, BadgeTone, Cell, LayoutHint, Row, SortState,
    WidgetError, WidgetKind, NO_DATA,
};

use super::widget::WidgetView;
use crate::state::global::GlobalState;

/// `table` kind view
pub struct TableView;

impl WidgetKind for TableView {
    fn kind(&self) -> &'static str {
        builtin::TABLE
    }

    fn layout_hint(&self) -> LayoutHint {
        builtin::TABLE_LAYOUT
    }
}

impl WidgetView for TableView {
    fn render(&self, config: WidgetConfig, data: Signal<Value>) -> View {
        view! { <DataTable columns=config.columns().to_vec() data=data /> }.into_view()
    }
}

#[component]
fn DataTable(columns: Vec<WidgetColumn>, data: Signal<Value>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let viewport = state.viewport;

    // Survives refreshes; only a header click changes it
    let sort = create_rw_signal(SortState::default());
    let columns = store_value(columns);

    move || -> Result<View, WidgetError> {
        let rows = decode_rows(&data.get())?;
        if rows.is_empty() {
            return Ok(view! { <p class="text-gray-400 text-center py-8">{NO_DATA}</p> }.into_view());
        }

        let sort_state = sort.get();
        let sorted: Vec<Row> = sort_rows(&rows, &sort_state).into_iter().cloned().collect();

        let body = if viewport.get().uses_cards() {
            columns.with_value(|columns| row_cards(columns, &sorted))
        } else {
            columns.with_value(|columns| grid(columns, &sorted, &sort_state, sort))
        };
        Ok(body)
    }
}

fn grid(columns: &[WidgetColumn], rows: &[Row], sort_state: &SortState, sort: RwSignal<SortState>) -> View {
    let headers = columns
        .iter()
        .map(|column| {
            let label = match sort_state.indicator(&column.key) {
                Some(arrow) => format!("{} {}", column.label, arrow),
                None => column.label.clone(),
            };
            if column.sortable {
                let key = column.key.clone();
                view! {
                    <th
                        class="px-4 py-2 text-left cursor-pointer select-none hover:text-white"
                        on:click=move |_| sort.update(|s| s.toggle(&key))
                    >
                        {label}
                    </th>
                }
            } else {
                view! { <th class="px-4 py-2 text-left">{label}</th> }
            }
        })
        .collect_view();

    let body = rows
        .iter()
        .map(|row| {
            let cells = columns
                .iter()
                .map(|column| view! {
                    <td class="px-4 py-2">{cell_view(format_cell(&column.key, row.get(&column.key)))}</td>
                })
                .collect_view();
            view! { <tr class="border-t border-gray-700 hover:bg-gray-700/40">{cells}</tr> }
        })
        .collect_view();

    view! {
        <div class="overflow-x-auto">
            <table class="w-full text-sm">
                <thead class="text-gray-400">
                    <tr>{headers}</tr>
                </thead>
                <tbody>{body}</tbody>
            </table>
        </div>
    }
    .into_view()
}

fn row_cards(columns: &[WidgetColumn], rows: &[Row]) -> View {
    rows.iter()
        .map(|row| {
            let fields = columns
                .iter()
                .map(|column| view! {
                    <div class="flex justify-between py-1">
                        <span class="text-gray-400">{column.label.clone()}</span>
                        <span>{cell_view(format_cell(&column.key, row.get(&column.key)))}</span>
                    </div>
                })
                .collect_view();
            view! { <div class="bg-gray-900 rounded-lg p-4 mb-3 text-sm">{fields}</div> }
        })
        .collect_view()
}

fn cell_view(cell: Cell) -> View {
    match cell {
        Cell::Badge { label, tone } => view! {
            <span class=format!("px-2 py-0.5 rounded-full text-xs font-medium {}", badge_class(tone))>
                {label}
            </span>
        }
        .into_view(),
        other => other.to_string().into_view(),
    }
}

fn badge_class(tone: BadgeTone) -> &'static str {
    match tone {
        BadgeTone::Online => "bg-green-900 text-green-300",
        BadgeTone::Offline => "bg-red-900 text-red-300",
        BadgeTone::Scanning => "bg-yellow-900 text-yellow-300",
        BadgeTone::Unknown => "bg-gray-700 text-gray-300",
    }
}
