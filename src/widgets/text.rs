//! Terminal rendering strategies
//!
//! Plain-text renditions of the built-in kinds, used by the command-line
//! client. They share decoding with the browser strategies.

use serde_json::Value;
use std::fmt::Write;

use super::chart::{ChartData, EMPTY_CHART};
use super::registry::{builtin, KindRegistry, LayoutHint, WidgetError, WidgetKind};
use super::status::StatusSummary;
use super::table::{decode_rows, format_cell, sort_rows, SortState, NO_DATA};
use crate::manifest::WidgetConfig;

/// Per-invocation rendering options
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub sort: SortState,
    /// Stacked cards instead of a grid (the narrow-screen table layout)
    pub cards: bool,
}

/// A terminal rendering strategy
pub trait TextWidget: WidgetKind {
    fn render(
        &self,
        config: &WidgetConfig,
        payload: &Value,
        options: &TextOptions,
    ) -> Result<String, WidgetError>;
}

/// Registry with the built-in `status`, `table` and `chart` strategies
pub fn builtin_text_kinds() -> KindRegistry<dyn TextWidget> {
    KindRegistry::<dyn TextWidget>::new()
        .with(Box::new(StatusText))
        .with(Box::new(TableText))
        .with(Box::new(ChartText))
}

pub struct StatusText;

impl WidgetKind for StatusText {
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

impl TextWidget for StatusText {
    fn render(
        &self,
        _config: &WidgetConfig,
        payload: &Value,
        _options: &TextOptions,
    ) -> Result<String, WidgetError> {
        let summary = StatusSummary::decode(payload)?;

        let mut out = summary
            .tiles()
            .iter()
            .map(|tile| format!("{}: {}", tile.label, tile.value))
            .collect::<Vec<_>>()
            .join("   ");
        if let Some(footer) = summary.footer() {
            out.push('\n');
            out.push_str(&footer);
        }
        Ok(out)
    }
}

pub struct TableText;

impl WidgetKind for TableText {
    fn kind(&self) -> &'static str {
        builtin::TABLE
    }

    fn layout_hint(&self) -> LayoutHint {
        builtin::TABLE_LAYOUT
    }
}

impl TextWidget for TableText {
    fn render(
        &self,
        config: &WidgetConfig,
        payload: &Value,
        options: &TextOptions,
    ) -> Result<String, WidgetError> {
        let rows = decode_rows(payload)?;
        if rows.is_empty() {
            return Ok(NO_DATA.to_string());
        }

        let columns = config.columns();
        let sorted = sort_rows(&rows, &options.sort);
        let cells: Vec<Vec<String>> = sorted
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| format_cell(&c.key, row.get(&c.key)).to_string())
                    .collect()
            })
            .collect();

        let mut out = String::new();
        if options.cards {
            let label_width = columns.iter().map(|c| c.label.len()).max().unwrap_or(0);
            for (i, row) in cells.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                for (column, cell) in columns.iter().zip(row) {
                    let _ = writeln!(out, "{:<width$}  {}", column.label, cell, width = label_width);
                }
            }
            return Ok(out.trim_end().to_string());
        }

        let headers: Vec<String> = columns
            .iter()
            .map(|c| match options.sort.indicator(&c.key) {
                Some(arrow) => format!("{} {}", c.label, arrow),
                None => c.label.clone(),
            })
            .collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write_row(&mut out, &headers, &widths);
        let total: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 3;
        let _ = writeln!(out, "{}", "-".repeat(total));
        for row in &cells {
            write_row(&mut out, row, &widths);
        }
        Ok(out.trim_end().to_string())
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

pub struct ChartText;

impl WidgetKind for ChartText {
    fn kind(&self) -> &'static str {
        builtin::CHART
    }

    fn layout_hint(&self) -> LayoutHint {
        builtin::CHART_LAYOUT
    }
}

impl TextWidget for ChartText {
    fn render(
        &self,
        config: &WidgetConfig,
        payload: &Value,
        _options: &TextOptions,
    ) -> Result<String, WidgetError> {
        let chart = ChartData::decode(payload, config.chart_type())?;
        if chart.is_empty() {
            return Ok(EMPTY_CHART.to_string());
        }

        let mut out = String::new();
        let _ = write!(out, "{:<8}", "Time");
        for series in &chart.series {
            let _ = write!(out, " | {:<10}", series.label);
        }
        out.push('\n');
        let _ = writeln!(out, "{}", "-".repeat(8 + chart.series.len() * 13));

        for (i, label) in chart.labels.iter().enumerate() {
            let _ = write!(out, "{:<8}", label);
            for series in &chart.series {
                let value = series.values[i]
                    .map(|v| format!("{}", v))
                    .unwrap_or_else(|| "-".to_string());
                let _ = write!(out, " | {:<10}", value);
            }
            out.push('\n');
        }
        Ok(out.trim_end().to_string())
    }
}
