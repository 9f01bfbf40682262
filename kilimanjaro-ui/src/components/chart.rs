//! Chart Widget
//!
//! Time-series chart using HTML5 Canvas.

use leptos::*;
use serde_json::Value;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use kilimanjaro::manifest::{ChartType, WidgetConfig};
use kilimanjaro::widgets::{builtin, ChartData, LayoutHint, WidgetKind, EMPTY_CHART};

use super::widget::WidgetView;

/// Most x-axis labels drawn, however many points there are
const MAX_X_LABELS: usize = 6;

/// `chart` kind view
pub struct ChartView;

impl WidgetKind for ChartView {
    fn kind(&self) -> &'static str {
        builtin::CHART
    }

    fn layout_hint(&self) -> LayoutHint {
        builtin::CHART_LAYOUT
    }
}

impl WidgetView for ChartView {
    fn render(&self, config: WidgetConfig, data: Signal<Value>) -> View {
        view! { <Chart chart_type=config.chart_type() data=data /> }.into_view()
    }
}

/// Time-series chart component
#[component]
fn Chart(chart_type: ChartType, data: Signal<Value>) -> impl IntoView {
    let canvas_ref = create_node_ref::<html::Canvas>();
    let chart = create_memo(move |_| ChartData::decode(&data.get(), chart_type));

    // Redraw chart when data changes
    create_effect(move |_| {
        let decoded = chart.get();
        if let (Some(canvas), Ok(decoded)) = (canvas_ref.get(), decoded) {
            if !decoded.is_empty() {
                draw_chart(&canvas, &decoded);
            }
        }
    });

    let drawable = move || chart.with(|c| c.as_ref().map_or(false, |c| !c.is_empty()));

    view! {
        <div class="relative">
            // Empty state, or the decode error for the boundary
            {move || {
                chart.get().map(|decoded| decoded.is_empty().then(|| view! {
                    <p class="text-gray-400 text-center py-8">{EMPTY_CHART}</p>
                }))
            }}

            <canvas
                node_ref=canvas_ref
                width="800"
                height="300"
                class=move || if drawable() { "w-full h-64 rounded-lg" } else { "hidden" }
            />

            // Legend
            <div class="flex justify-center flex-wrap gap-4 mt-4">
                {move || {
                    chart.get().ok().filter(|c| !c.is_empty()).map(|decoded| {
                        decoded
                            .series
                            .into_iter()
                            .map(|series| view! {
                                <div class="flex items-center space-x-2">
                                    <div
                                        class="w-3 h-3 rounded-full"
                                        style=format!("background-color: {}", series.color)
                                    />
                                    <span class="text-sm text-gray-300">{series.label}</span>
                                </div>
                            })
                            .collect_view()
                    })
                }}
            </div>
        </div>
    }
}

/// Plot area of the canvas
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    max: f64,
    points: usize,
}

impl Frame {
    /// Centre of point `index` along the x axis
    fn x(&self, index: usize) -> f64 {
        if self.points <= 1 {
            return self.left + self.width / 2.0;
        }
        self.left + (index as f64 / (self.points - 1) as f64) * self.width
    }

    /// Canvas y grows downward
    fn y(&self, value: f64) -> f64 {
        self.top + (1.0 - value / self.max) * self.height
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Draw the chart on canvas
fn draw_chart(canvas: &HtmlCanvasElement, chart: &ChartData) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    // Margins
    let margin_left = 50.0;
    let margin_right = 20.0;
    let margin_top = 20.0;
    let margin_bottom = 40.0;

    let frame = Frame {
        left: margin_left,
        top: margin_top,
        width: width - margin_left - margin_right,
        height: height - margin_top - margin_bottom,
        max: chart.max_value().max(1.0) * 1.1,
        points: chart.labels.len(),
    };

    // Clear canvas
    ctx.set_fill_style(&"#1f2937".into()); // gray-800
    ctx.fill_rect(0.0, 0.0, width, height);

    // Horizontal grid lines (5 lines) with y-axis labels
    ctx.set_stroke_style(&"#374151".into()); // gray-700
    ctx.set_line_width(1.0);
    ctx.set_font("12px sans-serif");
    for i in 0..=5 {
        let value = frame.max * (1.0 - i as f64 / 5.0);
        let y = frame.y(value);
        ctx.begin_path();
        ctx.move_to(frame.left, y);
        ctx.line_to(width - margin_right, y);
        ctx.stroke();

        ctx.set_fill_style(&"#9ca3af".into()); // gray-400
        let _ = ctx.fill_text(&format!("{:.0}", value), 5.0, y + 4.0);
    }

    match chart.chart_type {
        ChartType::Bar => draw_bars(&ctx, chart, &frame),
        ChartType::Line => draw_lines(&ctx, chart, &frame, false),
        ChartType::Area => draw_lines(&ctx, chart, &frame, true),
    }

    // X-axis labels
    ctx.set_fill_style(&"#9ca3af".into());
    ctx.set_font("12px sans-serif");
    let step = chart.labels.len().div_ceil(MAX_X_LABELS).max(1);
    for (index, label) in chart.labels.iter().enumerate().step_by(step) {
        let _ = ctx.fill_text(label, frame.x(index) - 15.0, height - 10.0);
    }
}

fn draw_lines(ctx: &CanvasRenderingContext2d, chart: &ChartData, frame: &Frame, filled: bool) {
    for series in &chart.series {
        ctx.set_stroke_style(&series.color.into());
        ctx.set_fill_style(&series.color.into());
        ctx.set_line_width(2.0);

        // Missing values break the line into segments
        let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
        for (index, value) in series.values.iter().enumerate() {
            match value {
                Some(v) => {
                    if let Some(segment) = segments.last_mut() {
                        segment.push((frame.x(index), frame.y(*v)));
                    }
                }
                None => segments.push(Vec::new()),
            }
        }

        for segment in segments.iter().filter(|s| !s.is_empty()) {
            ctx.begin_path();
            for (i, (x, y)) in segment.iter().enumerate() {
                if i == 0 {
                    ctx.move_to(*x, *y);
                } else {
                    ctx.line_to(*x, *y);
                }
            }
            ctx.stroke();

            if filled {
                if let (Some((first_x, _)), Some((last_x, _))) = (segment.first(), segment.last()) {
                    ctx.line_to(*last_x, frame.bottom());
                    ctx.line_to(*first_x, frame.bottom());
                    ctx.close_path();
                    ctx.set_global_alpha(0.2);
                    ctx.fill();
                    ctx.set_global_alpha(1.0);
                }
            }

            // Draw points
            for (x, y) in segment {
                ctx.begin_path();
                let _ = ctx.arc(*x, *y, 3.0, 0.0, std::f64::consts::PI * 2.0);
                ctx.fill();
            }
        }
    }
}

fn draw_bars(ctx: &CanvasRenderingContext2d, chart: &ChartData, frame: &Frame) {
    let slot = frame.width / chart.labels.len().max(1) as f64;
    let bar_width = slot * 0.8 / chart.series.len().max(1) as f64;

    for (series_index, series) in chart.series.iter().enumerate() {
        ctx.set_fill_style(&series.color.into());
        for (index, value) in series.values.iter().enumerate() {
            if let Some(v) = value {
                let x = frame.left + slot * index as f64 + slot * 0.1 + bar_width * series_index as f64;
                let y = frame.y(*v);
                ctx.fill_rect(x, y, bar_width, frame.bottom() - y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(points: usize) -> Frame {
        Frame {
            left: 50.0,
            top: 20.0,
            width: 700.0,
            height: 240.0,
            max: 10.0,
            points,
        }
    }

    #[test]
    fn test_frame_spans_plot_area() {
        let frame = frame(8);
        assert_eq!(frame.x(0), 50.0);
        assert_eq!(frame.x(7), 750.0);
        assert_eq!(frame.y(10.0), 20.0);
        assert_eq!(frame.y(0.0), frame.bottom());
    }

    #[test]
    fn test_single_point_is_centred() {
        assert_eq!(frame(1).x(0), 400.0);
    }
}
