//! Widget Dispatch
//!
//! - [`registry`]: kind tag -> strategy lookup and layout hints
//! - [`status`], [`table`], [`chart`]: payload decoding of the built-in kinds
//! - [`fault`]: per-widget fault containment
//! - [`text`]: terminal strategies

pub mod chart;
pub mod fault;
pub mod format;
pub mod registry;
pub mod status;
pub mod table;
pub mod text;

pub use chart::{ChartData, Series, EMPTY_CHART, SERIES_COLORS};
pub use fault::{contain, WidgetFault, FAULT_HEADING};
pub use registry::{
    builtin, KindRegistry, LayoutHint, WidgetError, WidgetKind, NO_PLUGINS, NO_PLUGINS_HINT,
};
pub use status::{StatusSummary, StatusTile, TileAccent};
pub use table::{
    decode_rows, format_cell, sort_rows, BadgeTone, Cell, Row, SortState, Viewport, NO_DATA,
};
pub use text::{builtin_text_kinds, TextOptions, TextWidget};
