//! Widget Kind Registry
//!
//! Maps the open-ended `widget_type` tag of a manifest widget to a rendering
//! strategy. Each host (browser, terminal) fills its own registry with
//! strategies of its own trait; the dispatch rules are shared.

use std::collections::HashMap;
use thiserror::Error;

use crate::manifest::{ManifestSet, PluginManifest, WidgetConfig};

/// Composition faults. Contained to the one widget that raised them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Unknown widget type: {0}")]
    UnknownKind(String),

    #[error("Unexpected {kind} payload: {message}")]
    Payload { kind: String, message: String },
}

impl WidgetError {
    pub fn payload(kind: &str, message: impl Into<String>) -> Self {
        Self::Payload {
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}

/// Column span of a widget in the page grid at the small (`sm`, >= 640px)
/// and large (`lg`, >= 1024px) breakpoints. Mobile is always one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutHint {
    pub sm: u8,
    pub lg: u8,
}

impl LayoutHint {
    pub const fn new(sm: u8, lg: u8) -> Self {
        Self { sm, lg }
    }

    /// Grid classes for a three-column page grid
    pub fn class(&self) -> String {
        let mut classes = Vec::with_capacity(2);
        if self.sm > 1 {
            classes.push(format!("sm:col-span-{}", self.sm));
        }
        if self.lg > 1 {
            classes.push(format!("lg:col-span-{}", self.lg));
        }
        classes.join(" ")
    }
}

/// Dispatch metadata every strategy carries, whatever the host
pub trait WidgetKind {
    /// The `widget_type` tag this strategy handles
    fn kind(&self) -> &'static str;

    fn layout_hint(&self) -> LayoutHint;

    /// Whether widgets of this kind are collected onto the overview dashboard
    fn on_overview(&self) -> bool {
        false
    }
}

/// Overview heading when no manifest contributes an overview widget
pub const NO_PLUGINS: &str = "No plugins loaded";

/// Hint shown under [`NO_PLUGINS`]
pub const NO_PLUGINS_HINT: &str = "Add plugins to backend/plugins/ and restart the server";

/// Tag -> strategy map
pub struct KindRegistry<S: ?Sized + WidgetKind> {
    kinds: HashMap<&'static str, Box<S>>,
}

impl<S: ?Sized + WidgetKind> Default for KindRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + WidgetKind> KindRegistry<S> {
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Add a strategy under its own tag, returning any strategy it replaces
    pub fn register(&mut self, strategy: Box<S>) -> Option<Box<S>> {
        let kind = strategy.kind();
        tracing::trace!(kind, "Registering widget kind");
        self.kinds.insert(kind, strategy)
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, strategy: Box<S>) -> Self {
        self.register(strategy);
        self
    }

    pub fn resolve(&self, tag: &str) -> Result<&S, WidgetError> {
        self.kinds
            .get(tag)
            .map(|s| s.as_ref())
            .ok_or_else(|| WidgetError::UnknownKind(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Registered tags, sorted
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.kinds.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    /// Widgets of every manifest (in display order) whose kind belongs on
    /// the overview dashboard
    pub fn overview_widgets<'a>(
        &self,
        set: &'a ManifestSet,
    ) -> Vec<(&'a PluginManifest, &'a WidgetConfig)> {
        set.iter()
            .flat_map(|m| m.frontend.widgets.iter().map(move |w| (m, w)))
            .filter(|(_, w)| {
                self.resolve(&w.widget_type)
                    .map(|s| s.on_overview())
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// Layout of the built-in kinds
pub mod builtin {
    use super::LayoutHint;

    pub const TABLE: &str = "table";
    pub const CHART: &str = "chart";
    pub const STATUS: &str = "status";

    pub const TABLE_LAYOUT: LayoutHint = LayoutHint::new(2, 3);
    pub const CHART_LAYOUT: LayoutHint = LayoutHint::new(2, 1);
    pub const STATUS_LAYOUT: LayoutHint = LayoutHint::new(2, 3);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{manifest, widget};

    trait Probe: WidgetKind {
        fn render(&self) -> String;
    }

    struct Named(&'static str, bool);

    impl WidgetKind for Named {
        fn kind(&self) -> &'static str {
            self.0
        }
        fn layout_hint(&self) -> LayoutHint {
            builtin::CHART_LAYOUT
        }
        fn on_overview(&self) -> bool {
            self.1
        }
    }

    impl Probe for Named {
        fn render(&self) -> String {
            format!("<{}>", self.0)
        }
    }

    fn registry() -> KindRegistry<dyn Probe> {
        KindRegistry::<dyn Probe>::new()
            .with(Box::new(Named("table", false)))
            .with(Box::new(Named("status", true)))
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let registry = registry();

        assert_eq!(registry.resolve("table").unwrap().render(), "<table>");
        assert_eq!(
            registry.resolve("bogus-kind").err(),
            Some(WidgetError::UnknownKind("bogus-kind".to_string()))
        );
    }

    #[test]
    fn test_unknown_kind_does_not_affect_siblings() {
        let registry = registry();
        let rendered: Vec<String> = ["table", "bogus-kind", "status"]
            .iter()
            .map(|tag| match registry.resolve(tag) {
                Ok(s) => s.render(),
                Err(e) => e.to_string(),
            })
            .collect();

        assert_eq!(
            rendered,
            vec!["<table>", "Unknown widget type: bogus-kind", "<status>"]
        );
    }

    #[test]
    fn test_register_new_kind() {
        let mut registry = registry();
        assert!(!registry.contains("gauge"));

        registry.register(Box::new(Named("gauge", false)));
        assert_eq!(registry.kinds(), vec!["gauge", "status", "table"]);
    }

    #[test]
    fn test_overview_widgets() {
        let mut lan = manifest("lan", 1, "/lan");
        lan.frontend.widgets = vec![widget("summary", "status"), widget("devices", "table")];
        let mut other = manifest("other", 2, "/other");
        other.frontend.widgets = vec![widget("mystery", "bogus-kind"), widget("s2", "status")];
        let set = ManifestSet::from_fetched(vec![other, lan]).unwrap();

        let ids: Vec<&str> = registry()
            .overview_widgets(&set)
            .into_iter()
            .map(|(_, w)| w.widget_id.as_str())
            .collect();
        assert_eq!(ids, vec!["summary", "s2"]);
    }

    #[test]
    fn test_layout_class() {
        assert_eq!(builtin::TABLE_LAYOUT.class(), "sm:col-span-2 lg:col-span-3");
        assert_eq!(builtin::CHART_LAYOUT.class(), "sm:col-span-2");
    }
}
