//! Live-Bound Widgets
//!
//! Binds one widget instance's data to an initial fetch plus a re-fetch on
//! every event of its refresh topic.
//!
//! [`LiveBinding`] is the pure state machine (ordering, teardown, retained
//! payloads); [`LiveWidget`] drives it against an [`ApiClient`], the shared
//! [`RealtimeChannel`] and a host spawner.

use futures_util::future::LocalBoxFuture;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::{ApiClient, ApiPaths, FetchError};
use crate::channel::{RealtimeChannel, Subscription};
use crate::manifest::WidgetConfig;

/// Runs a future to completion on the host's local executor
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// What a widget instance currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSnapshot {
    /// True until the first fetch settles
    pub loading: bool,
    /// Last successfully fetched payload
    pub data: Option<Value>,
    /// Message of the most recent failed fetch, cleared on success
    pub error: Option<String>,
}

impl WidgetSnapshot {
    fn pending() -> Self {
        Self {
            loading: true,
            data: None,
            error: None,
        }
    }
}

/// Sequence number of one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Fetch bookkeeping of one widget instance
#[derive(Debug)]
pub struct LiveBinding {
    snapshot: WidgetSnapshot,
    issued: u64,
    applied: u64,
    torn_down: bool,
}

impl Default for LiveBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveBinding {
    pub fn new() -> Self {
        Self {
            snapshot: WidgetSnapshot::pending(),
            issued: 0,
            applied: 0,
            torn_down: false,
        }
    }

    /// Issue a fetch. `None` once torn down.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.torn_down {
            return None;
        }
        self.issued += 1;
        Some(FetchTicket(self.issued))
    }

    /// Apply a fetch result. Returns whether the snapshot changed hands;
    /// results after teardown or older than the last applied one are dropped.
    pub fn settle(&mut self, ticket: FetchTicket, result: Result<Value, FetchError>) -> bool {
        if self.torn_down || ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        self.snapshot.loading = false;

        match result {
            Ok(data) => {
                self.snapshot.data = Some(data);
                self.snapshot.error = None;
            }
            Err(e) => {
                // Previous payload stays visible
                self.snapshot.error = Some(e.to_string());
            }
        }
        true
    }

    pub fn tear_down(&mut self) {
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn snapshot(&self) -> &WidgetSnapshot {
        &self.snapshot
    }
}

type Listener = Rc<dyn Fn(&WidgetSnapshot)>;

struct LiveInner {
    config: WidgetConfig,
    path: String,
    client: Rc<dyn ApiClient>,
    spawner: Spawner,
    binding: RefCell<LiveBinding>,
    subscription: RefCell<Option<Subscription>>,
    listeners: RefCell<Vec<Listener>>,
}

/// A mounted widget instance. Dropping it unmounts.
pub struct LiveWidget {
    inner: Rc<LiveInner>,
}

impl LiveWidget {
    /// Start the initial fetch and subscribe to the widget's refresh topic
    pub fn mount(
        config: WidgetConfig,
        paths: &ApiPaths,
        client: Rc<dyn ApiClient>,
        channel: &RealtimeChannel,
        spawner: Spawner,
    ) -> Self {
        let inner = Rc::new(LiveInner {
            path: paths.data(&config.data_endpoint),
            config,
            client,
            spawner,
            binding: RefCell::new(LiveBinding::new()),
            subscription: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });

        inner.fetch();

        let weak = Rc::downgrade(&inner);
        let subscription = channel.subscribe(inner.config.refresh_event.clone(), move |event| {
            if let Some(inner) = weak.upgrade() {
                tracing::debug!(
                    widget = %inner.config.widget_id,
                    topic = %event.topic,
                    "Refreshing widget"
                );
                inner.fetch();
            }
        });
        *inner.subscription.borrow_mut() = Some(subscription);

        tracing::debug!(
            widget = %inner.config.widget_id,
            kind = %inner.config.widget_type,
            "Widget mounted"
        );
        Self { inner }
    }

    /// Observe snapshot changes
    pub fn on_change(&self, listener: impl Fn(&WidgetSnapshot) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        self.inner.binding.borrow().snapshot().clone()
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.inner.config
    }

    /// Re-fetch outside of any event
    pub fn refresh(&self) {
        self.inner.fetch();
    }

    /// Release the subscription and discard any result still in flight.
    /// Idempotent.
    pub fn unmount(&self) {
        let subscription = self.inner.subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            tracing::debug!(widget = %self.inner.config.widget_id, "Widget unmounted");
        }
        self.inner.binding.borrow_mut().tear_down();
        self.inner.listeners.borrow_mut().clear();
    }
}

impl Drop for LiveWidget {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl LiveInner {
    fn fetch(self: &Rc<Self>) {
        let ticket = match self.binding.borrow_mut().begin_fetch() {
            Some(ticket) => ticket,
            None => return,
        };

        let inner = Rc::clone(self);
        (self.spawner)(Box::pin(async move {
            let result = inner.client.get_json(&inner.path).await;
            if let Err(e) = &result {
                tracing::warn!(
                    widget = %inner.config.widget_id,
                    path = %inner.path,
                    error = %e,
                    "Widget fetch failed"
                );
            }

            let applied = inner.binding.borrow_mut().settle(ticket, result);
            if applied {
                inner.notify();
            }
        }));
    }

    fn notify(&self) {
        let snapshot = self.binding.borrow().snapshot().clone();
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{open_channel, widget, FakeApi, ManualSpawner};
    use serde_json::json;

    const DEVICES: &str = "/api/plugins/test/devices";

    fn frame(topic: &str) -> String {
        format!(r#"{{"event":"{}","data":{{}}}}"#, topic)
    }

    #[test]
    fn test_binding_keeps_payload_on_failure() {
        let mut binding = LiveBinding::new();
        assert!(binding.snapshot().loading);

        let first = binding.begin_fetch().unwrap();
        assert!(binding.settle(first, Ok(json!([1]))));
        let second = binding.begin_fetch().unwrap();
        assert!(binding.settle(second, Err(FetchError::status(500, "Internal Server Error"))));

        let snapshot = binding.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.data, Some(json!([1])));
        assert_eq!(
            snapshot.error.as_deref(),
            Some("API error 500: Internal Server Error")
        );
    }

    #[test]
    fn test_binding_discards_stale_and_late_results() {
        let mut binding = LiveBinding::new();
        let older = binding.begin_fetch().unwrap();
        let newer = binding.begin_fetch().unwrap();

        assert!(binding.settle(newer, Ok(json!("new"))));
        assert!(!binding.settle(older, Ok(json!("old"))));
        assert_eq!(binding.snapshot().data, Some(json!("new")));

        let late = binding.begin_fetch().unwrap();
        binding.tear_down();
        assert!(!binding.settle(late, Ok(json!("late"))));
        assert!(binding.begin_fetch().is_none());
        assert_eq!(binding.snapshot().data, Some(json!("new")));
    }

    #[test]
    fn test_mount_fetches_then_refetches_on_topic() {
        let api = FakeApi::new();
        api.respond(DEVICES, Ok(json!([{"ip": "10.0.0.1"}])));
        let (channel, connector, _) = open_channel();
        connector.last().opened();
        let spawner = ManualSpawner::default();

        let live = LiveWidget::mount(
            widget("devices", "table"),
            &ApiPaths::default(),
            api.clone(),
            &channel,
            spawner.spawner(),
        );
        assert!(live.snapshot().loading);

        spawner.run_until_stalled();
        assert_eq!(api.gets(), vec![DEVICES]);
        assert_eq!(live.snapshot().data, Some(json!([{"ip": "10.0.0.1"}])));

        connector.last().message(&frame("unrelated"));
        connector.last().message(&frame("devices:changed"));
        spawner.run_until_stalled();
        assert_eq!(api.gets().len(), 2);
    }

    #[test]
    fn test_wildcard_refresh_event() {
        let api = FakeApi::new();
        let (channel, connector, _) = open_channel();
        connector.last().opened();
        let spawner = ManualSpawner::default();
        let mut config = widget("devices", "table");
        config.refresh_event = "*".to_string();

        let _live = LiveWidget::mount(config, &ApiPaths::default(), api.clone(), &channel, spawner.spawner());
        connector.last().message(&frame("a"));
        connector.last().message(&frame("b"));
        spawner.run_until_stalled();

        assert_eq!(api.gets().len(), 3);
    }

    #[test]
    fn test_success_then_failure_retains_payload() {
        let api = FakeApi::new();
        api.respond(DEVICES, Ok(json!([{"ip": "10.0.0.1"}])));
        let (channel, connector, _) = open_channel();
        connector.last().opened();
        let spawner = ManualSpawner::default();
        let live = LiveWidget::mount(
            widget("devices", "table"),
            &ApiPaths::default(),
            api.clone(),
            &channel,
            spawner.spawner(),
        );
        spawner.run_until_stalled();

        api.respond(DEVICES, Err(FetchError::Network("offline".into())));
        connector.last().message(&frame("devices:changed"));
        spawner.run_until_stalled();

        let snapshot = live.snapshot();
        assert_eq!(snapshot.data, Some(json!([{"ip": "10.0.0.1"}])));
        assert_eq!(snapshot.error.as_deref(), Some("Network error: offline"));
    }

    #[test]
    fn test_out_of_order_results() {
        let api = FakeApi::new();
        api.defer(DEVICES);
        let (channel, connector, _) = open_channel();
        connector.last().opened();
        let spawner = ManualSpawner::default();
        let live = LiveWidget::mount(
            widget("devices", "table"),
            &ApiPaths::default(),
            api.clone(),
            &channel,
            spawner.spawner(),
        );
        live.refresh();
        spawner.run_until_stalled();

        api.resolve(1, Ok(json!("newer")));
        spawner.run_until_stalled();
        api.resolve(0, Ok(json!("older")));
        spawner.run_until_stalled();

        assert_eq!(live.snapshot().data, Some(json!("newer")));
        assert_eq!(spawner.pending(), 0);
    }

    #[test]
    fn test_unmount_releases_subscription_and_discards_results() {
        let api = FakeApi::new();
        api.defer(DEVICES);
        let (channel, connector, _) = open_channel();
        connector.last().opened();
        let spawner = ManualSpawner::default();
        let live = LiveWidget::mount(
            widget("devices", "table"),
            &ApiPaths::default(),
            api.clone(),
            &channel,
            spawner.spawner(),
        );
        let notified = Rc::new(RefCell::new(0));
        let notified_for_cb = Rc::clone(&notified);
        live.on_change(move |_| *notified_for_cb.borrow_mut() += 1);
        spawner.run_until_stalled();
        assert_eq!(channel.subscriber_count("devices:changed"), 1);

        live.unmount();
        live.unmount();
        api.resolve(0, Ok(json!("late")));
        spawner.run_until_stalled();
        connector.last().message(&frame("devices:changed"));

        assert_eq!(channel.subscriber_count("devices:changed"), 0);
        assert_eq!(api.gets().len(), 1);
        assert!(live.snapshot().data.is_none());
        assert_eq!(*notified.borrow(), 0);
    }

    #[test]
    fn test_drop_unmounts() {
        let api = FakeApi::new();
        let (channel, _, _) = open_channel();
        let spawner = ManualSpawner::default();
        let live = LiveWidget::mount(
            widget("devices", "table"),
            &ApiPaths::default(),
            api.clone(),
            &channel,
            spawner.spawner(),
        );
        drop(live);

        assert_eq!(channel.subscriber_count("devices:changed"), 0);
    }
}
