//! Test doubles shared by the unit tests
//!
//! Hand-written fakes for every host seam: API client, transport connector,
//! reconnect scheduler and local spawner. Everything is single-threaded and
//! driven manually by the test.

use async_trait::async_trait;
use futures_util::future::{poll_fn, LocalBoxFuture};
use futures_util::task::noop_waker;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use crate::api::{ApiClient, FetchError};
use crate::binding::Spawner;
use crate::channel::{
    ChannelConfig, ChannelError, Connector, RealtimeChannel, Scheduler, Transport, TransportEvents,
};
use crate::manifest::{PluginFrontend, PluginManifest, WidgetConfig};

// =============================================================================
// Fixtures
// =============================================================================

/// An enabled manifest with no widgets
pub fn manifest(name: &str, order: i64, route: &str) -> PluginManifest {
    PluginManifest {
        name: name.to_string(),
        display_name: name.replace('_', " "),
        description: String::new(),
        version: "1.0.0".to_string(),
        enabled: true,
        api_prefix: format!("/api/plugins/{}", name),
        frontend: PluginFrontend {
            icon: "Box".to_string(),
            sidebar_label: name.to_string(),
            sidebar_order: order,
            route_path: route.to_string(),
            widgets: Vec::new(),
        },
    }
}

/// A widget refreshed by `{id}:changed`, fetching `/plugins/test/{id}`
pub fn widget(id: &str, kind: &str) -> WidgetConfig {
    WidgetConfig {
        widget_id: id.to_string(),
        widget_type: kind.to_string(),
        title: id.to_string(),
        data_endpoint: format!("/plugins/test/{}", id),
        refresh_event: format!("{}:changed", id),
        columns: None,
        chart_type: None,
    }
}

// =============================================================================
// API client
// =============================================================================

type Slot = Rc<RefCell<Option<Result<Value, FetchError>>>>;

/// Canned-response API client.
///
/// Unknown paths answer 404. Paths marked with [`defer`](Self::defer) stay
/// pending until the test resolves them.
#[derive(Default)]
pub struct FakeApi {
    responses: RefCell<HashMap<String, Result<Value, FetchError>>>,
    deferred: RefCell<HashSet<String>>,
    waiting: RefCell<Vec<Slot>>,
    gets: RefCell<Vec<String>>,
    posts: RefCell<Vec<String>>,
    post_error: RefCell<Option<FetchError>>,
}

impl FakeApi {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn respond(&self, path: &str, result: Result<Value, FetchError>) {
        self.responses.borrow_mut().insert(path.to_string(), result);
    }

    pub fn respond_manifests(&self, manifests: Vec<PluginManifest>) {
        let body = serde_json::to_value(manifests).unwrap();
        self.respond("/api/plugins", Ok(body));
    }

    pub fn fail_posts(&self, error: FetchError) {
        *self.post_error.borrow_mut() = Some(error);
    }

    /// Hold every later `GET` of `path` until [`resolve`](Self::resolve)
    pub fn defer(&self, path: &str) {
        self.deferred.borrow_mut().insert(path.to_string());
    }

    /// Complete the `index`-th held request (in issue order)
    pub fn resolve(&self, index: usize, result: Result<Value, FetchError>) {
        let slot = Rc::clone(&self.waiting.borrow()[index]);
        *slot.borrow_mut() = Some(result);
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.borrow().clone()
    }

    pub fn posts(&self) -> Vec<String> {
        self.posts.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ApiClient for FakeApi {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        self.gets.borrow_mut().push(path.to_string());

        if self.deferred.borrow().contains(path) {
            let slot: Slot = Rc::new(RefCell::new(None));
            self.waiting.borrow_mut().push(Rc::clone(&slot));
            return poll_fn(move |_| match slot.borrow_mut().take() {
                Some(result) => Poll::Ready(result),
                None => Poll::Pending,
            })
            .await;
        }

        self.responses
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::status(404, "Not Found")))
    }

    async fn post(&self, path: &str) -> Result<(), FetchError> {
        self.posts.borrow_mut().push(path.to_string());
        match self.post_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Realtime transport
// =============================================================================

#[derive(Default)]
struct ConnectorLog {
    opens: RefCell<Vec<TransportEvents>>,
    closes: Cell<usize>,
    fail_next: Cell<bool>,
}

/// Connector whose connections are driven by the test through the
/// [`TransportEvents`] of each attempt
#[derive(Clone, Default)]
pub struct FakeConnector {
    log: Rc<ConnectorLog>,
}

impl FakeConnector {
    /// Events handle of the most recent attempt
    pub fn last(&self) -> TransportEvents {
        self.log.opens.borrow().last().cloned().expect("no connection attempt")
    }

    pub fn open_count(&self) -> usize {
        self.log.opens.borrow().len()
    }

    pub fn close_count(&self) -> usize {
        self.log.closes.get()
    }

    /// Make the next attempt fail to create a transport
    pub fn fail_next(&self) {
        self.log.fail_next.set(true);
    }
}

struct FakeTransport {
    log: Rc<ConnectorLog>,
}

impl Transport for FakeTransport {
    fn close(&self) {
        self.log.closes.set(self.log.closes.get() + 1);
    }
}

impl Connector for FakeConnector {
    fn open(&self, url: &str, events: TransportEvents) -> Result<Box<dyn Transport>, ChannelError> {
        if self.log.fail_next.replace(false) {
            return Err(ChannelError::Connect {
                url: url.to_string(),
                reason: "refused".to_string(),
            });
        }
        self.log.opens.borrow_mut().push(events);
        Ok(Box::new(FakeTransport {
            log: Rc::clone(&self.log),
        }))
    }
}

/// Scheduler that only runs tasks when told to
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Rc<RefCell<Vec<(Duration, Box<dyn FnOnce()>)>>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.tasks.borrow().iter().map(|(delay, _)| *delay).collect()
    }

    /// Run every task scheduled so far
    pub fn fire_all(&self) {
        let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
        for (_, task) in tasks {
            task();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.tasks.borrow_mut().push((delay, task));
    }
}

/// A channel on a fake transport, plus the handles driving it
pub fn open_channel() -> (RealtimeChannel, FakeConnector, ManualScheduler) {
    let connector = FakeConnector::default();
    let scheduler = ManualScheduler::default();
    let channel = RealtimeChannel::connect(
        ChannelConfig::new("ws://localhost:8000/ws"),
        Box::new(connector.clone()),
        Box::new(scheduler.clone()),
    );
    (channel, connector, scheduler)
}

// =============================================================================
// Spawner
// =============================================================================

/// Local executor polled by hand
#[derive(Clone, Default)]
pub struct ManualSpawner {
    tasks: Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>>,
}

impl ManualSpawner {
    pub fn spawner(&self) -> Spawner {
        let tasks = Rc::clone(&self.tasks);
        Rc::new(move |task| tasks.borrow_mut().push(task))
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Poll every task until none can make progress
    pub fn run_until_stalled(&self) {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        loop {
            let batch: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
            let mut progressed = false;
            let mut stalled = Vec::new();

            for mut task in batch {
                match task.as_mut().poll(&mut cx) {
                    Poll::Ready(()) => progressed = true,
                    Poll::Pending => stalled.push(task),
                }
            }

            let spawned = !self.tasks.borrow().is_empty();
            self.tasks.borrow_mut().extend(stalled);
            if !progressed && !spawned {
                return;
            }
        }
    }
}
