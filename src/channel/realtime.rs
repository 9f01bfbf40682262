//! Realtime Channel
//!
//! Keeps one transport connection to the realtime endpoint alive and fans
//! inbound events out to topic subscribers.
//!
//! The connection cycles `Connecting -> Open -> Closed -> Connecting ...` for
//! as long as the channel lives. Every loss (close, error, or failure to
//! create the transport) schedules exactly one reconnect after a fixed
//! delay. Missed events are not replayed.
//!
//! The transport and the timer are host seams ([`Connector`], [`Scheduler`]):
//! the browser plugs in `web_sys::WebSocket` and gloo timers.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use thiserror::Error;

use super::messages::{ChannelEvent, WILDCARD_TOPIC};

/// Delay between a connection loss and the reconnect attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Transport-level failures. Never surfaced to subscribers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Failed to open realtime connection to {url}: {reason}")]
    Connect { url: String, reason: String },
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// A live transport connection
pub trait Transport {
    /// Close the connection. Must stop delivering events to the channel.
    fn close(&self);
}

/// Opens transport connections
pub trait Connector {
    /// Start connecting to `url`; lifecycle and frames are reported through
    /// `events`.
    fn open(&self, url: &str, events: TransportEvents) -> Result<Box<dyn Transport>, ChannelError>;
}

/// Runs a task once after a delay
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Channel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Realtime endpoint (`ws://host/ws`)
    pub url: String,
    pub reconnect_delay: Duration,
}

impl ChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

type Callback = Rc<dyn Fn(&ChannelEvent)>;
type StateObserver = Rc<dyn Fn(ConnectionState)>;

struct Subscriber {
    topic: String,
    callback: Callback,
}

struct Inner {
    config: ChannelConfig,
    connector: Box<dyn Connector>,
    scheduler: Box<dyn Scheduler>,
    state: Cell<ConnectionState>,
    /// Bumped on every connect attempt; events tagged with an older value are stale
    generation: Cell<u64>,
    transport: RefCell<Option<Box<dyn Transport>>>,
    /// Closed transports whose handlers may still be on the call stack
    retired: RefCell<Vec<Box<dyn Transport>>>,
    reconnect_pending: Cell<bool>,
    /// Keyed by monotonically increasing id, so iteration is registration order
    subscribers: RefCell<BTreeMap<u64, Subscriber>>,
    next_id: Cell<u64>,
    observers: RefCell<Vec<StateObserver>>,
}

/// Handle to the shared realtime channel. Clones share one connection.
#[derive(Clone)]
pub struct RealtimeChannel {
    inner: Rc<Inner>,
}

impl RealtimeChannel {
    /// Create the channel and start connecting immediately
    pub fn connect(
        config: ChannelConfig,
        connector: Box<dyn Connector>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        let inner = Rc::new(Inner {
            config,
            connector,
            scheduler,
            state: Cell::new(ConnectionState::Closed),
            generation: Cell::new(0),
            transport: RefCell::new(None),
            retired: RefCell::new(Vec::new()),
            reconnect_pending: Cell::new(false),
            subscribers: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
            observers: RefCell::new(Vec::new()),
        });
        inner.open();

        Self { inner }
    }

    /// Register `callback` for events on `topic` (or every event for `*`).
    ///
    /// Valid while disconnected; the callback simply sees nothing until the
    /// connection is back.
    pub fn subscribe(
        &self,
        topic: impl Into<String>,
        callback: impl Fn(&ChannelEvent) + 'static,
    ) -> Subscription {
        let topic = topic.into();
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);

        self.inner.subscribers.borrow_mut().insert(
            id,
            Subscriber {
                topic: topic.clone(),
                callback: Rc::new(callback),
            },
        );
        tracing::trace!(topic = %topic, id, "Realtime subscription added");

        Subscription {
            channel: Rc::downgrade(&self.inner),
            id,
            topic,
        }
    }

    /// Whether the transport is currently open
    pub fn is_connected(&self) -> bool {
        self.inner.state.get() == ConnectionState::Open
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.get()
    }

    /// Observe connection state changes
    pub fn on_state_change(&self, observer: impl Fn(ConnectionState) + 'static) {
        self.inner.observers.borrow_mut().push(Rc::new(observer));
    }

    /// Number of live subscriptions on exactly `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .subscribers
            .borrow()
            .values()
            .filter(|s| s.topic == topic)
            .count()
    }

    pub fn url(&self) -> &str {
        &self.inner.config.url
    }
}

impl Inner {
    fn open(self: &Rc<Self>) {
        // Only reached from construction or the reconnect timer, never from
        // inside a transport handler, so retired transports can go now.
        self.retired.borrow_mut().clear();

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.set_state(ConnectionState::Connecting);
        tracing::debug!(url = %self.config.url, generation, "Opening realtime connection");

        let events = TransportEvents {
            channel: Rc::downgrade(self),
            generation,
        };
        match self.connector.open(&self.config.url, events) {
            Ok(transport) => {
                let still_current = self.generation.get() == generation
                    && self.state.get() != ConnectionState::Closed;
                if still_current {
                    *self.transport.borrow_mut() = Some(transport);
                } else {
                    // Failed while being set up; the loss is already handled
                    transport.close();
                    self.retired.borrow_mut().push(transport);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Realtime connection attempt failed");
                self.lost(generation);
            }
        }
    }

    fn lost(self: &Rc<Self>, generation: u64) {
        if generation != self.generation.get() || self.state.get() == ConnectionState::Closed {
            return;
        }
        self.set_state(ConnectionState::Closed);

        let transport = self.transport.borrow_mut().take();
        if let Some(transport) = transport {
            transport.close();
            self.retired.borrow_mut().push(transport);
        }

        self.schedule_reconnect();
    }

    fn schedule_reconnect(self: &Rc<Self>) {
        if self.reconnect_pending.replace(true) {
            return;
        }

        let delay = self.config.reconnect_delay;
        tracing::info!(delay_ms = delay.as_millis() as u64, "Realtime channel lost, reconnecting");

        let channel = Rc::downgrade(self);
        self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(inner) = channel.upgrade() {
                    inner.reconnect_pending.set(false);
                    inner.open();
                }
            }),
        );
    }

    fn set_state(&self, state: ConnectionState) {
        if self.state.replace(state) == state {
            return;
        }
        let observers: Vec<StateObserver> = self.observers.borrow().clone();
        for observer in observers {
            observer(state);
        }
    }

    fn deliver(&self, text: &str) {
        let event = match ChannelEvent::parse(text) {
            Some(event) => event,
            None => {
                tracing::debug!(len = text.len(), "Dropping malformed realtime frame");
                return;
            }
        };

        // Snapshot so callbacks may (un)subscribe freely during delivery
        let targets: Vec<(u64, Callback)> = {
            let subscribers = self.subscribers.borrow();
            let topical = subscribers.iter().filter(|(_, s)| s.topic == event.topic);
            let wildcard = subscribers
                .iter()
                .filter(|(_, s)| s.topic == WILDCARD_TOPIC && event.topic != WILDCARD_TOPIC);
            topical
                .chain(wildcard)
                .map(|(id, s)| (*id, Rc::clone(&s.callback)))
                .collect()
        };

        for (id, callback) in targets {
            let still_subscribed = self.subscribers.borrow().contains_key(&id);
            if still_subscribed {
                callback(&event);
            }
        }
    }
}

/// Reporting handle given to a transport for one connection attempt.
///
/// Reports from a superseded attempt are ignored.
#[derive(Clone)]
pub struct TransportEvents {
    channel: Weak<Inner>,
    generation: u64,
}

impl TransportEvents {
    /// The connection is open
    pub fn opened(&self) {
        if let Some(inner) = self.current() {
            inner.set_state(ConnectionState::Open);
            tracing::info!(url = %inner.config.url, "Realtime channel connected");
        }
    }

    /// A text frame arrived
    pub fn message(&self, text: &str) {
        if let Some(inner) = self.current() {
            inner.deliver(text);
        }
    }

    /// The connection closed
    pub fn closed(&self) {
        if let Some(inner) = self.channel.upgrade() {
            inner.lost(self.generation);
        }
    }

    /// The connection errored. The transport is force-closed; the close that
    /// follows does not schedule a second reconnect.
    pub fn errored(&self) {
        if let Some(inner) = self.channel.upgrade() {
            tracing::debug!(generation = self.generation, "Realtime transport error");
            inner.lost(self.generation);
        }
    }

    fn current(&self) -> Option<Rc<Inner>> {
        let inner = self.channel.upgrade()?;
        let live = inner.generation.get() == self.generation
            && inner.state.get() != ConnectionState::Closed;
        live.then_some(inner)
    }
}

/// Capability to remove one registration
#[must_use]
pub struct Subscription {
    channel: Weak<Inner>,
    id: u64,
    topic: String,
}

impl Subscription {
    /// Remove exactly this registration. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.channel.upgrade() {
            if inner.subscribers.borrow_mut().remove(&self.id).is_some() {
                tracing::trace!(topic = %self.topic, id = self.id, "Realtime subscription removed");
            }
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}
