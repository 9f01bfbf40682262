//! Realtime Event Channel
//!
//! One shared, self-healing connection to the backend's event stream with
//! topic-based fan-out.

pub mod messages;
pub mod realtime;

pub use messages::{ws_url, ChannelEvent, WILDCARD_TOPIC};
pub use realtime::{
    ChannelConfig, ChannelError, ConnectionState, Connector, RealtimeChannel, Scheduler,
    Subscription, Transport, TransportEvents, DEFAULT_RECONNECT_DELAY,
};
