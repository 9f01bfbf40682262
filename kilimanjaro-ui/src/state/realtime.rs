//! Realtime Connection
//!
//! Browser host for the shared [`RealtimeChannel`]: a `web_sys::WebSocket`
//! transport and a `setTimeout` scheduler. The channel itself owns the
//! reconnect and fan-out policy.

use std::cell::OnceCell;
use std::time::Duration;

use kilimanjaro::channel::{
    ChannelConfig, ChannelError, Connector, RealtimeChannel, Scheduler, Transport,
    TransportEvents,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

thread_local! {
    static CHANNEL: OnceCell<RealtimeChannel> = const { OnceCell::new() };
}

/// Opens browser WebSockets
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn open(&self, url: &str, events: TransportEvents) -> Result<Box<dyn Transport>, ChannelError> {
        let ws = WebSocket::new(url).map_err(|e| ChannelError::Connect {
            url: url.to_string(),
            reason: format!("{:?}", e),
        })?;

        // On open
        let events_clone = events.clone();
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            events_clone.opened();
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        // On message
        let events_clone = events.clone();
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Some(text) = event.data().as_string() {
                events_clone.message(&text);
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        // On close
        let events_clone = events.clone();
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            tracing::debug!(code = event.code(), reason = %event.reason(), "WebSocket closed");
            events_clone.closed();
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        // On error
        let on_error = Closure::wrap(Box::new(move |_: JsValue| {
            events.errored();
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Box::new(WebSocketTransport {
            ws,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        }))
    }
}

/// An open socket plus the handlers registered on it. The handlers live
/// exactly as long as the transport.
struct WebSocketTransport {
    ws: WebSocket,
    _on_open: Closure<dyn FnMut(JsValue)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

impl Transport for WebSocketTransport {
    fn close(&self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
        if let Err(e) = self.ws.close() {
            tracing::debug!(error = ?e, "WebSocket close failed");
        }
    }
}

/// One-shot timers on `setTimeout`
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::callback::Timeout::new(millis, task).forget();
    }
}

/// The session's realtime channel, opened on first call.
///
/// Later calls return the same connection whatever their arguments.
pub fn init_realtime(url: &str, reconnect_delay: Duration) -> RealtimeChannel {
    CHANNEL.with(|cell| {
        cell.get_or_init(|| {
            tracing::info!(%url, "Opening realtime channel");
            RealtimeChannel::connect(
                ChannelConfig::new(url).reconnect_delay(reconnect_delay),
                Box::new(WebSocketConnector),
                Box::new(TimeoutScheduler),
            )
        })
        .clone()
    })
}
