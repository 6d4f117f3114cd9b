//! Socket.IO push channel.
//!
//! [`SocketHandle`] owns the connection and implements the `PushChannel`
//! port. Event callbacks run on the socket client's own task; the only
//! thing they do is forward the raw payload into the bridge's event
//! channel. Reconnection is driven by the supervisor loop in the app
//! layer, not by the client's own auto-reconnect.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::FutureExt as _;
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::{Event, Payload};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use meticulous_app::ports::push::PushChannel;
use meticulous_domain::error::BridgeError;
use meticulous_domain::event::{EventKind, MachineEvent};

use crate::config::MachineConfig;
use crate::error::MachineError;

/// Handle to the machine's Socket.IO connection.
#[derive(Clone)]
pub struct SocketHandle {
    url: String,
    events: mpsc::Sender<MachineEvent>,
    client: Arc<Mutex<Option<Client>>>,
    connected: Arc<AtomicBool>,
}

impl SocketHandle {
    /// Create a disconnected handle; events will flow into `events` once
    /// [`connect`](PushChannel::connect) succeeds.
    #[must_use]
    pub fn new(config: &MachineConfig, events: mpsc::Sender<MachineEvent>) -> Self {
        Self {
            url: config.base_url(),
            events,
            client: Arc::new(Mutex::new(None)),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Emit a named event to the machine.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] without a live connection, or a
    /// transport error from the client.
    pub async fn emit(&self, event: &str, payload: Value) -> Result<(), BridgeError> {
        let guard = self.client.lock().await;
        let Some(client) = guard.as_ref() else {
            return Err(BridgeError::NotConnected);
        };
        client
            .emit(event, payload)
            .await
            .map_err(MachineError::from)?;
        Ok(())
    }
}

impl PushChannel for SocketHandle {
    async fn connect(&self) -> Result<(), BridgeError> {
        // Replace any previous connection first.
        if let Some(previous) = self.client.lock().await.take() {
            self.connected.store(false, Ordering::SeqCst);
            let _ = previous.disconnect().await;
        }

        let mut builder = ClientBuilder::new(self.url.clone()).reconnect_on_disconnect(false);

        for kind in EventKind::ALL {
            let events = self.events.clone();
            builder = builder.on(kind.event_name(), move |payload: Payload, _: Client| {
                let events = events.clone();
                async move {
                    let Some(value) = payload_to_value(payload) else {
                        return;
                    };
                    if events.send(MachineEvent::new(kind, value)).await.is_err() {
                        tracing::debug!(event = %kind, "event channel closed, dropping event");
                    }
                }
                .boxed()
            });
        }

        let connected = Arc::clone(&self.connected);
        builder = builder.on(Event::Connect, move |_: Payload, _: Client| {
            connected.store(true, Ordering::SeqCst);
            async {}.boxed()
        });
        let connected = Arc::clone(&self.connected);
        builder = builder.on(Event::Close, move |_: Payload, _: Client| {
            connected.store(false, Ordering::SeqCst);
            tracing::debug!("push channel closed by peer");
            async {}.boxed()
        });
        let connected = Arc::clone(&self.connected);
        builder = builder.on(Event::Error, move |payload: Payload, _: Client| {
            connected.store(false, Ordering::SeqCst);
            tracing::debug!(?payload, "push channel error");
            async {}.boxed()
        });

        let client = builder.connect().await.map_err(MachineError::from)?;
        *self.client.lock().await = Some(client);
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(err) = client.disconnect().await {
                tracing::debug!(%err, "push channel disconnect failed");
            }
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Reduce a Socket.IO payload to one JSON value.
///
/// Single-argument events unwrap to the argument itself; multi-argument
/// events stay an array (the tolerant field accessors handle both).
/// Binary payloads are dropped.
#[allow(deprecated)]
fn payload_to_value(payload: Payload) -> Option<Value> {
    match payload {
        Payload::Text(mut values) => match values.len() {
            0 => Some(Value::Null),
            1 => Some(values.remove(0)),
            _ => Some(Value::Array(values)),
        },
        Payload::String(raw) => {
            Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
        }
        Payload::Binary(_) => None,
    }
}
