//! Persistent realtime channel to a started avatar session.
//!
//! The channel owns the WebSocket connection and a background receive task.
//! Sends happen directly on the (shared) sink so outbound ordering follows
//! call order; the receive task reads with a bounded wait and resets a
//! [`Watchdog`] on every quiet interval so a task supervisor never mistakes
//! a silent channel for a hung one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace};

use super::messages::{ClientEvent, ServerEvent, deserialize_server_event, serialize_client_event};
use crate::core::avatar::base::{
    AgentStatusCallback, AgentStatusEvent, AvatarError, AvatarResult, ConnectionState,
};
use crate::utils::Watchdog;

/// Bounded wait for a single receive; on expiry the loop reports liveness
/// and reads again.
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Bidirectional control/audio channel for one avatar session.
///
/// At most one connection is open per channel; a `connect` while connected
/// is a no-op. The channel never reconnects on its own; after a receive
/// failure it stays dead until the next explicit `connect`.
pub struct RealtimeChannel {
    sink: Option<Arc<Mutex<WsSink>>>,
    connected: Arc<AtomicBool>,
    state: Arc<RwLock<ConnectionState>>,
    receive_task: Option<JoinHandle<()>>,
    connect_timeout: Duration,
    watchdog: Watchdog,
    status_callback: Option<AgentStatusCallback>,
}

impl RealtimeChannel {
    /// Create a disconnected channel.
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            sink: None,
            connected: Arc::new(AtomicBool::new(false)),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            receive_task: None,
            connect_timeout,
            watchdog: Watchdog::new(),
            status_callback: None,
        }
    }

    /// Register the callback invoked for each `agent.status` notification.
    pub fn on_agent_status(&mut self, callback: AgentStatusCallback) {
        self.status_callback = Some(callback);
    }

    /// Liveness handle reset by the receive loop; a supervisor may poll its
    /// idle time to detect a hung task.
    pub fn watchdog(&self) -> Watchdog {
        self.watchdog.clone()
    }

    /// Whether the channel currently holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
            .try_read()
            .map(|s| *s)
            .unwrap_or(ConnectionState::Disconnected)
    }

    /// Open the connection and spawn the receive loop.
    ///
    /// Best-effort: failures are logged and leave the channel disconnected
    /// rather than propagating, since a dead avatar channel should not take
    /// the surrounding pipeline down with it.
    pub async fn connect(&mut self, endpoint: &str) {
        if self.is_connected() {
            debug!("realtime channel already connected");
            return;
        }

        debug!(%endpoint, "realtime channel connecting");
        *self.state.write().await = ConnectionState::Connecting;

        let ws_stream = match timeout(self.connect_timeout, connect_async(endpoint)).await {
            Ok(Ok((stream, response))) => {
                info!(status = %response.status(), "realtime channel connected");
                stream
            }
            Ok(Err(e)) => {
                error!("realtime channel connection error: {e}");
                self.sink = None;
                *self.state.write().await = ConnectionState::Disconnected;
                return;
            }
            Err(_) => {
                error!(
                    "realtime channel connection timed out after {:?}",
                    self.connect_timeout
                );
                self.sink = None;
                *self.state.write().await = ConnectionState::Disconnected;
                return;
            }
        };

        let (ws_sink, ws_read) = ws_stream.split();
        let sink = Arc::new(Mutex::new(ws_sink));
        self.sink = Some(sink.clone());
        self.connected.store(true, Ordering::SeqCst);
        *self.state.write().await = ConnectionState::Connected;

        let connected = self.connected.clone();
        let state = self.state.clone();
        let watchdog = self.watchdog.clone();
        let status_callback = self.status_callback.clone();

        self.receive_task = Some(tokio::spawn(async move {
            Self::receive_loop(ws_read, sink, connected, state, watchdog, status_callback).await;
        }));
    }

    /// Background receive loop: bounded reads, liveness resets, dispatch.
    async fn receive_loop(
        mut ws_read: WsStream,
        sink: Arc<Mutex<WsSink>>,
        connected: Arc<AtomicBool>,
        state: Arc<RwLock<ConnectionState>>,
        watchdog: Watchdog,
        status_callback: Option<AgentStatusCallback>,
    ) {
        while connected.load(Ordering::SeqCst) {
            match timeout(RECEIVE_TIMEOUT, ws_read.next()).await {
                // Quiet channel: report liveness and keep reading.
                Err(_) => watchdog.reset(),

                Ok(Some(Ok(Message::Text(text)))) => {
                    Self::dispatch_server_event(&text, &status_callback).await;
                }

                Ok(Some(Ok(Message::Ping(data)))) => {
                    let _ = sink.lock().await.send(Message::Pong(data)).await;
                }

                Ok(Some(Ok(Message::Close(frame)))) => {
                    info!("realtime channel closed by server: {frame:?}");
                    break;
                }

                Ok(Some(Ok(_))) => {}

                Ok(Some(Err(e))) => {
                    error!("error receiving realtime message: {e}");
                    break;
                }

                Ok(None) => {
                    debug!("realtime stream ended");
                    break;
                }
            }
        }

        connected.store(false, Ordering::SeqCst);
        *state.write().await = ConnectionState::Disconnected;
        debug!("realtime receive loop ended");
    }

    /// Parse one inbound frame and route it by its `type` discriminator.
    /// Unknown kinds are logged and skipped; they never end the loop.
    async fn dispatch_server_event(text: &str, status_callback: &Option<AgentStatusCallback>) {
        match deserialize_server_event(text) {
            Ok(ServerEvent::AgentStatus(status)) => {
                info!(event_id = ?status.event_id, "received agent status: {:?}", status.payload);
                if let Some(cb) = status_callback {
                    cb(AgentStatusEvent {
                        event_type: "agent.status".to_string(),
                        payload: serde_json::Value::Object(status.payload.clone()),
                    })
                    .await;
                }
            }
            Ok(ServerEvent::Unknown) => {
                let kind = serde_json::from_str::<serde_json::Value>(text)
                    .ok()
                    .and_then(|v| v.get("type").and_then(|t| t.as_str().map(str::to_owned)));
                error!(
                    event_type = kind.as_deref().unwrap_or("<missing>"),
                    "received unknown realtime event"
                );
            }
            Err(e) => {
                error!("failed to parse realtime event: {e}");
            }
        }
    }

    /// Serialize and write one event.
    ///
    /// When disconnected the event is dropped with an error log and `Ok` is
    /// returned, since control sends are fire-and-forget; serialization and
    /// write failures propagate so audio-buffer callers can stop streaming.
    pub async fn send(&self, event: ClientEvent) -> AvatarResult<()> {
        let Some(sink) = self.sink.as_ref() else {
            error!(
                event_type = event.event_type(),
                "realtime channel not connected, dropping message"
            );
            return Ok(());
        };

        let json = serialize_client_event(&event).map_err(|e| {
            error!("failed to serialize {} event: {e}", event.event_type());
            AvatarError::SerializationError(e.to_string())
        })?;

        trace!(
            event_type = event.event_type(),
            event_id = event.event_id(),
            "sending realtime event"
        );

        sink.lock()
            .await
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| {
                error!("error sending {} event: {e}", event.event_type());
                AvatarError::WebSocketError(e.to_string())
            })
    }

    /// Close the connection and stop the receive task. Idempotent; closing a
    /// never-opened channel does nothing.
    pub async fn disconnect(&mut self) {
        self.connected.store(false, Ordering::SeqCst);

        if let Some(sink) = self.sink.take() {
            if let Err(e) = sink.lock().await.close().await {
                debug!("realtime channel close: {e}");
            }
        }

        if let Some(handle) = self.receive_task.take() {
            handle.abort();
        }

        *self.state.write().await = ConnectionState::Disconnected;
        debug!("realtime channel disconnected");
    }
}
