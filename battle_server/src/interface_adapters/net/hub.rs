// Websocket hub: every socket receives every published message; inbound frames reach subscribers.

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::interface_adapters::protocol::TransportMessage;
use crate::interface_adapters::transport::{MessageHandler, Transport, deliver};

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub struct Hub {
    outbound: broadcast::Sender<Utf8Bytes>,
    subscribers: RwLock<Vec<MessageHandler>>,
    // true while the host is stopping; open sockets close when it flips.
    closing: watch::Sender<bool>,
}

impl Hub {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (outbound, _) = broadcast::channel(capacity);
        let (closing, _) = watch::channel(false);
        Arc::new(Self {
            outbound,
            subscribers: RwLock::new(Vec::new()),
            closing,
        })
    }

    pub fn connections(&self) -> usize {
        self.outbound.receiver_count()
    }

    pub(crate) fn open(&self) {
        self.closing.send_replace(false);
    }

    pub(crate) fn close(&self) {
        self.closing.send_replace(true);
    }

    fn receive(&self, message: TransportMessage) {
        let handlers = self.subscribers.read().clone();
        deliver(&handlers, &message);
    }
}

impl Transport for Hub {
    fn publish(&self, message: TransportMessage) {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                error!(command = %message.command_type, error = %e, "failed to serialize transport message");
                return;
            }
        };
        // Convert once and share the bytes across sockets.
        if self.outbound.send(Utf8Bytes::from(text)).is_err() {
            debug!(command = %message.command_type, "no sockets connected; message not sent");
        }
    }

    fn subscribe(&self, handler: MessageHandler) {
        self.subscribers.write().push(handler);
    }
}

pub async fn hub_ws_handler(ws: WebSocketUpgrade, State(hub): State<Arc<Hub>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let span = info_span!("conn", conn_id = %Uuid::new_v4());
        handle_socket(socket, hub).instrument(span)
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

#[derive(Default)]
struct ConnStats {
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    // Subscribe before anything else so no broadcast is missed.
    let mut outbound = hub.outbound.subscribe();
    let mut closing = hub.closing.subscribe();
    let (mut sink, mut stream) = socket.split();
    info!(connections = hub.connections(), "hub client connected");

    let mut stats = ConnStats::default();
    let mut close_frame: Option<CloseFrame> = None;
    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;
    let mut last_lag_log = Instant::now() - LOG_THROTTLE;

    if *closing.borrow() {
        close_frame = Some(going_away());
    }

    while close_frame.is_none() {
        let disconnect = tokio::select! {
            incoming = stream.next() => {
                match handle_incoming(&hub, incoming, &mut stats, &mut last_invalid_log, &mut close_frame) {
                    LoopControl::Continue => false,
                    LoopControl::Disconnect => true,
                }
            }
            outgoing = outbound.recv() => match outgoing {
                Ok(bytes) => {
                    let len = bytes.len() as u64;
                    match sink.send(Message::Text(bytes)).await {
                        Ok(()) => {
                            stats.msgs_out += 1;
                            stats.bytes_out += len;
                            false
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to send to hub client");
                            true
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    if should_log(&mut last_lag_log) {
                        warn!(missed, "hub client lagged; messages skipped");
                    }
                    false
                }
                Err(broadcast::error::RecvError::Closed) => true,
            },
            changed = closing.changed() => {
                if changed.is_err() || *closing.borrow() {
                    close_frame = Some(going_away());
                }
                close_frame.is_some()
            }
        };

        if disconnect {
            break;
        }
    }

    if let Some(frame) = close_frame.take() {
        let _ = sink.send(Message::Close(Some(frame))).await;
    }
    if let Err(e) = sink.close().await {
        debug!(error = %e, "socket close error");
    }
    debug!(
        msgs_in = stats.msgs_in,
        msgs_out = stats.msgs_out,
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        invalid_json = stats.invalid_json,
        "connection stats"
    );
    info!("hub client disconnected");
}

fn going_away() -> CloseFrame {
    CloseFrame {
        code: close_code::AWAY,
        reason: "server shutting down".into(),
    }
}

fn handle_incoming(
    hub: &Hub,
    incoming: Option<Result<Message, axum::Error>>,
    stats: &mut ConnStats,
    last_invalid_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> LoopControl {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            stats.msgs_in += 1;
            stats.bytes_in += text.len() as u64;
            match serde_json::from_str::<TransportMessage>(&text) {
                Ok(message) => {
                    hub.receive(message);
                    LoopControl::Continue
                }
                Err(e) => {
                    stats.invalid_json += 1;
                    if should_log(last_invalid_log) {
                        warn!(bytes = text.len(), error = %e, "failed to parse transport message");
                    }
                    if stats.invalid_json > MAX_INVALID_JSON {
                        *close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return LoopControl::Disconnect;
                    }
                    LoopControl::Continue
                }
            }
        }
        Some(Ok(Message::Binary(_))) => {
            *close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            LoopControl::Disconnect
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => LoopControl::Continue,
        Some(Ok(Message::Close(_))) => LoopControl::Disconnect,
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            LoopControl::Disconnect
        }
        None => {
            info!("websocket closed");
            LoopControl::Disconnect
        }
    }
}
