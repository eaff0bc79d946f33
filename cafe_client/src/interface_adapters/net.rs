// WebSocket transport: outbound queue plus the read/write loops of one connection.

use crate::domain::{Outbound, Transport, TransportError};
use crate::interface_adapters::protocol::{ClientMessage, decode_server_message};
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::ClientEvent;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, debug, info, info_span, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const LOG_THROTTLE: Duration = Duration::from_secs(2);

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

#[derive(Debug)]
pub enum NetError {
    Connect(tungstenite::Error),
    Ws(tungstenite::Error),
    Serialization(serde_json::Error),
    // The presence task stopped consuming events.
    EventsClosed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Connect(e) => write!(f, "connect failed: {e}"),
            NetError::Ws(e) => write!(f, "websocket error: {e}"),
            NetError::Serialization(e) => write!(f, "serialization error: {e}"),
            NetError::EventsClosed => write!(f, "event channel closed"),
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetError::Connect(e) | NetError::Ws(e) => Some(e),
            NetError::Serialization(e) => Some(e),
            NetError::EventsClosed => None,
        }
    }
}

/// Non-blocking sender half handed to the session context.
#[derive(Debug, Clone)]
pub struct WsTransport {
    tx: mpsc::Sender<Outbound>,
}

impl WsTransport {
    /// Creates the transport and the queue the writer drains. Messages sent before
    /// the socket connects are held in order.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Transport for WsTransport {
    fn send(&self, msg: Outbound) -> Result<(), TransportError> {
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

/// A live connection. Dropping it leaves the socket running; call `shutdown`.
pub struct Connection {
    shutdown: Arc<Notify>,
    done: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl Connection {
    /// Sends a close frame and stops both loops.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        *self.done.borrow()
    }

    /// Resolves once the connection has ended for any reason.
    pub async fn closed(&self) {
        let mut done = self.done.clone();
        // A dropped sender means the task is gone, which also counts as closed.
        let _ = done.wait_for(|done| *done).await;
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            debug!(error = %e, "connection task join failed");
        }
    }
}

#[derive(Debug, Default)]
struct ReadStats {
    msgs_in: u64,
    bytes_in: u64,
    ignored: u64,
    invalid_json: u64,
}

#[derive(Debug, Default)]
struct WriteStats {
    msgs_out: u64,
    bytes_out: u64,
}

pub async fn connect(
    url: &str,
    outbound_rx: mpsc::Receiver<Outbound>,
    events_tx: mpsc::Sender<ClientEvent>,
) -> Result<Connection, NetError> {
    let (socket, _response) = connect_async(url).await.map_err(NetError::Connect)?;
    let conn_id = rand_id();
    info!(conn_id, url, "connected to presence server");

    let (sink, stream) = socket.split();
    let shutdown = Arc::new(Notify::new());
    let (done_tx, done) = watch::channel(false);
    let span = info_span!("conn", conn_id);
    let loop_shutdown = shutdown.clone();
    let task = tokio::spawn(
        async move {
            run_connection(sink, stream, outbound_rx, events_tx, loop_shutdown).await;
            let _ = done_tx.send(true);
        }
        .instrument(span),
    );

    Ok(Connection {
        shutdown,
        done,
        task,
    })
}

async fn run_connection(
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    outbound_rx: mpsc::Receiver<Outbound>,
    events_tx: mpsc::Sender<ClientEvent>,
    shutdown: Arc<Notify>,
) {
    // Whichever side finishes first ends the connection.
    let result = tokio::select! {
        r = read_loop(stream, events_tx) => r,
        r = write_loop(sink, outbound_rx, shutdown) => r,
    };
    match result {
        Ok(()) => info!("connection closed"),
        Err(e) => warn!(error = %e, "connection ended with error"),
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    events_tx: mpsc::Sender<ClientEvent>,
) -> Result<(), NetError> {
    let mut stats = ReadStats::default();
    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;

    let result = loop {
        let Some(next) = stream.next().await else {
            break Ok(());
        };
        let text = match next {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(frame)) => {
                debug!(?frame, "server closed connection");
                break Ok(());
            }
            Ok(_) => continue,
            Err(e) => break Err(NetError::Ws(e)),
        };
        stats.msgs_in += 1;
        stats.bytes_in += text.as_str().len() as u64;

        match decode_server_message(text.as_str()) {
            Ok(Some(event)) => {
                // Awaiting here keeps delivery ordered; the socket stalls instead of dropping.
                if events_tx.send(ClientEvent::Server(event)).await.is_err() {
                    break Err(NetError::EventsClosed);
                }
            }
            Ok(None) => stats.ignored += 1,
            Err(e) => {
                stats.invalid_json += 1;
                if should_log(&mut last_invalid_log) {
                    warn!(error = %e, invalid = stats.invalid_json, "undecodable server message; dropping");
                }
            }
        }
    };

    debug!(
        msgs_in = stats.msgs_in,
        bytes_in = stats.bytes_in,
        ignored = stats.ignored,
        invalid_json = stats.invalid_json,
        "read loop finished"
    );
    result
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound_rx: mpsc::Receiver<Outbound>,
    shutdown: Arc<Notify>,
) -> Result<(), NetError> {
    let mut stats = WriteStats::default();

    let result = loop {
        let msg = tokio::select! {
            _ = shutdown.notified() => break Ok(()),
            msg = outbound_rx.recv() => msg,
        };
        let Some(msg) = msg else {
            break Ok(());
        };
        match send_message(&mut sink, &ClientMessage::from(msg)).await {
            Ok(bytes) => {
                stats.msgs_out += 1;
                stats.bytes_out += bytes as u64;
            }
            Err(e) => break Err(e),
        }
    };

    if result.is_ok() {
        // Best-effort close handshake; the server may already be gone.
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
    }
    debug!(
        msgs_out = stats.msgs_out,
        bytes_out = stats.bytes_out,
        "write loop finished"
    );
    result
}

async fn send_message(
    sink: &mut SplitSink<WsStream, Message>,
    msg: &ClientMessage,
) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    sink.send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MoveKey;

    #[test]
    fn transport_reports_backpressure_then_closed() {
        let (transport, rx) = WsTransport::channel(1);
        assert_eq!(transport.send(Outbound::KeyDown { key: MoveKey::W }), Ok(()));
        assert_eq!(
            transport.send(Outbound::KeyUp { key: MoveKey::W }),
            Err(TransportError::Backpressure)
        );
        drop(rx);
        assert_eq!(
            transport.send(Outbound::KeyUp { key: MoveKey::W }),
            Err(TransportError::Closed)
        );
    }

    #[test]
    fn queued_messages_keep_order() {
        let (transport, mut rx) = WsTransport::channel(4);
        transport
            .send(Outbound::Join {
                username: "Ada".into(),
                room_code: "TEST".into(),
            })
            .unwrap();
        transport.send(Outbound::KeyDown { key: MoveKey::A }).unwrap();
        assert!(matches!(rx.try_recv(), Ok(Outbound::Join { .. })));
        assert_eq!(rx.try_recv().ok(), Some(Outbound::KeyDown { key: MoveKey::A }));
    }

    #[test]
    fn throttle_allows_one_log_per_window() {
        let mut last = Instant::now() - LOG_THROTTLE;
        assert!(should_log(&mut last));
        assert!(!should_log(&mut last));
    }

    #[tokio::test]
    async fn connect_to_closed_port_is_a_connect_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (_transport, rx) = WsTransport::channel(4);
        let (events_tx, _events_rx) = mpsc::channel(4);
        let result = connect(&format!("ws://{addr}/ws"), rx, events_tx).await;
        assert!(matches!(result, Err(NetError::Connect(_))));
    }
}
