// Fake presence server for integration tests: accepts one client per instance.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

pub const WAIT: Duration = Duration::from_secs(3);

pub struct FakeServer {
    pub url: String,
    // Text frames the client sent, in order.
    received: mpsc::UnboundedReceiver<serde_json::Value>,
    // Frames to push to the client; `None` closes the socket.
    outgoing: mpsc::UnboundedSender<Option<String>>,
}

impl FakeServer {
    // Bind an ephemeral port so parallel tests never collide.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral test port");
        let addr = listener.local_addr().expect("get local addr");
        let (received_tx, received) = mpsc::unbounded_channel();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Option<String>>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept client");
            let socket = tokio_tungstenite::accept_async(stream)
                .await
                .expect("websocket handshake");
            let (mut sink, mut stream) = socket.split();

            tokio::spawn(async move {
                while let Some(Ok(msg)) = stream.next().await {
                    if let Message::Text(text) = msg {
                        let value = serde_json::from_str(text.as_str()).expect("client sent json");
                        if received_tx.send(value).is_err() {
                            break;
                        }
                    }
                }
            });

            while let Some(next) = outgoing_rx.recv().await {
                match next {
                    Some(text) => {
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        });

        Self {
            url: format!("ws://{addr}/ws"),
            received,
            outgoing,
        }
    }

    pub fn push(&self, msg: serde_json::Value) {
        self.outgoing
            .send(Some(msg.to_string()))
            .expect("fake server alive");
    }

    pub fn push_raw(&self, text: &str) {
        self.outgoing
            .send(Some(text.to_string()))
            .expect("fake server alive");
    }

    pub fn close(&self) {
        let _ = self.outgoing.send(None);
    }

    // Next frame from the client, failing the test when none arrives in time.
    pub async fn next_frame(&mut self) -> serde_json::Value {
        tokio::time::timeout(WAIT, self.received.recv())
            .await
            .expect("client frame in time")
            .expect("client connection open")
    }
}
