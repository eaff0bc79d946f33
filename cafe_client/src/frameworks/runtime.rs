// Framework bootstrap for the headless café client.

use crate::domain::{Outbound, Transport};
use crate::frameworks::config;
use crate::interface_adapters::net::{self, Connection, WsTransport};
use crate::use_cases::{
    ClientEvent, ContextConfig, FrameSnapshot, PresenceHandle, PresenceSettings, spawn_presence,
};

use std::io::{self, Result};
use tokio::sync::{mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Everything needed to join one room.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub room_code: String,
    pub outbound_channel_capacity: usize,
    pub presence: PresenceSettings,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            server_url: config::server_url(),
            room_code: config::room_code(),
            outbound_channel_capacity: config::OUTBOUND_CHANNEL_CAPACITY,
            presence: PresenceSettings {
                event_channel_capacity: config::EVENT_CHANNEL_CAPACITY,
                frame_interval: config::FRAME_INTERVAL,
                context: ContextConfig {
                    display_name: config::display_name(),
                    viewport: config::viewport(),
                    ..ContextConfig::default()
                },
            },
        }
    }
}

/// A joined room: the presence task plus the socket feeding it.
pub struct ClientSession {
    presence: PresenceHandle,
    connection: Connection,
}

impl ClientSession {
    /// Sender for UI input; server messages are fed in by the connection.
    pub fn events(&self) -> mpsc::Sender<ClientEvent> {
        self.presence.events.clone()
    }

    pub fn frames(&self) -> watch::Receiver<FrameSnapshot> {
        self.presence.frames.clone()
    }

    pub fn session(&self) -> watch::Receiver<crate::domain::PrivateSession> {
        self.presence.session.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    pub async fn closed(&self) {
        self.connection.closed().await;
    }

    /// Closes the socket, then stops the presence task.
    pub async fn shutdown(self) {
        self.connection.shutdown();
        self.connection.join().await;
        self.presence.shutdown();
        self.presence.join().await;
    }
}

/// Queues `join`, starts the presence task, then opens the socket.
pub async fn connect(config: ClientConfig) -> Result<ClientSession> {
    let (transport, outbound_rx) = WsTransport::channel(config.outbound_channel_capacity);

    // Join must be the first frame on the wire, so it is queued before anything else can send.
    let join = Outbound::Join {
        username: config.presence.context.display_name.clone(),
        room_code: config.room_code.to_uppercase(),
    };
    transport.send(join).map_err(io::Error::other)?;

    let presence = spawn_presence(transport, config.presence);
    let connection =
        match net::connect(&config.server_url, outbound_rx, presence.events.clone()).await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!(server_url = %config.server_url, error = %e, "failed to connect");
                presence.shutdown();
                presence.join().await;
                return Err(io::Error::other(e));
            }
        };

    tracing::info!(
        server_url = %config.server_url,
        room_code = %config.room_code.to_uppercase(),
        "joining room"
    );
    Ok(ClientSession {
        presence,
        connection,
    })
}

/// Runs until Ctrl-C or until the server drops the connection.
pub async fn run(session: ClientSession) -> Result<()> {
    let frames = session.frames();
    let mut session_rx = session.session();
    let mut summary = tokio::time::interval(config::SUMMARY_INTERVAL);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::error!(error = %e, "failed to listen for ctrl-c");
                }
                tracing::info!("shutdown requested");
                break;
            }
            _ = session.closed() => {
                tracing::warn!("connection closed; exiting");
                break;
            }
            changed = session_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = session_rx.borrow_and_update().clone();
                tracing::info!(?state, "private session changed");
            }
            _ = summary.tick() => {
                let frame = frames.borrow();
                tracing::debug!(
                    local_id = %frame.local_id,
                    participants = frame.participant_count,
                    avatars = frame.avatars.len(),
                    zoom = frame.camera.scale,
                    leader = frame.local_is_leader,
                    "frame"
                );
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let config = ClientConfig::from_env();
    tracing::info!(
        server_url = %config.server_url,
        room_code = %config.room_code,
        display_name = %config.presence.context.display_name,
        "starting café client"
    );

    let session = connect(config).await?;
    run(session).await
}
