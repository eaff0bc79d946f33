// Single-writer loop that owns the session context and publishes frames.

use crate::domain::{PrivateSession, Transport};
use crate::use_cases::context::{ContextConfig, SessionContext};
use crate::use_cases::types::{ClientEvent, FrameSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Wiring for one presence task.
#[derive(Debug, Clone)]
pub struct PresenceSettings {
    /// Capacity for inbound client events (server messages and UI input).
    pub event_channel_capacity: usize,
    /// Render cadence for frame snapshots.
    pub frame_interval: Duration,
    pub context: ContextConfig,
}

/// Caller-side ends of a running presence task.
pub struct PresenceHandle {
    pub events: mpsc::Sender<ClientEvent>,
    pub frames: watch::Receiver<FrameSnapshot>,
    pub session: watch::Receiver<PrivateSession>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PresenceHandle {
    /// Asks the task to stop after its current step.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            debug!(error = %e, "presence task join failed");
        }
    }
}

pub fn spawn_presence<T>(transport: T, settings: PresenceSettings) -> PresenceHandle
where
    T: Transport + 'static,
{
    let ctx = SessionContext::new(transport, settings.context);
    let (events_tx, events_rx) = mpsc::channel::<ClientEvent>(settings.event_channel_capacity);
    let (frame_tx, frame_rx) = watch::channel(ctx.snapshot());
    let (session_tx, session_rx) = watch::channel(ctx.session().clone());
    let shutdown = Arc::new(Notify::new());

    let task = tokio::spawn(presence_task(
        ctx,
        events_rx,
        frame_tx,
        session_tx,
        settings.frame_interval,
        shutdown.clone(),
    ));

    PresenceHandle {
        events: events_tx,
        frames: frame_rx,
        session: session_rx,
        shutdown,
        task,
    }
}

pub async fn presence_task<T>(
    mut ctx: SessionContext<T>,
    mut events_rx: mpsc::Receiver<ClientEvent>,
    frame_tx: watch::Sender<FrameSnapshot>,
    session_tx: watch::Sender<PrivateSession>,
    frame_interval: Duration,
    shutdown: Arc<Notify>,
) where
    T: Transport,
{
    let mut interval = tokio::time::interval(frame_interval);
    // A stalled renderer should skip frames rather than burst to catch up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.notified() => {
                info!(frames, "presence task shutting down");
                break;
            }
            at = interval.tick() => {
                let snapshot = ctx.tick(at.into_std());
                frames += 1;
                let _ = frame_tx.send(snapshot);
            }
            ev = events_rx.recv() => {
                let Some(ev) = ev else {
                    debug!(frames, "event channel closed; presence task exiting");
                    break;
                };
                ctx.handle_event(ev);
                publish_session(&session_tx, ctx.session());
            }
        }
    }
}

fn publish_session(session_tx: &watch::Sender<PrivateSession>, state: &PrivateSession) {
    session_tx.send_if_modified(|current| {
        if current == state {
            false
        } else {
            *current = state.clone();
            true
        }
    });
}
