// Session context: the single owner of presence, private-session and view state.

use crate::domain::systems::{CameraProjector, InterpolationEngine, MinimapProjector};
use crate::domain::tuning::{CameraTuning, InterpolationTuning, MinimapTuning};
use crate::domain::{
    InputIntentMapper, MovementIntent, Outbound, PresenceModel, PrivateSession,
    PrivateSessionMachine, SPAWN_POINT, ServerEvent, SessionSignal, Transport, Viewport,
};
use crate::use_cases::types::{ClientEvent, FrameSnapshot, PartnerView, RenderedAvatar};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Display value used when a referenced participant is not in the roster.
pub const PARTNER_PLACEHOLDER: &str = "Partner";

#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub display_name: String,
    pub viewport: Viewport,
    pub interpolation: InterpolationTuning,
    pub camera: CameraTuning,
    pub minimap: MinimapTuning,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            display_name: "Guest".to_string(),
            viewport: Viewport::new(1280.0, 720.0),
            interpolation: InterpolationTuning::default(),
            camera: CameraTuning::default(),
            minimap: MinimapTuning::default(),
        }
    }
}

pub struct SessionContext<T> {
    transport: T,
    presence: PresenceModel,
    session: PrivateSessionMachine,
    input: InputIntentMapper,
    interpolation: InterpolationEngine,
    camera: CameraProjector,
    minimap: MinimapProjector,
    viewport: Viewport,
    room_code: Option<String>,
}

impl<T> SessionContext<T>
where
    T: Transport,
{
    pub fn new(transport: T, config: ContextConfig) -> Self {
        Self {
            transport,
            presence: PresenceModel::new(config.display_name),
            session: PrivateSessionMachine::new(),
            input: InputIntentMapper::new(),
            interpolation: InterpolationEngine::new(config.interpolation),
            camera: CameraProjector::new(config.camera),
            minimap: MinimapProjector::new(config.minimap),
            viewport: config.viewport,
            room_code: None,
        }
    }

    pub fn session(&self) -> &PrivateSession {
        self.session.state()
    }

    pub fn zoom(&self) -> f32 {
        self.camera.zoom()
    }

    pub fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Server(event) => self.handle_server_event(event),
            ClientEvent::KeyPressed {
                key,
                text_entry_focused,
            } => {
                if let Some(intent) = self.input.key_down(&key, text_entry_focused) {
                    self.send_intent(intent);
                }
            }
            ClientEvent::KeyReleased {
                key,
                text_entry_focused,
            } => {
                if let Some(intent) = self.input.key_up(&key, text_entry_focused) {
                    self.send_intent(intent);
                }
            }
            ClientEvent::FocusLost => {
                for intent in self.input.focus_lost() {
                    self.send_intent(intent);
                }
            }
            ClientEvent::Wheel { delta_y } => self.camera.apply_wheel(delta_y),
            ClientEvent::Resize { width, height } => {
                if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
                    self.viewport = Viewport::new(width, height);
                }
            }
            ClientEvent::InviteRequested { target_id } => self.request_invite(&target_id),
            ClientEvent::InviteCancelled => {
                self.session.cancel();
            }
            ClientEvent::InviteAccepted => {
                let signal = self.session.accept();
                self.send_signal(signal);
            }
            ClientEvent::InviteDeclined => {
                self.session.decline();
            }
            ClientEvent::LeaveSession => {
                let signal = self.session.leave();
                self.send_signal(signal);
            }
            ClientEvent::CameraToggled { enabled } => self.presence.set_local_camera(enabled),
            ClientEvent::VolumeSamples(samples) => self.presence.apply_volume_feed(&samples),
        }
    }

    pub fn handle_server_event(&mut self, event: ServerEvent) {
        match &event {
            ServerEvent::Welcome { room_code, .. } => {
                if let Some(code) = room_code {
                    self.room_code = Some(code.clone());
                }
                self.presence.apply(&event);
                info!(entity_id = %self.presence.me().id, "joined room");
            }
            ServerEvent::PlayerUpdate { .. }
            | ServerEvent::VideoUpdate { .. }
            | ServerEvent::WorldUpdate { .. } => {
                self.presence.apply(&event);
            }
            ServerEvent::CoffeeInvite {
                sender_id,
                sender_name,
            } => {
                if self.presence.is_local(sender_id) {
                    return;
                }
                let name = sender_name
                    .clone()
                    .or_else(|| self.presence.find(sender_id).map(|e| e.name.clone()))
                    .unwrap_or_else(|| PARTNER_PLACEHOLDER.to_string());
                if self.session.on_invite(sender_id.clone(), name) {
                    info!(sender_id = %sender_id, "coffee chat invite received");
                }
            }
            ServerEvent::CoffeeStart { partner_id } => {
                self.session.on_start(partner_id.clone());
                info!(partner_id = %partner_id, "coffee chat started");
            }
            ServerEvent::CoffeeEnded => {
                if self.session.on_ended() {
                    info!("coffee chat ended by partner");
                }
            }
        }
    }

    fn request_invite(&mut self, target_id: &str) {
        if self.presence.is_local(target_id) {
            debug!("cannot invite self");
            return;
        }
        let Some(target) = self.presence.find(target_id) else {
            warn!(target_id, "invite target not in roster; ignoring");
            return;
        };
        let name = target.name.clone();
        let signal = self.session.initiate(target_id, name);
        self.send_signal(signal);
    }

    fn send_intent(&self, intent: MovementIntent) {
        self.send(intent.into());
    }

    fn send_signal(&self, signal: Option<SessionSignal>) {
        if let Some(signal) = signal {
            self.send(signal.into());
        }
    }

    // Intents are superseded by the next keypress or tick, so failures are only logged.
    fn send(&self, msg: Outbound) {
        if let Err(e) = self.transport.send(msg.clone()) {
            warn!(error = %e, ?msg, "outbound send failed; dropping");
        }
    }

    /// Advances interpolation and recomputes the derived view.
    pub fn tick(&mut self, now: Instant) -> FrameSnapshot {
        let targets = self.presence.targets();
        self.interpolation.tick(now, &targets);
        self.snapshot()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let me = self.presence.me();
        let focus = self.interpolation.visual(&me.id).unwrap_or(SPAWN_POINT);
        let camera = self.camera.transform(focus, self.viewport);

        let visuals = self.interpolation.visuals();
        let minimap = self
            .minimap
            .project(visuals.iter().map(|(id, p)| (id.as_str(), *p)), &me.id);

        let mut avatars: Vec<RenderedAvatar> = visuals
            .iter()
            .filter_map(|(id, world)| {
                let entity = self.presence.find(id)?;
                Some(RenderedAvatar {
                    id: id.clone(),
                    name: entity.name.clone(),
                    is_me: entity.is_me,
                    world: *world,
                    screen: camera.world_to_screen(*world),
                    z_index: world.y.floor() as i64,
                    volume: entity.volume,
                    is_moving: entity.motion.is_moving,
                    facing_right: entity.motion.facing_right,
                    is_chatting: entity.motion.is_chatting,
                    is_leader: entity.is_leader,
                    camera_enabled: entity.camera_enabled,
                    has_video: entity.last_video_frame.is_some(),
                })
            })
            .collect();
        avatars.sort_by_key(|a| a.z_index);

        let session = self.session.state().clone();
        let partner = session.partner_id().map(|partner_id| {
            let entity = self.presence.find(partner_id);
            PartnerView {
                partner_id: partner_id.to_string(),
                name: entity.map_or_else(|| PARTNER_PLACEHOLDER.to_string(), |e| e.name.clone()),
                frame: entity.and_then(|e| e.last_video_frame.clone()),
            }
        });

        FrameSnapshot {
            local_id: me.id.clone(),
            room_code: self.room_code.clone(),
            camera,
            minimap,
            avatars,
            participant_count: self.presence.participant_count(),
            local_is_leader: me.is_leader,
            session,
            partner,
        }
    }
}
