// Use-case level inputs/outputs for the presence loop.

use crate::domain::systems::{CameraTransform, MinimapView};
use crate::domain::{EntityId, PrivateSession, ServerEvent, Vec2, VideoFrame};
use std::collections::HashMap;

/// Everything that can mutate the session, delivered in order on one channel.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Server(ServerEvent),
    KeyPressed { key: String, text_entry_focused: bool },
    KeyReleased { key: String, text_entry_focused: bool },
    FocusLost,
    Wheel { delta_y: f32 },
    Resize { width: f32, height: f32 },
    InviteRequested { target_id: EntityId },
    InviteCancelled,
    InviteAccepted,
    InviteDeclined,
    LeaveSession,
    CameraToggled { enabled: bool },
    VolumeSamples(HashMap<EntityId, f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAvatar {
    pub id: EntityId,
    pub name: String,
    pub is_me: bool,
    pub world: Vec2,
    pub screen: Vec2,
    pub z_index: i64,
    pub volume: f32,
    pub is_moving: bool,
    pub facing_right: bool,
    pub is_chatting: bool,
    pub is_leader: bool,
    pub camera_enabled: Option<bool>,
    pub has_video: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartnerView {
    pub partner_id: EntityId,
    pub name: String,
    pub frame: Option<VideoFrame>,
}

/// Derived view state, recomputed once per frame tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub local_id: EntityId,
    pub room_code: Option<String>,
    pub camera: CameraTransform,
    pub minimap: Option<MinimapView>,
    // Sorted back to front.
    pub avatars: Vec<RenderedAvatar>,
    pub participant_count: usize,
    pub local_is_leader: bool,
    pub session: PrivateSession,
    pub partner: Option<PartnerView>,
}
