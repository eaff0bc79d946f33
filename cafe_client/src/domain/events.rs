// Inbound server events after wire decoding; every payload field is optional.

use crate::domain::entity::{EntityId, VideoFrame};

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Welcome {
        id: Option<EntityId>,
        username: Option<String>,
        room_code: Option<String>,
    },
    PlayerUpdate {
        players: Vec<RosterEntry>,
    },
    VideoUpdate {
        id: EntityId,
        frame: VideoFrame,
    },
    WorldUpdate {
        positions: Vec<(EntityId, PositionUpdate)>,
    },
    CoffeeInvite {
        sender_id: EntityId,
        sender_name: Option<String>,
    },
    CoffeeStart {
        partner_id: EntityId,
    },
    CoffeeEnded,
}

/// One participant entry of a full roster broadcast.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RosterEntry {
    pub id: EntityId,
    pub username: Option<String>,
    pub is_leader: Option<bool>,
    pub camera_enabled: Option<bool>,
}

impl RosterEntry {
    pub fn new(id: impl Into<EntityId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: Some(username.into()),
            ..Self::default()
        }
    }
}

/// Per-entity slice of a world update. Missing fields keep their prior value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionUpdate {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub is_moving: Option<bool>,
    pub facing_right: Option<bool>,
    pub is_chatting: Option<bool>,
}

impl PositionUpdate {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }
}
