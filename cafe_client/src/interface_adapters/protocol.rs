// Wire protocol DTOs and conversions for the café presence server.
// Inbound payloads are decoded leniently: a missing or mistyped field becomes `None`.

use crate::domain::{
    EntityId, Outbound, PositionUpdate, RosterEntry, ServerEvent, VideoFrame,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Messages the server pushes to the client over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // Identity assigned to this connection after join.
    Welcome(WelcomeDto),
    // Full roster broadcast.
    PlayerUpdate(PlayerListDto),
    VideoUpdate(VideoUpdateDto),
    // Authoritative positions keyed by entity id.
    WorldUpdate(WorldUpdateDto),
    CoffeeInvite(CoffeeInviteDto),
    CoffeeStart(CoffeeStartDto),
    CoffeeEnded(CoffeeEndedDto),
    // Kinds this client does not consume (room_created, audio_update, ...).
    #[serde(other)]
    Unknown,
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { username: String, room_code: String },
    #[serde(rename = "keydown")]
    KeyDown { key: &'static str },
    #[serde(rename = "keyup")]
    KeyUp { key: &'static str },
    CoffeeInvite { target_id: EntityId },
    CoffeeAccept { target_id: EntityId },
    CoffeeLeave { target_id: EntityId },
}

impl From<Outbound> for ClientMessage {
    fn from(msg: Outbound) -> Self {
        match msg {
            Outbound::Join {
                username,
                room_code,
            } => ClientMessage::Join {
                username,
                room_code,
            },
            Outbound::KeyDown { key } => ClientMessage::KeyDown { key: key.as_str() },
            Outbound::KeyUp { key } => ClientMessage::KeyUp { key: key.as_str() },
            Outbound::CoffeeInvite { target_id } => ClientMessage::CoffeeInvite { target_id },
            Outbound::CoffeeAccept { target_id } => ClientMessage::CoffeeAccept { target_id },
            Outbound::CoffeeLeave { target_id } => ClientMessage::CoffeeLeave { target_id },
        }
    }
}

/// Decodes one text frame. `Ok(None)` means the message is valid JSON but carries
/// nothing this client acts on.
pub fn decode_server_message(text: &str) -> Result<Option<ServerEvent>, serde_json::Error> {
    let msg: ServerMessage = serde_json::from_str(text)?;
    Ok(msg.into_event())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// Ids are strings on the wire, but numeric ids are accepted as their decimal form.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WelcomeDto {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub room_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerListDto {
    #[serde(default, deserialize_with = "lenient")]
    pub players: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterEntryDto {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_leader: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub camera_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoUpdateDto {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub frame: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldUpdateDto {
    #[serde(default, deserialize_with = "lenient")]
    pub players: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionDto {
    #[serde(default, deserialize_with = "lenient")]
    pub x: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    pub y: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_moving: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub facing_right: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_chatting: Option<bool>,
}

impl From<PositionDto> for PositionUpdate {
    fn from(dto: PositionDto) -> Self {
        Self {
            x: dto.x,
            y: dto.y,
            is_moving: dto.is_moving,
            facing_right: dto.facing_right,
            is_chatting: dto.is_chatting,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoffeeInviteDto {
    #[serde(default, deserialize_with = "lenient_id")]
    pub sender_id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoffeeStartDto {
    #[serde(default, deserialize_with = "lenient_id")]
    pub partner_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoffeeEndedDto {
    // Sent by the server but not needed to leave the active session.
    #[serde(default, deserialize_with = "lenient_id")]
    pub partner_id: Option<EntityId>,
}

impl ServerMessage {
    /// Converts into a domain event, or `None` when nothing actionable remains.
    pub fn into_event(self) -> Option<ServerEvent> {
        match self {
            ServerMessage::Welcome(dto) => Some(ServerEvent::Welcome {
                id: dto.id,
                username: dto.username,
                room_code: dto.room_code,
            }),
            ServerMessage::PlayerUpdate(dto) => {
                let players = dto
                    .players?
                    .into_iter()
                    .filter_map(|raw| {
                        let entry: RosterEntryDto = serde_json::from_value(raw).ok()?;
                        Some(RosterEntry {
                            id: entry.id?,
                            username: entry.username,
                            is_leader: entry.is_leader,
                            camera_enabled: entry.camera_enabled,
                        })
                    })
                    .collect();
                Some(ServerEvent::PlayerUpdate { players })
            }
            ServerMessage::VideoUpdate(dto) => {
                let (Some(id), Some(frame)) = (dto.id, dto.frame) else {
                    debug!("video update without id or frame; ignored");
                    return None;
                };
                Some(ServerEvent::VideoUpdate {
                    id,
                    frame: VideoFrame::new(frame),
                })
            }
            ServerMessage::WorldUpdate(dto) => {
                let positions = dto
                    .players?
                    .into_iter()
                    .filter_map(|(id, raw)| {
                        if !raw.is_object() {
                            return None;
                        }
                        let pos: PositionDto = serde_json::from_value(raw).ok()?;
                        Some((id, PositionUpdate::from(pos)))
                    })
                    .collect();
                Some(ServerEvent::WorldUpdate { positions })
            }
            ServerMessage::CoffeeInvite(dto) => Some(ServerEvent::CoffeeInvite {
                sender_id: dto.sender_id?,
                sender_name: dto.sender_name,
            }),
            ServerMessage::CoffeeStart(dto) => Some(ServerEvent::CoffeeStart {
                partner_id: dto.partner_id?,
            }),
            ServerMessage::CoffeeEnded(_) => Some(ServerEvent::CoffeeEnded),
            ServerMessage::Unknown => {
                debug!("unhandled server message kind");
                None
            }
        }
    }
}
