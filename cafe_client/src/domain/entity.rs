// Participant records held by the presence model.

use crate::domain::geometry::Vec2;
use std::sync::Arc;

pub type EntityId = String;

/// Position used for entities the server has not placed yet.
pub const SPAWN_POINT: Vec2 = Vec2::new(400.0, 300.0);

/// Opaque handle to the latest video still for a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame(Arc<str>);

impl VideoFrame {
    pub fn new(data: impl Into<Arc<str>>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Motion flags mirrored from the latest world update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionFlags {
    pub is_moving: bool,
    pub facing_right: bool,
    pub is_chatting: bool,
}

impl Default for MotionFlags {
    fn default() -> Self {
        Self {
            is_moving: false,
            facing_right: true,
            is_chatting: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub is_me: bool,
    // Absent until the first world update naming this entity.
    pub target: Option<Vec2>,
    pub motion: MotionFlags,
    pub is_leader: bool,
    pub camera_enabled: Option<bool>,
    pub last_video_frame: Option<VideoFrame>,
    // 0.0..=1.0, replaced on every audio feed tick.
    pub volume: f32,
}

impl Entity {
    pub fn remote(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_me: false,
            target: None,
            motion: MotionFlags::default(),
            is_leader: false,
            camera_enabled: None,
            last_video_frame: None,
            volume: 0.0,
        }
    }

    pub fn local(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            is_me: true,
            camera_enabled: Some(true),
            ..Self::remote(id, name)
        }
    }

    pub fn target_or_spawn(&self) -> Vec2 {
        self.target.unwrap_or(SPAWN_POINT)
    }
}
