// Canonical picture of "me" and every other participant.
//
// Only inbound server events mutate membership, names, leader flags, targets and
// video frames. Local-only fields (own camera toggle, audio volume) have their
// own setters.

use crate::domain::entity::{Entity, EntityId, VideoFrame};
use crate::domain::events::{PositionUpdate, RosterEntry, ServerEvent};
use crate::domain::geometry::Vec2;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Id used for the local entity until the server assigns one.
pub const PROVISIONAL_LOCAL_ID: &str = "me";

#[derive(Debug, Clone)]
pub struct PresenceModel {
    me: Entity,
    others: BTreeMap<EntityId, Entity>,
}

impl PresenceModel {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            me: Entity::local(PROVISIONAL_LOCAL_ID, display_name),
            others: BTreeMap::new(),
        }
    }

    pub fn me(&self) -> &Entity {
        &self.me
    }

    pub fn others(&self) -> impl Iterator<Item = &Entity> {
        self.others.values()
    }

    pub fn find(&self, id: &str) -> Option<&Entity> {
        if self.me.id == id {
            Some(&self.me)
        } else {
            self.others.get(id)
        }
    }

    pub fn is_local(&self, id: &str) -> bool {
        self.me.id == id
    }

    /// Everyone in the room, including the local participant.
    pub fn participant_count(&self) -> usize {
        self.others.len() + 1
    }

    /// Applies a presence-bearing event. Returns false for events this model does not own.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::Welcome { id, username, .. } => {
                self.apply_welcome(id.as_deref(), username.as_deref());
                true
            }
            ServerEvent::PlayerUpdate { players } => {
                self.apply_roster(players);
                true
            }
            ServerEvent::VideoUpdate { id, frame } => {
                self.apply_video(id, frame.clone());
                true
            }
            ServerEvent::WorldUpdate { positions } => {
                self.apply_world(positions);
                true
            }
            ServerEvent::CoffeeInvite { .. }
            | ServerEvent::CoffeeStart { .. }
            | ServerEvent::CoffeeEnded => false,
        }
    }

    pub fn apply_welcome(&mut self, id: Option<&str>, username: Option<&str>) {
        if let Some(id) = id {
            // A roster that arrived first may already list us as a remote entity.
            self.others.remove(id);
            self.me.id = id.to_string();
        }
        if let Some(name) = username {
            self.me.name = name.to_string();
        }
        debug!(entity_id = %self.me.id, name = %self.me.name, "local identity assigned");
    }

    /// Full replace of the remote membership set.
    pub fn apply_roster(&mut self, players: &[RosterEntry]) {
        let mut previous = std::mem::take(&mut self.others);

        for entry in players {
            if entry.id == self.me.id {
                if let Some(is_leader) = entry.is_leader {
                    self.me.is_leader = is_leader;
                }
                continue;
            }
            if self.others.contains_key(&entry.id) {
                // Duplicate id within one broadcast; first entry wins.
                continue;
            }

            let mut entity = previous
                .remove(&entry.id)
                .unwrap_or_else(|| Entity::remote(entry.id.clone(), entry.id.clone()));
            if let Some(name) = &entry.username {
                entity.name = name.clone();
            }
            if let Some(is_leader) = entry.is_leader {
                entity.is_leader = is_leader;
            }
            if let Some(camera_enabled) = entry.camera_enabled {
                entity.camera_enabled = Some(camera_enabled);
            }
            self.others.insert(entry.id.clone(), entity);
        }

        if !previous.is_empty() {
            debug!(removed = previous.len(), "participants left");
        }
    }

    pub fn apply_video(&mut self, id: &str, frame: VideoFrame) {
        if self.me.id == id {
            return;
        }
        if let Some(entity) = self.others.get_mut(id) {
            entity.last_video_frame = Some(frame);
        }
    }

    /// Updates targets and motion flags for every known entity present in the map.
    pub fn apply_world(&mut self, positions: &[(EntityId, PositionUpdate)]) {
        for (id, update) in positions {
            let entity = if self.me.id == *id {
                &mut self.me
            } else if let Some(entity) = self.others.get_mut(id) {
                entity
            } else {
                // Membership only changes through roster updates.
                continue;
            };
            apply_position(entity, update);
        }
    }

    pub fn set_local_camera(&mut self, enabled: bool) {
        self.me.camera_enabled = Some(enabled);
    }

    /// Replaces every entity's volume; entities missing from the sample are silent.
    pub fn apply_volume_feed(&mut self, samples: &HashMap<EntityId, f32>) {
        let read = |id: &str| {
            samples
                .get(id)
                .copied()
                .filter(|v| v.is_finite())
                .map_or(0.0, |v| v.clamp(0.0, 1.0))
        };
        self.me.volume = read(&self.me.id);
        for entity in self.others.values_mut() {
            entity.volume = read(&entity.id);
        }
    }

    /// Current targets for every entity, defaulting to the spawn point.
    pub fn targets(&self) -> Vec<(EntityId, Vec2)> {
        std::iter::once(&self.me)
            .chain(self.others.values())
            .map(|e| (e.id.clone(), e.target_or_spawn()))
            .collect()
    }
}

fn apply_position(entity: &mut Entity, update: &PositionUpdate) {
    let finite = |v: Option<f32>| v.filter(|v| v.is_finite());
    let (x, y) = (finite(update.x), finite(update.y));
    if x.is_some() || y.is_some() {
        let current = entity.target_or_spawn();
        entity.target = Some(Vec2::new(x.unwrap_or(current.x), y.unwrap_or(current.y)));
    }
    if let Some(is_moving) = update.is_moving {
        entity.motion.is_moving = is_moving;
    }
    if let Some(facing_right) = update.facing_right {
        entity.motion.facing_right = facing_right;
    }
    if let Some(is_chatting) = update.is_chatting {
        entity.motion.is_chatting = is_chatting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn welcomed() -> PresenceModel {
        let mut model = PresenceModel::new("Ada");
        model.apply_welcome(Some("Guest100"), Some("Ada"));
        model
    }

    fn other_ids(model: &PresenceModel) -> Vec<&str> {
        model.others().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn local_entity_starts_provisional_with_camera_on() {
        let model = PresenceModel::new("Ada");
        assert_eq!(model.me().id, PROVISIONAL_LOCAL_ID);
        assert_eq!(model.me().camera_enabled, Some(true));
        assert_eq!(model.participant_count(), 1);
    }

    #[test]
    fn roster_replaces_membership_and_keeps_frames() {
        let mut model = welcomed();
        model.apply_roster(&[RosterEntry::new("A", "Alice"), RosterEntry::new("C", "Cid")]);
        model.apply_video("A", VideoFrame::new("frame-a"));

        model.apply_roster(&[RosterEntry::new("A", "Alice"), RosterEntry::new("B", "Bob")]);

        assert_eq!(other_ids(&model), vec!["A", "B"]);
        let a = model.find("A").unwrap();
        assert_eq!(a.last_video_frame, Some(VideoFrame::new("frame-a")));
        let b = model.find("B").unwrap();
        assert_eq!(b.last_video_frame, None);
        assert_eq!(b.target, None);
    }

    #[test]
    fn roster_entry_for_local_id_folds_into_me() {
        let mut model = welcomed();
        model.apply_roster(&[RosterEntry {
            is_leader: Some(true),
            ..RosterEntry::new("Guest100", "Ada")
        }]);

        assert!(model.me().is_leader);
        assert_eq!(model.others().count(), 0);
    }

    #[test]
    fn roster_preserves_camera_state_when_absent() {
        let mut model = welcomed();
        model.apply_roster(&[RosterEntry {
            camera_enabled: Some(false),
            ..RosterEntry::new("A", "Alice")
        }]);
        model.apply_roster(&[RosterEntry::new("A", "Alice")]);

        assert_eq!(model.find("A").unwrap().camera_enabled, Some(false));
    }

    #[test]
    fn roster_replay_is_idempotent() {
        let mut model = welcomed();
        let roster = [RosterEntry::new("A", "Alice"), RosterEntry::new("B", "Bob")];
        model.apply_roster(&roster);
        let first: Vec<Entity> = model.others().cloned().collect();
        model.apply_roster(&roster);
        let second: Vec<Entity> = model.others().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn roster_entry_without_name_falls_back_to_id() {
        let mut model = welcomed();
        model.apply_roster(&[RosterEntry {
            id: "X".into(),
            ..RosterEntry::default()
        }]);
        assert_eq!(model.find("X").unwrap().name, "X");
    }

    #[test]
    fn video_for_local_or_unknown_id_is_ignored() {
        let mut model = welcomed();
        model.apply_video("Guest100", VideoFrame::new("self"));
        model.apply_video("ghost", VideoFrame::new("ghost"));
        assert_eq!(model.me().last_video_frame, None);
        assert!(model.find("ghost").is_none());
    }

    #[test]
    fn world_update_moves_me_and_known_others_only() {
        let mut model = welcomed();
        model.apply_roster(&[RosterEntry::new("A", "Alice")]);

        model.apply_world(&[
            ("Guest100".into(), PositionUpdate::at(460.0, 300.0)),
            (
                "A".into(),
                PositionUpdate {
                    is_moving: Some(true),
                    facing_right: Some(false),
                    ..PositionUpdate::at(10.0, 20.0)
                },
            ),
            ("stranger".into(), PositionUpdate::at(0.0, 0.0)),
        ]);

        assert_eq!(model.me().target, Some(Vec2::new(460.0, 300.0)));
        let a = model.find("A").unwrap();
        assert_eq!(a.target, Some(Vec2::new(10.0, 20.0)));
        assert!(a.motion.is_moving);
        assert!(!a.motion.facing_right);
        assert!(model.find("stranger").is_none());
    }

    #[test]
    fn partial_world_update_keeps_missing_axis() {
        let mut model = welcomed();
        model.apply_world(&[("Guest100".into(), PositionUpdate::at(10.0, 20.0))]);
        model.apply_world(&[(
            "Guest100".into(),
            PositionUpdate {
                x: Some(50.0),
                ..PositionUpdate::default()
            },
        )]);
        assert_eq!(model.me().target, Some(Vec2::new(50.0, 20.0)));
    }

    #[test]
    fn non_finite_coordinates_are_dropped() {
        let mut model = welcomed();
        model.apply_world(&[("Guest100".into(), PositionUpdate::at(f32::NAN, 80.0))]);
        assert_eq!(model.me().target, Some(Vec2::new(400.0, 80.0)));
    }

    #[test]
    fn targets_default_to_spawn_point() {
        let mut model = welcomed();
        model.apply_roster(&[RosterEntry::new("A", "Alice")]);
        let targets = model.targets();
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|(_, t)| *t == crate::domain::SPAWN_POINT));
    }

    #[test]
    fn welcome_removes_self_from_early_roster() {
        let mut model = PresenceModel::new("Ada");
        model.apply_roster(&[RosterEntry::new("Guest100", "Ada")]);
        assert_eq!(model.others().count(), 1);

        model.apply_welcome(Some("Guest100"), None);
        assert_eq!(model.others().count(), 0);
        assert_eq!(model.me().name, "Ada");
    }

    #[test]
    fn volume_feed_clamps_and_silences_missing() {
        let mut model = welcomed();
        model.apply_roster(&[RosterEntry::new("A", "Alice"), RosterEntry::new("B", "Bob")]);
        let samples = HashMap::from([("A".to_string(), 3.0), ("Guest100".to_string(), 0.4)]);
        model.apply_volume_feed(&samples);
        assert_eq!(model.find("A").unwrap().volume, 1.0);
        assert_eq!(model.find("B").unwrap().volume, 0.0);
        assert_eq!(model.me().volume, 0.4);
    }

    #[test]
    fn coffee_events_are_not_presence_events() {
        let mut model = welcomed();
        assert!(!model.apply(&ServerEvent::CoffeeEnded));
        assert!(model.apply(&ServerEvent::PlayerUpdate { players: vec![] }));
    }
}
