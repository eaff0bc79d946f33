// Movement key edges to de-duplicated keydown/keyup intents.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoveKey {
    W,
    A,
    S,
    D,
}

impl MoveKey {
    /// Case-insensitive parse of a physical key name; non-movement keys yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "w" => Some(Self::W),
            "a" => Some(Self::A),
            "s" => Some(Self::S),
            "d" => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::W => "w",
            Self::A => "a",
            Self::S => "s",
            Self::D => "d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementIntent {
    KeyDown(MoveKey),
    KeyUp(MoveKey),
}

#[derive(Debug, Default)]
pub struct InputIntentMapper {
    pressed: BTreeSet<MoveKey>,
}

impl InputIntentMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed(&self) -> impl Iterator<Item = MoveKey> + '_ {
        self.pressed.iter().copied()
    }

    /// Emits a keydown only on the first press; OS key-repeat is swallowed.
    pub fn key_down(&mut self, raw: &str, text_entry_focused: bool) -> Option<MovementIntent> {
        if text_entry_focused {
            return None;
        }
        let key = MoveKey::parse(raw)?;
        self.pressed
            .insert(key)
            .then_some(MovementIntent::KeyDown(key))
    }

    pub fn key_up(&mut self, raw: &str, text_entry_focused: bool) -> Option<MovementIntent> {
        let key = MoveKey::parse(raw)?;
        let was_pressed = self.pressed.remove(&key);
        // Text focus swallows presses only. A key held before the field took focus is
        // still released, otherwise the avatar keeps walking while the user types.
        if text_entry_focused && !was_pressed {
            return None;
        }
        Some(MovementIntent::KeyUp(key))
    }

    /// Releases every held key so nothing stays stuck after the window loses focus.
    pub fn focus_lost(&mut self) -> Vec<MovementIntent> {
        std::mem::take(&mut self.pressed)
            .into_iter()
            .map(MovementIntent::KeyUp)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_presses_emit_one_keydown() {
        let mut mapper = InputIntentMapper::new();
        assert_eq!(
            mapper.key_down("w", false),
            Some(MovementIntent::KeyDown(MoveKey::W))
        );
        assert_eq!(mapper.key_down("W", false), None);
        assert_eq!(mapper.key_down("w", false), None);
        assert_eq!(mapper.pressed().collect::<Vec<_>>(), vec![MoveKey::W]);
    }

    #[test]
    fn release_emits_keyup_and_allows_next_press() {
        let mut mapper = InputIntentMapper::new();
        mapper.key_down("a", false);
        assert_eq!(
            mapper.key_up("a", false),
            Some(MovementIntent::KeyUp(MoveKey::A))
        );
        assert_eq!(
            mapper.key_down("a", false),
            Some(MovementIntent::KeyDown(MoveKey::A))
        );
    }

    #[test]
    fn non_movement_keys_are_ignored() {
        let mut mapper = InputIntentMapper::new();
        assert_eq!(mapper.key_down("q", false), None);
        assert_eq!(mapper.key_up("Enter", false), None);
    }

    #[test]
    fn text_focus_swallows_presses() {
        let mut mapper = InputIntentMapper::new();
        assert_eq!(mapper.key_down("s", true), None);
        assert_eq!(mapper.key_up("s", true), None);
        assert_eq!(mapper.pressed().count(), 0);
    }

    #[test]
    fn held_key_released_in_text_field_still_emits_keyup() {
        let mut mapper = InputIntentMapper::new();
        mapper.key_down("d", false);
        assert_eq!(
            mapper.key_up("d", true),
            Some(MovementIntent::KeyUp(MoveKey::D))
        );
    }

    #[test]
    fn focus_loss_releases_every_held_key_once() {
        let mut mapper = InputIntentMapper::new();
        mapper.key_down("w", false);

        assert_eq!(mapper.focus_lost(), vec![MovementIntent::KeyUp(MoveKey::W)]);
        assert_eq!(mapper.pressed().count(), 0);
        assert!(mapper.focus_lost().is_empty());
    }
}
