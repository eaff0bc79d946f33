use crate::domain::entity::EntityId;
use crate::domain::input::{MoveKey, MovementIntent};
use std::fmt;

// Messages the client hands to the transport. All sends are fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Join { username: String, room_code: String },
    KeyDown { key: MoveKey },
    KeyUp { key: MoveKey },
    CoffeeInvite { target_id: EntityId },
    CoffeeAccept { target_id: EntityId },
    CoffeeLeave { target_id: EntityId },
}

impl From<MovementIntent> for Outbound {
    fn from(intent: MovementIntent) -> Self {
        match intent {
            MovementIntent::KeyDown(key) => Outbound::KeyDown { key },
            MovementIntent::KeyUp(key) => Outbound::KeyUp { key },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    Closed,
    Backpressure,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Closed => write!(f, "transport closed"),
            TransportError::Backpressure => write!(f, "transport send queue full"),
        }
    }
}

impl std::error::Error for TransportError {}

// Port for the outbound half of the connection. Must not block the caller.
pub trait Transport: Send + Sync {
    fn send(&self, msg: Outbound) -> Result<(), TransportError>;
}
