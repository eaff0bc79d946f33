// Domain layer: presence state, private sessions, and per-frame view math.

pub mod entity;
pub mod events;
pub mod geometry;
pub mod input;
pub mod ports;
pub mod presence;
pub mod session;
pub mod systems;
pub mod tuning;

pub use entity::{Entity, EntityId, MotionFlags, SPAWN_POINT, VideoFrame};
pub use events::{PositionUpdate, RosterEntry, ServerEvent};
pub use geometry::{Vec2, Viewport, lerp};
pub use input::{InputIntentMapper, MoveKey, MovementIntent};
pub use ports::{Outbound, Transport, TransportError};
pub use presence::PresenceModel;
pub use session::{PrivateSession, PrivateSessionMachine, SessionSignal};
