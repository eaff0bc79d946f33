// Use cases layer: the session context and the task that drives it.

pub mod context;
pub mod presence_loop;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::{ContextConfig, SessionContext};
pub use presence_loop::{PresenceHandle, PresenceSettings, presence_task, spawn_presence};
pub use types::{ClientEvent, FrameSnapshot, PartnerView, RenderedAvatar};
