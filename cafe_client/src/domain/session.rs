// Private "coffee chat" lifecycle: one outgoing invite, one incoming invite, or
// one active session at a time.

use crate::domain::entity::EntityId;
use crate::domain::ports::Outbound;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrivateSession {
    #[default]
    Idle,
    OutgoingPending {
        target_id: EntityId,
        target_name: String,
    },
    IncomingPending {
        sender_id: EntityId,
        sender_name: String,
    },
    Active {
        partner_id: EntityId,
    },
}

impl PrivateSession {
    pub fn partner_id(&self) -> Option<&str> {
        match self {
            PrivateSession::Active { partner_id } => Some(partner_id),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PrivateSession::Idle)
    }
}

/// Outbound side effect of a local transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    Invite { target_id: EntityId },
    Accept { target_id: EntityId },
    Leave { target_id: EntityId },
}

impl From<SessionSignal> for Outbound {
    fn from(signal: SessionSignal) -> Self {
        match signal {
            SessionSignal::Invite { target_id } => Outbound::CoffeeInvite { target_id },
            SessionSignal::Accept { target_id } => Outbound::CoffeeAccept { target_id },
            SessionSignal::Leave { target_id } => Outbound::CoffeeLeave { target_id },
        }
    }
}

#[derive(Debug, Default)]
pub struct PrivateSessionMachine {
    state: PrivateSession,
}

impl PrivateSessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PrivateSession {
        &self.state
    }

    // Local actions. Each returns the signal to send, if the action applied.

    pub fn initiate(
        &mut self,
        target_id: impl Into<EntityId>,
        target_name: impl Into<String>,
    ) -> Option<SessionSignal> {
        if !self.state.is_idle() {
            debug!(state = ?self.state, "invite ignored; session busy");
            return None;
        }
        let target_id = target_id.into();
        self.state = PrivateSession::OutgoingPending {
            target_id: target_id.clone(),
            target_name: target_name.into(),
        };
        Some(SessionSignal::Invite { target_id })
    }

    pub fn cancel(&mut self) -> bool {
        self.reset_if(|s| matches!(s, PrivateSession::OutgoingPending { .. }))
    }

    pub fn decline(&mut self) -> bool {
        self.reset_if(|s| matches!(s, PrivateSession::IncomingPending { .. }))
    }

    /// Clears the incoming prompt. `Active` is only entered on the confirming start signal.
    pub fn accept(&mut self) -> Option<SessionSignal> {
        let PrivateSession::IncomingPending { sender_id, .. } = &self.state else {
            return None;
        };
        let target_id = sender_id.clone();
        self.state = PrivateSession::Idle;
        Some(SessionSignal::Accept { target_id })
    }

    pub fn leave(&mut self) -> Option<SessionSignal> {
        let PrivateSession::Active { partner_id } = &self.state else {
            return None;
        };
        let target_id = partner_id.clone();
        self.state = PrivateSession::Idle;
        Some(SessionSignal::Leave { target_id })
    }

    // Inbound signals. These never produce outbound traffic.

    /// Latest invite wins over any pending one; an active session is never interrupted.
    pub fn on_invite(&mut self, sender_id: impl Into<EntityId>, sender_name: impl Into<String>) -> bool {
        if matches!(self.state, PrivateSession::Active { .. }) {
            debug!("invite received during active session; ignored");
            return false;
        }
        self.state = PrivateSession::IncomingPending {
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
        };
        true
    }

    /// Unconditionally enters `Active`, discarding any pending invite.
    pub fn on_start(&mut self, partner_id: impl Into<EntityId>) {
        self.state = PrivateSession::Active {
            partner_id: partner_id.into(),
        };
    }

    pub fn on_ended(&mut self) -> bool {
        self.reset_if(|s| matches!(s, PrivateSession::Active { .. }))
    }

    fn reset_if(&mut self, pred: impl Fn(&PrivateSession) -> bool) -> bool {
        if pred(&self.state) {
            self.state = PrivateSession::Idle;
            true
        } else {
            false
        }
    }
}
