use std::sync::{Arc, Mutex};

use crate::domain::ports::{Outbound, Transport, TransportError};

// Transport fake that records every message handed to it.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    sent: Arc<Mutex<Vec<Outbound>>>,
    fail_with: Option<TransportError>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(error: TransportError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub(crate) fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    pub(crate) fn clear(&self) {
        self.sent.lock().expect("sent mutex poisoned").clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&self, msg: Outbound) -> Result<(), TransportError> {
        if let Some(error) = self.fail_with {
            return Err(error);
        }
        self.sent.lock().expect("sent mutex poisoned").push(msg);
        Ok(())
    }
}
