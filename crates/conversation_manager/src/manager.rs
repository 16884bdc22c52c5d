use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_core::{Config, Message};
use message_store::MessageStore;
use rag_client::ResponseStreamer;
use uuid::Uuid;

use crate::error::{ConversationError, Result};
use crate::reconcile::reconcile;
use crate::throttle::SaveGate;

/// Orchestrates branch mutations over a caller-owned message log.
///
/// The log is single-writer from the UI's perspective: an in-flight
/// edit/regeneration claims its message in `in_flight`, and a second
/// operation on the same message is rejected rather than queued. This is a
/// client-side control guard, not a distributed lock.
pub struct ConversationManager {
    pub(crate) store: Arc<dyn MessageStore>,
    pub(crate) streamer: Arc<dyn ResponseStreamer>,
    pub(crate) save_gate: SaveGate,
    in_flight: Mutex<HashSet<Uuid>>,
}

impl ConversationManager {
    pub fn new(
        store: Arc<dyn MessageStore>,
        streamer: Arc<dyn ResponseStreamer>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            streamer,
            save_gate: SaveGate::new(Duration::from_millis(config.save_min_interval_ms)),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The reconciliation function, exposed to the UI layer.
    pub fn display_log(&self, raw: &[Message]) -> Vec<Message> {
        reconcile(raw)
    }

    /// Claim the single-writer slot for `message_id` for the duration of an
    /// edit or regeneration.
    pub(crate) fn begin_operation(&self, message_id: Uuid) -> Result<OperationGuard<'_>> {
        let mut in_flight = self.in_flight.lock().expect("in-flight set poisoned");
        if !in_flight.insert(message_id) {
            tracing::warn!(
                message_id = %message_id,
                "rejecting operation: another one is in flight for this message"
            );
            return Err(ConversationError::OperationInFlight(message_id));
        }
        Ok(OperationGuard {
            set: &self.in_flight,
            message_id,
        })
    }
}

/// Releases the in-flight claim when the operation ends, on every exit path.
pub(crate) struct OperationGuard<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    message_id: Uuid,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.message_id);
        }
    }
}
