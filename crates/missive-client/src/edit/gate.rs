//! Sync-wait gate: hold an edit until its target message has a seq.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use missive_shared::types::MessageStatus;
use missive_store::Message;

use crate::error::{EditError, Result};
use crate::send_state::{MessageKey, SendTracker};
use crate::store::EditStore;

pub struct SyncGate {
    store: Arc<dyn EditStore>,
    tracker: Arc<SendTracker>,
    timeout: Duration,
}

impl SyncGate {
    pub fn new(store: Arc<dyn EditStore>, tracker: Arc<SendTracker>, timeout: Duration) -> Self {
        Self {
            store,
            tracker,
            timeout,
        }
    }

    /// Wait until the message leaves `Sending` and return its latest stored
    /// form.
    ///
    /// A message that failed to send is returned as-is; callers check the
    /// status.  A message still `Sending` after the timeout yields
    /// [`EditError::NotSynced`].
    pub async fn wait_for_seq(&self, conversation_id: &str, client_msg_id: &str) -> Result<Message> {
        let message = self.load(conversation_id, client_msg_id)?;
        if message.status != MessageStatus::Sending {
            return settled(message);
        }

        debug!(conversation_id, client_msg_id, "waiting for send acknowledgement");

        let key = MessageKey::new(conversation_id, client_msg_id);
        let mut rx = self.tracker.subscribe(&key);
        let deadline = Instant::now() + self.timeout;

        let outcome = loop {
            // Re-read after subscribing: the transition may already be stored.
            let message = match self.load(conversation_id, client_msg_id) {
                Ok(m) => m,
                Err(e) => break Err(e),
            };
            if message.status != MessageStatus::Sending {
                break settled(message);
            }

            match timeout_at(deadline, rx.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_closed)) => {
                    break self
                        .load(conversation_id, client_msg_id)
                        .and_then(|m| match m.status {
                            MessageStatus::Sending => Err(not_synced(client_msg_id)),
                            _ => settled(m),
                        });
                }
                Err(_elapsed) => {
                    warn!(
                        conversation_id,
                        client_msg_id,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "message not acknowledged before timeout"
                    );
                    break Err(not_synced(client_msg_id));
                }
            }
        };

        drop(rx);
        self.tracker.release(&key);
        outcome
    }

    fn load(&self, conversation_id: &str, client_msg_id: &str) -> Result<Message> {
        self.store
            .get_message(conversation_id, client_msg_id)
            .map_err(|e| EditError::from_store(e, "message", client_msg_id))
    }
}

/// A `SendSuccess` message without a seq breaks the state machine contract.
fn settled(message: Message) -> Result<Message> {
    if message.status == MessageStatus::SendSuccess && message.seq <= 0 {
        return Err(not_synced(&message.client_msg_id));
    }
    Ok(message)
}

fn not_synced(client_msg_id: &str) -> EditError {
    EditError::NotSynced {
        client_msg_id: client_msg_id.to_string(),
    }
}
