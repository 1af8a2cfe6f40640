//! Transition API of the message send state machine.
//!
//! The send pipeline reports progress through [`SendTracker`]; the edit
//! engine's sync-wait gate subscribes to it.  Every transition is persisted
//! before waiters are woken, so a woken waiter always observes the new state
//! in the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use missive_shared::types::MessageStatus;
use missive_store::MessageField;

use crate::error::{EditError, Result};
use crate::store::EditStore;

/// Identifies a message by its client-local id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub conversation_id: String,
    pub client_msg_id: String,
}

impl MessageKey {
    pub fn new(conversation_id: impl Into<String>, client_msg_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            client_msg_id: client_msg_id.into(),
        }
    }
}

/// Progress of an in-flight send as seen by waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendProgress {
    Pending,
    Succeeded { seq: i64 },
    Failed,
}

pub struct SendTracker {
    store: Arc<dyn EditStore>,
    inflight: Mutex<HashMap<MessageKey, watch::Sender<SendProgress>>>,
}

impl SendTracker {
    pub fn new(store: Arc<dyn EditStore>) -> Self {
        Self {
            store,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// A send of `key` is in flight.  Moves a failed message back to
    /// `Sending` when retried.
    pub fn begin(&self, key: &MessageKey) -> Result<()> {
        let message = self
            .store
            .get_message(&key.conversation_id, &key.client_msg_id)
            .map_err(|e| EditError::from_store(e, "message", &key.client_msg_id))?;

        match message.status {
            MessageStatus::Sending => {}
            status if status.can_transition_to(MessageStatus::Sending) => {
                self.store
                    .update_message_fields(
                        &key.conversation_id,
                        &key.client_msg_id,
                        &[MessageField::Status(MessageStatus::Sending)],
                    )
                    .map_err(|e| EditError::from_store(e, "message", &key.client_msg_id))?;
            }
            status => {
                return Err(EditError::InvalidState(format!(
                    "cannot resend message {} in status {status:?}",
                    key.client_msg_id
                )));
            }
        }

        self.with_inflight(|inflight| {
            inflight
                .entry(key.clone())
                .and_modify(|tx| {
                    tx.send_replace(SendProgress::Pending);
                })
                .or_insert_with(|| watch::channel(SendProgress::Pending).0);
        });
        debug!(client_msg_id = %key.client_msg_id, "send started");
        Ok(())
    }

    /// The server acknowledged the send and assigned `seq`.
    ///
    /// Assigning the same seq twice is a no-op; assigning a different one is
    /// rejected.
    pub fn complete(&self, key: &MessageKey, seq: i64) -> Result<()> {
        if seq <= 0 {
            return Err(EditError::InvalidState(format!(
                "seq must be positive, got {seq}"
            )));
        }

        let message = self
            .store
            .get_message(&key.conversation_id, &key.client_msg_id)
            .map_err(|e| EditError::from_store(e, "message", &key.client_msg_id))?;

        match message.status {
            MessageStatus::SendSuccess if message.seq == seq => return Ok(()),
            MessageStatus::SendSuccess => {
                return Err(EditError::InvalidState(format!(
                    "message {} already has seq {}",
                    key.client_msg_id, message.seq
                )));
            }
            MessageStatus::SendFailed => {
                return Err(EditError::InvalidState(format!(
                    "message {} failed to send; retry before completing",
                    key.client_msg_id
                )));
            }
            MessageStatus::Sending => {}
        }

        self.store
            .update_message_fields(
                &key.conversation_id,
                &key.client_msg_id,
                &[
                    MessageField::Status(MessageStatus::SendSuccess),
                    MessageField::Seq(seq),
                ],
            )
            .map_err(|e| EditError::from_store(e, "message", &key.client_msg_id))?;

        self.resolve(key, SendProgress::Succeeded { seq });
        debug!(client_msg_id = %key.client_msg_id, seq, "send acknowledged");
        Ok(())
    }

    /// The send pipeline gave up on `key`.
    pub fn fail(&self, key: &MessageKey) -> Result<()> {
        let message = self
            .store
            .get_message(&key.conversation_id, &key.client_msg_id)
            .map_err(|e| EditError::from_store(e, "message", &key.client_msg_id))?;

        if !message.status.can_transition_to(MessageStatus::SendFailed) {
            return Err(EditError::InvalidState(format!(
                "cannot fail message {} in status {:?}",
                key.client_msg_id, message.status
            )));
        }

        self.store
            .update_message_fields(
                &key.conversation_id,
                &key.client_msg_id,
                &[MessageField::Status(MessageStatus::SendFailed)],
            )
            .map_err(|e| EditError::from_store(e, "message", &key.client_msg_id))?;

        self.resolve(key, SendProgress::Failed);
        warn!(client_msg_id = %key.client_msg_id, "send failed");
        Ok(())
    }

    /// Subscribe to progress updates for `key`, registering it as pending if
    /// no send is tracked yet.  The caller must re-read the store after
    /// subscribing: a transition persisted before the subscription is not
    /// replayed.
    pub fn subscribe(&self, key: &MessageKey) -> watch::Receiver<SendProgress> {
        self.with_inflight(|inflight| {
            inflight
                .entry(key.clone())
                .or_insert_with(|| watch::channel(SendProgress::Pending).0)
                .subscribe()
        })
    }

    /// Drop a pending entry nobody is waiting on any more.
    pub fn release(&self, key: &MessageKey) {
        self.with_inflight(|inflight| {
            let idle = inflight
                .get(key)
                .is_some_and(|tx| tx.receiver_count() == 0 && *tx.borrow() == SendProgress::Pending);
            if idle {
                inflight.remove(key);
            }
        });
    }

    fn resolve(&self, key: &MessageKey, progress: SendProgress) {
        self.with_inflight(|inflight| {
            if let Some(tx) = inflight.remove(key) {
                tx.send_replace(progress);
            }
        });
    }

    fn with_inflight<T>(
        &self,
        f: impl FnOnce(&mut HashMap<MessageKey, watch::Sender<SendProgress>>) -> T,
    ) -> T {
        // The map holds no invariant a panicking holder could break.
        let mut guard = self
            .inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}
