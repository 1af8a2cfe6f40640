//! Delivery of edit results to the application.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use missive_shared::protocol::EditAudit;
use missive_store::Message;

/// Application callback for committed edits.  Receives the JSON of the
/// edited [`Message`], or of the [`EditAudit`] when the message could not be
/// re-read.
pub trait MessageEditedListener: Send + Sync + 'static {
    fn on_message_edited(&self, payload: String);
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EditedPayload {
    Message(Message),
    Audit(EditAudit),
}

/// Fire-and-forget delivery: payloads are queued to a background task that
/// invokes the listener, so callers never wait on the application.
#[derive(Clone)]
pub struct ListenerDispatcher {
    tx: mpsc::UnboundedSender<String>,
}

impl ListenerDispatcher {
    /// Spawn the delivery task.  Must be called within a Tokio runtime.
    pub fn spawn(listener: Arc<dyn MessageEditedListener>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                listener.on_message_edited(payload);
            }
            debug!("edit listener delivery task stopped");
        });

        Self { tx }
    }

    pub fn dispatch(&self, payload: &EditedPayload) {
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize edit payload");
                return;
            }
        };

        if self.tx.send(json).is_err() {
            warn!("edit listener delivery task is gone, dropping payload");
        }
    }
}
