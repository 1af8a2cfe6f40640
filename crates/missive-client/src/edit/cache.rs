//! Latest-message cache maintenance.
//!
//! A conversation caches a JSON snapshot of its head message.  When the head
//! is edited the snapshot is rebuilt from the store.  A failed refresh leaves
//! the old snapshot in place: stale is better than missing.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use missive_store::ConversationField;

use crate::error::{EditError, Result};
use crate::store::EditStore;

/// Signal to the conversation list that a conversation needs re-rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationChanged {
    pub conversation_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheRefresh {
    /// The edited message was the head; the snapshot was rebuilt.
    Refreshed,
    /// The edited message was not the head; nothing changed.
    NotHead,
}

/// The part of a cached snapshot needed to recognise the head.  Snapshots
/// written by older clients may lack most message fields.
#[derive(Deserialize)]
struct SnapshotHead {
    #[serde(default)]
    seq: i64,
}

pub struct LatestMessageCache {
    store: Arc<dyn EditStore>,
    changes: Option<mpsc::UnboundedSender<ConversationChanged>>,
    recent_limit: u32,
}

impl LatestMessageCache {
    pub fn new(
        store: Arc<dyn EditStore>,
        changes: Option<mpsc::UnboundedSender<ConversationChanged>>,
        recent_limit: u32,
    ) -> Self {
        Self {
            store,
            changes,
            recent_limit: recent_limit.max(1),
        }
    }

    /// Rebuild the conversation's snapshot if `edited_seq` is its head.
    pub fn refresh_if_head(&self, conversation_id: &str, edited_seq: i64) -> Result<CacheRefresh> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .map_err(|e| EditError::from_store(e, "conversation", conversation_id))?;

        let head_seq = match serde_json::from_str::<SnapshotHead>(&conversation.latest_msg) {
            Ok(head) => head.seq,
            Err(e) => {
                debug!(conversation_id, error = %e, "latest message snapshot unreadable");
                return Ok(CacheRefresh::NotHead);
            }
        };
        if head_seq != edited_seq {
            return Ok(CacheRefresh::NotHead);
        }

        // Newest by recency, not the edited seq: a newer message may have landed.
        let newest = self
            .store
            .get_recent_messages(conversation_id, self.recent_limit)
            .map_err(|e| EditError::upstream("store", e))?
            .into_iter()
            .next()
            .ok_or_else(|| EditError::not_found("recent message", conversation_id))?;

        let snapshot = serde_json::to_string(&newest)?;
        self.store
            .update_conversation_fields(
                conversation_id,
                &[
                    ConversationField::LatestMsg(snapshot),
                    ConversationField::LatestMsgSendTime(newest.send_time),
                ],
            )
            .map_err(|e| EditError::from_store(e, "conversation", conversation_id))?;

        debug!(conversation_id, seq = newest.seq, "latest message snapshot refreshed");
        self.notify(conversation_id);
        Ok(CacheRefresh::Refreshed)
    }

    fn notify(&self, conversation_id: &str) {
        let Some(tx) = &self.changes else {
            return;
        };
        let signal = ConversationChanged {
            conversation_id: conversation_id.to_string(),
        };
        if tx.send(signal).is_err() {
            warn!(conversation_id, "conversation list receiver is gone");
        }
    }
}
