//! Edit notification processing.
//!
//! Every edit, remote or self-initiated, lands here.  The message write is
//! the commit point: failures before it abort with no store change, failures
//! after it are logged and degrade to a best-effort outcome.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use missive_shared::protocol::{EditAudit, EditNotification, TextElem};
use missive_store::{Message, MessageField};

use super::cache::{CacheRefresh, LatestMessageCache};
use super::listener::{EditedPayload, ListenerDispatcher};
use super::resolver::{EditorIdentity, IdentityResolver};
use crate::error::{EditError, Result};
use crate::store::EditStore;

/// Result of a committed edit.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub audit: EditAudit,
    /// The re-read message, or `None` if only the audit could be delivered.
    pub message: Option<Message>,
    /// `None` if the cache refresh failed.
    pub cache: Option<CacheRefresh>,
}

pub struct EditProcessor {
    store: Arc<dyn EditStore>,
    resolver: IdentityResolver,
    cache: LatestMessageCache,
    listener: ListenerDispatcher,
}

impl EditProcessor {
    pub fn new(
        store: Arc<dyn EditStore>,
        resolver: IdentityResolver,
        cache: LatestMessageCache,
        listener: ListenerDispatcher,
    ) -> Self {
        Self {
            store,
            resolver,
            cache,
            listener,
        }
    }

    /// Apply an edit notification to the local store and notify the
    /// application.  Reprocessing the same notification rewrites identical
    /// values and dispatches again.
    pub async fn process(&self, notification: &EditNotification) -> Result<EditOutcome> {
        notification.validate()?;
        let conversation_id = notification.conversation_id.as_str();
        let seq = notification.seq;

        let original = self
            .store
            .get_message_by_seq(conversation_id, seq)
            .map_err(|e| {
                error!(conversation_id, seq, error = %e, "edit target lookup failed");
                EditError::from_store(e, "message", format!("{conversation_id}#{seq}"))
            })?;

        let editor = self.resolver.resolve(notification).await.map_err(|e| {
            error!(
                conversation_id,
                seq,
                editor = %notification.editor_user_id,
                error = %e,
                "editor resolution failed"
            );
            e
        })?;

        let audit = build_audit(notification, &original, editor);
        let content = if notification.content_type.is_text() {
            TextElem::wrap(&notification.new_content)?
        } else {
            notification.new_content.clone()
        };
        let ex = serde_json::to_string(&audit)?;

        self.store
            .update_message_fields(
                conversation_id,
                &original.client_msg_id,
                &[MessageField::Content(content), MessageField::Ex(ex)],
            )
            .map_err(|e| {
                error!(conversation_id, seq, error = %e, "edit write-back failed");
                EditError::from_store(e, "message", &original.client_msg_id)
            })?;

        info!(
            conversation_id,
            seq,
            client_msg_id = %original.client_msg_id,
            editor = %audit.editor_id,
            admin = audit.is_admin_edit,
            "message edited"
        );

        let cache = match self.cache.refresh_if_head(conversation_id, seq) {
            Ok(refresh) => Some(refresh),
            Err(e) => {
                warn!(conversation_id, seq, error = %e, "latest message cache left stale");
                None
            }
        };

        let message = match self.store.get_message_by_seq(conversation_id, seq) {
            Ok(updated) => {
                self.listener.dispatch(&EditedPayload::Message(updated.clone()));
                Some(updated)
            }
            Err(e) => {
                warn!(
                    conversation_id,
                    seq,
                    error = %e,
                    "edited message re-read failed, delivering audit only"
                );
                self.listener.dispatch(&EditedPayload::Audit(audit.clone()));
                None
            }
        };

        debug!(conversation_id, seq, "edit dispatched");
        Ok(EditOutcome {
            audit,
            message,
            cache,
        })
    }
}

fn build_audit(
    notification: &EditNotification,
    original: &Message,
    editor: EditorIdentity,
) -> EditAudit {
    EditAudit {
        editor_id: notification.editor_user_id.clone(),
        editor_role: editor.role,
        editor_nickname: editor.nickname,
        client_msg_id: original.client_msg_id.clone(),
        edit_time: notification.edit_time,
        source_message_send_time: original.send_time,
        source_message_send_id: original.send_id.clone(),
        source_message_sender_nickname: original.sender_nickname.clone(),
        session_type: notification.session_type,
        seq: notification.seq,
        new_content: notification.new_content.clone(),
        content_type: notification.content_type,
        is_admin_edit: notification.is_admin_edit,
    }
}
