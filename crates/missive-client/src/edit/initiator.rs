//! Locally initiated edits.

use std::sync::Arc;

use tracing::{info, warn};

use missive_shared::protocol::EditNotification;
use missive_shared::types::{ContentType, ConversationKind, MessageStatus};

use super::gate::SyncGate;
use super::permission::check_edit_permission;
use super::processor::{EditOutcome, EditProcessor};
use crate::error::{EditError, Result};
use crate::store::EditStore;
use crate::transport::{EditRequest, EditTransport};

pub struct EditInitiator {
    login_user_id: String,
    store: Arc<dyn EditStore>,
    gate: SyncGate,
    transport: Arc<dyn EditTransport>,
    processor: Arc<EditProcessor>,
}

impl EditInitiator {
    pub fn new(
        login_user_id: String,
        store: Arc<dyn EditStore>,
        gate: SyncGate,
        transport: Arc<dyn EditTransport>,
        processor: Arc<EditProcessor>,
    ) -> Self {
        Self {
            login_user_id,
            store,
            gate,
            transport,
            processor,
        }
    }

    /// Edit a message as the logged-in user.
    ///
    /// Nothing is written locally unless the server accepts the edit.  The
    /// local result then goes through the same path as a pushed edit.
    pub async fn edit_message(
        &self,
        conversation_id: &str,
        client_msg_id: &str,
        new_content: &str,
        content_type: ContentType,
    ) -> Result<EditOutcome> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .map_err(|e| EditError::from_store(e, "conversation", conversation_id))?;

        let message = self.gate.wait_for_seq(conversation_id, client_msg_id).await?;
        if message.status != MessageStatus::SendSuccess {
            return Err(EditError::InvalidState(
                "only a successfully sent message can be edited".into(),
            ));
        }

        let kind = conversation.kind();
        let acting_for_other = message.send_id != self.login_user_id;
        let admins = if kind == Some(ConversationKind::Group) && acting_for_other {
            self.store
                .get_group_admins_and_owner(&conversation.group_id)
                .map_err(|e| EditError::upstream("store", e))?
        } else {
            Vec::new()
        };
        check_edit_permission(kind, &self.login_user_id, &message.send_id, &admins)?;

        let request = EditRequest {
            conversation_id: conversation_id.to_string(),
            seq: message.seq,
            new_content: new_content.to_string(),
            content_type,
        };
        self.transport.send_edit(&request).await.map_err(|e| {
            warn!(conversation_id, client_msg_id, seq = message.seq, error = %e, "edit rejected");
            EditError::upstream("server", e)
        })?;
        info!(conversation_id, client_msg_id, seq = message.seq, "edit accepted by server");

        let notification = EditNotification {
            conversation_id: conversation_id.to_string(),
            seq: message.seq,
            editor_user_id: self.login_user_id.clone(),
            edit_time: chrono::Utc::now().timestamp_millis(),
            session_type: conversation.conversation_type,
            client_msg_id: client_msg_id.to_string(),
            new_content: new_content.to_string(),
            content_type,
            is_admin_edit: false,
        };
        self.processor.process(&notification).await
    }
}
