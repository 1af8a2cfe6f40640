//! The message edit engine.
//!
//! [`EditEngine`] wires the sync-wait gate, permission check, identity
//! resolution, cache maintenance and listener delivery around the injected
//! collaborators.

pub mod cache;
pub mod gate;
pub mod initiator;
pub mod listener;
pub mod permission;
pub mod processor;
pub mod resolver;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use missive_shared::protocol::{decode_edit_notification, EditNotification};
use missive_shared::types::ContentType;

use crate::config::EditConfig;
use crate::directory::{GroupService, UserDirectory};
use crate::error::Result;
use crate::send_state::SendTracker;
use crate::store::EditStore;
use crate::transport::EditTransport;

pub use cache::{CacheRefresh, ConversationChanged, LatestMessageCache};
pub use gate::SyncGate;
pub use initiator::EditInitiator;
pub use listener::{EditedPayload, ListenerDispatcher, MessageEditedListener};
pub use permission::{can_edit, check_edit_permission};
pub use processor::{EditOutcome, EditProcessor};
pub use resolver::{EditorIdentity, EditorLookup, IdentityResolver};

/// Everything the engine depends on.
pub struct Collaborators {
    pub store: Arc<dyn EditStore>,
    pub tracker: Arc<SendTracker>,
    pub directory: Arc<dyn UserDirectory>,
    pub groups: Arc<dyn GroupService>,
    pub transport: Arc<dyn EditTransport>,
    pub listener: Arc<dyn MessageEditedListener>,
    /// Receives a signal whenever a conversation's latest message changes.
    pub conversation_changes: Option<mpsc::UnboundedSender<ConversationChanged>>,
}

pub struct EditEngine {
    initiator: EditInitiator,
    processor: Arc<EditProcessor>,
}

impl EditEngine {
    /// Build the engine.  Spawns the listener delivery task, so this must be
    /// called within a Tokio runtime.
    pub fn new(config: &EditConfig, login_user_id: impl Into<String>, c: Collaborators) -> Self {
        let login_user_id = login_user_id.into();
        debug!(login_user_id = %login_user_id, "creating edit engine");

        let processor = Arc::new(EditProcessor::new(
            c.store.clone(),
            IdentityResolver::new(c.store.clone(), c.directory, c.groups),
            LatestMessageCache::new(
                c.store.clone(),
                c.conversation_changes,
                config.recent_fetch_limit,
            ),
            ListenerDispatcher::spawn(c.listener),
        ));
        let gate = SyncGate::new(c.store.clone(), c.tracker, config.sync_wait_timeout);
        let initiator = EditInitiator::new(
            login_user_id,
            c.store,
            gate,
            c.transport,
            processor.clone(),
        );

        Self {
            initiator,
            processor,
        }
    }

    /// Edit a message as the logged-in user.
    pub async fn edit_message(
        &self,
        conversation_id: &str,
        client_msg_id: &str,
        new_content: &str,
        content_type: ContentType,
    ) -> Result<EditOutcome> {
        self.initiator
            .edit_message(conversation_id, client_msg_id, new_content, content_type)
            .await
    }

    /// Apply an already decoded edit notification.
    pub async fn process_notification(&self, notification: &EditNotification) -> Result<EditOutcome> {
        self.processor.process(notification).await
    }

    /// Decode and apply a raw edit notification payload.
    pub async fn handle_notification(&self, payload: &[u8]) -> Result<EditOutcome> {
        let notification = decode_edit_notification(payload)?;
        self.processor.process(&notification).await
    }

    pub fn processor(&self) -> Arc<EditProcessor> {
        self.processor.clone()
    }
}
