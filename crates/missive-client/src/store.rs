//! The store seam used by the edit engine.
//!
//! Every method is a single self-contained store call.  Implementations must
//! not hold a lock beyond the call, so no caller ever holds one across an
//! `.await`.

use std::sync::{Arc, Mutex};

use missive_store::{
    Conversation, ConversationField, Database, GroupMember, Message, MessageField,
    Result as StoreResult, StoreError, User,
};

pub trait EditStore: Send + Sync {
    fn get_message(&self, conversation_id: &str, client_msg_id: &str) -> StoreResult<Message>;

    fn get_message_by_seq(&self, conversation_id: &str, seq: i64) -> StoreResult<Message>;

    fn update_message_fields(
        &self,
        conversation_id: &str,
        client_msg_id: &str,
        fields: &[MessageField],
    ) -> StoreResult<()>;

    fn get_conversation(&self, conversation_id: &str) -> StoreResult<Conversation>;

    fn update_conversation_fields(
        &self,
        conversation_id: &str,
        fields: &[ConversationField],
    ) -> StoreResult<()>;

    fn get_recent_messages(&self, conversation_id: &str, limit: u32) -> StoreResult<Vec<Message>>;

    fn get_group_admins_and_owner(&self, group_id: &str) -> StoreResult<Vec<GroupMember>>;
}

/// A [`Database`] shared between tasks behind a mutex.
#[derive(Clone)]
pub struct SharedStore {
    db: Arc<Mutex<Database>>,
}

impl SharedStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run `f` with exclusive access to the database.
    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&guard)
    }

    pub fn get_user(&self, user_id: &str) -> StoreResult<User> {
        self.with_db(|db| db.get_user(user_id))
    }

    pub fn get_group_members(
        &self,
        group_id: &str,
        user_ids: &[String],
    ) -> StoreResult<Vec<GroupMember>> {
        self.with_db(|db| db.get_group_members(group_id, user_ids))
    }
}

impl EditStore for SharedStore {
    fn get_message(&self, conversation_id: &str, client_msg_id: &str) -> StoreResult<Message> {
        self.with_db(|db| db.get_message(conversation_id, client_msg_id))
    }

    fn get_message_by_seq(&self, conversation_id: &str, seq: i64) -> StoreResult<Message> {
        self.with_db(|db| db.get_message_by_seq(conversation_id, seq))
    }

    fn update_message_fields(
        &self,
        conversation_id: &str,
        client_msg_id: &str,
        fields: &[MessageField],
    ) -> StoreResult<()> {
        self.with_db(|db| db.update_message_fields(conversation_id, client_msg_id, fields))
    }

    fn get_conversation(&self, conversation_id: &str) -> StoreResult<Conversation> {
        self.with_db(|db| db.get_conversation(conversation_id))
    }

    fn update_conversation_fields(
        &self,
        conversation_id: &str,
        fields: &[ConversationField],
    ) -> StoreResult<()> {
        self.with_db(|db| db.update_conversation_fields(conversation_id, fields))
    }

    fn get_recent_messages(&self, conversation_id: &str, limit: u32) -> StoreResult<Vec<Message>> {
        self.with_db(|db| db.get_recent_messages(conversation_id, limit))
    }

    fn get_group_admins_and_owner(&self, group_id: &str) -> StoreResult<Vec<GroupMember>> {
        self.with_db(|db| db.get_group_admins_and_owner(group_id))
    }
}
