//! CRUD operations for [`Conversation`] records.

use rusqlite::params;

use crate::database::Database;
use crate::error::{not_found, Result};
use crate::models::{Conversation, ConversationField};

impl Database {
    /// Insert a conversation, replacing any existing row with the same id.
    pub fn upsert_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO conversations
                (conversation_id, conversation_type, user_id, group_id, show_name,
                 latest_msg, latest_msg_send_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                conversation.conversation_id,
                conversation.conversation_type,
                conversation.user_id,
                conversation.group_id,
                conversation.show_name,
                conversation.latest_msg,
                conversation.latest_msg_send_time,
            ],
        )?;
        Ok(())
    }

    pub fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.conn()
            .query_row(
                "SELECT conversation_id, conversation_type, user_id, group_id, show_name,
                        latest_msg, latest_msg_send_time
                 FROM conversations
                 WHERE conversation_id = ?1",
                params![conversation_id],
                |row| {
                    Ok(Conversation {
                        conversation_id: row.get(0)?,
                        conversation_type: row.get(1)?,
                        user_id: row.get(2)?,
                        group_id: row.get(3)?,
                        show_name: row.get(4)?,
                        latest_msg: row.get(5)?,
                        latest_msg_send_time: row.get(6)?,
                    })
                },
            )
            .map_err(not_found)
    }

    /// Write every listed field of one conversation in a single statement.
    pub fn update_conversation_fields(
        &self,
        conversation_id: &str,
        fields: &[ConversationField],
    ) -> Result<()> {
        let assignments: Vec<_> = fields.iter().map(|f| (f.column(), f.to_value())).collect();
        self.update_columns(
            "conversations",
            &assignments,
            &[("conversation_id", conversation_id)],
        )
    }
}
