//! CRUD operations for [`Message`] records.

use rusqlite::params;

use missive_shared::types::{ContentType, MessageStatus};

use crate::database::Database;
use crate::error::{not_found, Result};
use crate::models::{Message, MessageField};

const MESSAGE_COLUMNS: &str = "conversation_id, client_msg_id, server_msg_id, seq, status, \
     send_id, recv_id, sender_nickname, sender_face_url, session_type, content_type, content, \
     send_time, create_time, ex";

impl Database {
    pub fn insert_message(&self, message: &Message) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT INTO messages ({MESSAGE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ),
            params![
                message.conversation_id,
                message.client_msg_id,
                message.server_msg_id,
                message.seq,
                message.status.as_i32(),
                message.send_id,
                message.recv_id,
                message.sender_nickname,
                message.sender_face_url,
                message.session_type,
                message.content_type.0,
                message.content,
                message.send_time,
                message.create_time,
                message.ex,
            ],
        )?;
        Ok(())
    }

    /// Fetch a message by its client-local identifier.
    pub fn get_message(&self, conversation_id: &str, client_msg_id: &str) -> Result<Message> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE conversation_id = ?1 AND client_msg_id = ?2"
                ),
                params![conversation_id, client_msg_id],
                row_to_message,
            )
            .map_err(not_found)
    }

    /// Fetch a message by its server-assigned sequence number.
    pub fn get_message_by_seq(&self, conversation_id: &str, seq: i64) -> Result<Message> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE conversation_id = ?1 AND seq = ?2
                     LIMIT 1"
                ),
                params![conversation_id, seq],
                row_to_message,
            )
            .map_err(not_found)
    }

    /// Most recent messages of a conversation, newest first.
    pub fn get_recent_messages(&self, conversation_id: &str, limit: u32) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE conversation_id = ?1
             ORDER BY send_time DESC, seq DESC
             LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![conversation_id, limit], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Write every listed field of one message in a single statement.
    pub fn update_message_fields(
        &self,
        conversation_id: &str,
        client_msg_id: &str,
        fields: &[MessageField],
    ) -> Result<()> {
        let assignments: Vec<_> = fields.iter().map(|f| (f.column(), f.to_value())).collect();
        self.update_columns(
            "messages",
            &assignments,
            &[
                ("conversation_id", conversation_id),
                ("client_msg_id", client_msg_id),
            ],
        )
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let status_raw: i32 = row.get(4)?;
    let status = MessageStatus::try_from(status_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Integer, Box::new(e))
    })?;

    Ok(Message {
        conversation_id: row.get(0)?,
        client_msg_id: row.get(1)?,
        server_msg_id: row.get(2)?,
        seq: row.get(3)?,
        status,
        send_id: row.get(5)?,
        recv_id: row.get(6)?,
        sender_nickname: row.get(7)?,
        sender_face_url: row.get(8)?,
        session_type: row.get(9)?,
        content_type: ContentType(row.get(10)?),
        content: row.get(11)?,
        send_time: row.get(12)?,
        create_time: row.get(13)?,
        ex: row.get(14)?,
    })
}
