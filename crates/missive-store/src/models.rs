//! Domain model structs persisted in the local database.
//!
//! Every struct derives `Serialize` and `Deserialize`; the JSON form of
//! [`Message`] is what the application layer receives and what conversations
//! cache as their latest-message snapshot.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use missive_shared::types::{ContentType, ConversationKind, MessageStatus, RoleLevel};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A chat message, keyed by `(conversation_id, client_msg_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "conversationID")]
    pub conversation_id: String,
    #[serde(rename = "clientMsgID")]
    pub client_msg_id: String,
    #[serde(rename = "serverMsgID", default)]
    pub server_msg_id: String,
    /// Server-assigned position in the conversation; `0` while unsent.
    #[serde(default)]
    pub seq: i64,
    pub status: MessageStatus,
    #[serde(rename = "sendID")]
    pub send_id: String,
    #[serde(rename = "recvID", default)]
    pub recv_id: String,
    #[serde(default)]
    pub sender_nickname: String,
    #[serde(rename = "senderFaceURL", default)]
    pub sender_face_url: String,
    pub session_type: i32,
    pub content_type: ContentType,
    /// Opaque payload interpreted according to `content_type`.
    #[serde(default)]
    pub content: String,
    /// Unix millis.
    pub send_time: i64,
    /// Unix millis.
    #[serde(default)]
    pub create_time: i64,
    /// Extension blob carrying the latest edit audit record.
    #[serde(default)]
    pub ex: String,
}

/// A single column assignment on a message row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageField {
    Content(String),
    Ex(String),
    Status(MessageStatus),
    Seq(i64),
}

impl MessageField {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::Content(_) => "content",
            Self::Ex(_) => "ex",
            Self::Status(_) => "status",
            Self::Seq(_) => "seq",
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Content(s) | Self::Ex(s) => Value::Text(s.clone()),
            Self::Status(status) => Value::Integer(i64::from(status.as_i32())),
            Self::Seq(n) => Value::Integer(*n),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A conversation and its cached head message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(rename = "conversationID")]
    pub conversation_id: String,
    pub conversation_type: i32,
    /// Peer user for single chats.
    #[serde(rename = "userID", default)]
    pub user_id: String,
    /// Set iff this is a group conversation.
    #[serde(rename = "groupID", default)]
    pub group_id: String,
    #[serde(default)]
    pub show_name: String,
    /// JSON snapshot of the most recent [`Message`].  A cache that may be
    /// stale, never a reference.
    #[serde(default)]
    pub latest_msg: String,
    #[serde(default)]
    pub latest_msg_send_time: i64,
}

impl Conversation {
    pub fn kind(&self) -> Option<ConversationKind> {
        ConversationKind::from_session_type(self.conversation_type)
    }
}

/// A single column assignment on a conversation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationField {
    LatestMsg(String),
    LatestMsgSendTime(i64),
}

impl ConversationField {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::LatestMsg(_) => "latest_msg",
            Self::LatestMsgSendTime(_) => "latest_msg_send_time",
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::LatestMsg(s) => Value::Text(s.clone()),
            Self::LatestMsgSendTime(n) => Value::Integer(*n),
        }
    }
}

// ---------------------------------------------------------------------------
// Users and group members
// ---------------------------------------------------------------------------

/// Locally cached public profile of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub nickname: String,
    #[serde(rename = "faceURL", default)]
    pub face_url: String,
}

/// Membership of a user in a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    #[serde(rename = "groupID")]
    pub group_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub nickname: String,
    pub role_level: RoleLevel,
}
