use serde::{Deserialize, Serialize};

use crate::error::MissiveError;
use crate::types::{ContentType, RoleLevel};

/// Generic envelope every server-pushed notification arrives in.  `detail`
/// holds the JSON of the notification-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationElem {
    pub detail: String,
}

/// Server-pushed notice that a delivered message's content changed.
///
/// `seq` addresses the edited message, not the notification itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditNotification {
    #[serde(rename = "conversationID")]
    pub conversation_id: String,
    pub seq: i64,
    #[serde(rename = "editorUserID")]
    pub editor_user_id: String,
    /// Milliseconds since the Unix epoch.
    pub edit_time: i64,
    pub session_type: i32,
    /// Only set for edits initiated by this client.
    #[serde(rename = "clientMsgID", default, skip_serializing_if = "String::is_empty")]
    pub client_msg_id: String,
    pub new_content: String,
    pub content_type: ContentType,
    /// Set by the server when the edit was authorised through group
    /// owner/admin privilege rather than message ownership.
    #[serde(default)]
    pub is_admin_edit: bool,
}

impl EditNotification {
    /// Reject notifications that cannot address a message.
    pub fn validate(&self) -> Result<(), MissiveError> {
        if self.conversation_id.is_empty() {
            return Err(MissiveError::InvalidNotification(
                "missing conversationID".into(),
            ));
        }
        if self.seq <= 0 {
            return Err(MissiveError::InvalidNotification(format!(
                "invalid seq {}",
                self.seq
            )));
        }
        if self.editor_user_id.is_empty() {
            return Err(MissiveError::InvalidNotification(
                "missing editorUserID".into(),
            ));
        }
        Ok(())
    }
}

/// Unwrap a raw notification payload into a validated [`EditNotification`].
pub fn decode_edit_notification(payload: &[u8]) -> Result<EditNotification, MissiveError> {
    let elem: NotificationElem = serde_json::from_slice(payload)?;
    let notification: EditNotification = serde_json::from_str(&elem.detail)?;
    notification.validate()?;
    Ok(notification)
}

/// Wrap an [`EditNotification`] in the notification envelope.
pub fn encode_edit_notification(notification: &EditNotification) -> Result<Vec<u8>, MissiveError> {
    let elem = NotificationElem {
        detail: serde_json::to_string(notification)?,
    };
    Ok(serde_json::to_vec(&elem)?)
}

/// Audit record of the most recent edit, persisted in a message's `ex` field.
///
/// Carries a snapshot of the original sender so the UI can render
/// "edited by X, originally sent by Y".  No history is kept: each edit
/// replaces the previous record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAudit {
    #[serde(rename = "editorID")]
    pub editor_id: String,
    pub editor_role: RoleLevel,
    pub editor_nickname: String,
    #[serde(rename = "clientMsgID")]
    pub client_msg_id: String,
    pub edit_time: i64,
    pub source_message_send_time: i64,
    #[serde(rename = "sourceMessageSendID")]
    pub source_message_send_id: String,
    pub source_message_sender_nickname: String,
    pub session_type: i32,
    pub seq: i64,
    pub new_content: String,
    pub content_type: ContentType,
    pub is_admin_edit: bool,
}

/// Body of a text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextElem {
    pub content: String,
}

impl TextElem {
    /// Serialize `content` into the text message body format.
    pub fn wrap(content: &str) -> Result<String, MissiveError> {
        Ok(serde_json::to_string(&TextElem {
            content: content.to_string(),
        })?)
    }

    pub fn parse(body: &str) -> Result<Self, MissiveError> {
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> EditNotification {
        EditNotification {
            conversation_id: "si_alice_bob".into(),
            seq: 10,
            editor_user_id: "alice".into(),
            edit_time: 1_700_000_000_000,
            session_type: 1,
            client_msg_id: String::new(),
            new_content: "hello world".into(),
            content_type: ContentType::TEXT,
            is_admin_edit: false,
        }
    }

    #[test]
    fn test_decode_wire_payload() {
        let detail = r#"{"conversationID":"sg_team","seq":7,"editorUserID":"u2","editTime":5,"sessionType":3,"newContent":"x","contentType":101,"isAdminEdit":true}"#;
        let payload = serde_json::to_vec(&NotificationElem {
            detail: detail.to_string(),
        })
        .unwrap();

        let decoded = decode_edit_notification(&payload).unwrap();
        assert_eq!(decoded.conversation_id, "sg_team");
        assert_eq!(decoded.seq, 7);
        assert_eq!(decoded.editor_user_id, "u2");
        assert!(decoded.is_admin_edit);
        assert!(decoded.client_msg_id.is_empty());
    }

    #[test]
    fn test_encode_produces_envelope() {
        let bytes = encode_edit_notification(&notification()).unwrap();
        let elem: NotificationElem = serde_json::from_slice(&bytes).unwrap();
        assert!(elem.detail.contains("\"conversationID\":\"si_alice_bob\""));
        assert_eq!(decode_edit_notification(&bytes).unwrap(), notification());
    }

    #[test]
    fn test_decode_rejects_malformed_detail() {
        let payload = br#"{"detail":"{not json"}"#;
        assert!(matches!(
            decode_edit_notification(payload),
            Err(MissiveError::Serialization(_))
        ));
        assert!(decode_edit_notification(b"garbage").is_err());
    }

    #[test]
    fn test_decode_rejects_unaddressable_notification() {
        let mut n = notification();
        n.seq = 0;
        let bytes = encode_edit_notification(&n).unwrap();
        assert!(matches!(
            decode_edit_notification(&bytes),
            Err(MissiveError::InvalidNotification(_))
        ));
    }

    #[test]
    fn test_text_elem_wrap() {
        let body = TextElem::wrap("hello world").unwrap();
        assert_eq!(body, r#"{"content":"hello world"}"#);
        assert_eq!(TextElem::parse(&body).unwrap().content, "hello world");
    }
}
