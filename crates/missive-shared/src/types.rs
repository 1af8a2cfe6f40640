use serde::{Deserialize, Serialize};

use crate::constants::{GROUP_CHAT_TYPE, SINGLE_CHAT_TYPE};
use crate::error::MissiveError;

/// The conversation topologies that support editing.
///
/// Conversations carry their type as an integer session type on the wire and
/// in the store; anything that does not map onto a variant here has no edit
/// capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationKind {
    Single,
    Group,
}

impl ConversationKind {
    pub fn from_session_type(session_type: i32) -> Option<Self> {
        match session_type {
            SINGLE_CHAT_TYPE => Some(Self::Single),
            GROUP_CHAT_TYPE => Some(Self::Group),
            _ => None,
        }
    }
}

/// Content type of a message payload.  Only [`ContentType::TEXT`] has a
/// structure this crate family understands; every other value is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentType(pub i32);

impl ContentType {
    pub const TEXT: Self = Self(101);
    pub const CUSTOM: Self = Self(110);

    pub fn is_text(self) -> bool {
        self == Self::TEXT
    }
}

/// Role of a user inside a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleLevel(pub i32);

impl RoleLevel {
    /// No group role (directory profiles carry none).
    pub const NONE: Self = Self(0);
    pub const MEMBER: Self = Self(20);
    pub const ADMIN: Self = Self(60);
    pub const OWNER: Self = Self(100);

    pub fn is_admin_or_owner(self) -> bool {
        self == Self::ADMIN || self == Self::OWNER
    }
}

// ---------------------------------------------------------------------------
// Send status state machine
// ---------------------------------------------------------------------------

/// Delivery status of a locally stored message.
///
/// ```text
/// Sending ──► SendSuccess   (seq assigned exactly once, at this transition)
///    │  ▲
///    ▼  │ retry
/// SendFailed
/// ```
///
/// `SendSuccess` is terminal.  A message only carries a server sequence
/// number once it reaches `SendSuccess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum MessageStatus {
    Sending,
    SendSuccess,
    SendFailed,
}

impl MessageStatus {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Sending => 1,
            Self::SendSuccess => 2,
            Self::SendFailed => 3,
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (Self::Sending, Self::SendSuccess)
                | (Self::Sending, Self::SendFailed)
                | (Self::SendFailed, Self::Sending)
        )
    }
}

impl TryFrom<i32> for MessageStatus {
    type Error = MissiveError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Sending),
            2 => Ok(Self::SendSuccess),
            3 => Ok(Self::SendFailed),
            other => Err(MissiveError::UnknownStatus(other)),
        }
    }
}

impl From<MessageStatus> for i32 {
    fn from(status: MessageStatus) -> Self {
        status.as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_kind_from_session_type() {
        assert_eq!(
            ConversationKind::from_session_type(1),
            Some(ConversationKind::Single)
        );
        assert_eq!(
            ConversationKind::from_session_type(3),
            Some(ConversationKind::Group)
        );
        assert_eq!(ConversationKind::from_session_type(4), None);
    }

    #[test]
    fn test_status_transitions() {
        use MessageStatus::*;
        assert!(Sending.can_transition_to(SendSuccess));
        assert!(Sending.can_transition_to(SendFailed));
        assert!(SendFailed.can_transition_to(Sending));
        assert!(!SendSuccess.can_transition_to(Sending));
        assert!(!SendSuccess.can_transition_to(SendFailed));
        assert!(!SendFailed.can_transition_to(SendSuccess));
    }

    #[test]
    fn test_status_serializes_as_integer() {
        let json = serde_json::to_string(&MessageStatus::SendSuccess).unwrap();
        assert_eq!(json, "2");
        let status: MessageStatus = serde_json::from_str("3").unwrap();
        assert_eq!(status, MessageStatus::SendFailed);
        assert!(serde_json::from_str::<MessageStatus>("9").is_err());
    }

    #[test]
    fn test_admin_roles() {
        assert!(RoleLevel::OWNER.is_admin_or_owner());
        assert!(RoleLevel::ADMIN.is_admin_or_owner());
        assert!(!RoleLevel::MEMBER.is_admin_or_owner());
        assert!(!RoleLevel::NONE.is_admin_or_owner());
    }
}
