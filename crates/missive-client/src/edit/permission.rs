//! Who may edit which message.

use missive_shared::types::ConversationKind;
use missive_store::GroupMember;

use crate::error::{EditError, Result};

/// Check whether `acting_user_id` may edit a message sent by `sender_id`.
///
/// - single chat: only the sender;
/// - group chat: the sender, or any member of `group_admins` (owner/admin);
/// - anything else: nobody.
///
/// `group_admins` is only consulted for group chats.
pub fn check_edit_permission(
    kind: Option<ConversationKind>,
    acting_user_id: &str,
    sender_id: &str,
    group_admins: &[GroupMember],
) -> Result<()> {
    match kind {
        Some(ConversationKind::Single) => {
            if acting_user_id == sender_id {
                Ok(())
            } else {
                Err(EditError::PermissionDenied(
                    "only messages you sent can be edited in a single chat".into(),
                ))
            }
        }
        Some(ConversationKind::Group) => {
            let is_admin = group_admins
                .iter()
                .any(|m| m.user_id == acting_user_id && m.role_level.is_admin_or_owner());
            if acting_user_id == sender_id || is_admin {
                Ok(())
            } else {
                Err(EditError::PermissionDenied(
                    "only the sender or a group owner/admin can edit this message".into(),
                ))
            }
        }
        None => Err(EditError::PermissionDenied(
            "messages in this conversation type cannot be edited".into(),
        )),
    }
}

pub fn can_edit(
    kind: Option<ConversationKind>,
    acting_user_id: &str,
    sender_id: &str,
    group_admins: &[GroupMember],
) -> bool {
    check_edit_permission(kind, acting_user_id, sender_id, group_admins).is_ok()
}
