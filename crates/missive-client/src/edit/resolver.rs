//! Editor identity and role resolution.
//!
//! Each conversation kind resolves editors through its own [`EditorLookup`];
//! [`IdentityResolver`] picks the lookup for a notification.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use missive_shared::constants::UNKNOWN_EDITOR_NICKNAME;
use missive_shared::protocol::EditNotification;
use missive_shared::types::{ConversationKind, RoleLevel};

use crate::directory::{GroupService, UserDirectory};
use crate::error::{EditError, Result};
use crate::store::EditStore;

/// Who performed an edit, as recorded in the audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorIdentity {
    pub nickname: String,
    pub role: RoleLevel,
}

#[async_trait]
pub trait EditorLookup: Send + Sync {
    async fn lookup(&self, notification: &EditNotification) -> Result<EditorIdentity>;
}

/// Resolves editors through the user directory.  Profiles carry no group
/// role, so the role is always [`RoleLevel::NONE`].
pub struct DirectoryLookup {
    directory: Arc<dyn UserDirectory>,
}

#[async_trait]
impl EditorLookup for DirectoryLookup {
    async fn lookup(&self, notification: &EditNotification) -> Result<EditorIdentity> {
        let profile = self
            .directory
            .resolve_user_display(&notification.editor_user_id)
            .await
            .map_err(|e| EditError::upstream("directory", e))?;

        debug!(
            editor = %notification.editor_user_id,
            nickname = %profile.nickname,
            "resolved editor from directory"
        );
        Ok(EditorIdentity {
            nickname: profile.nickname,
            role: RoleLevel::NONE,
        })
    }
}

/// Resolves editors through their membership of the conversation's group.
pub struct GroupMemberLookup {
    store: Arc<dyn EditStore>,
    groups: Arc<dyn GroupService>,
    /// Used for admin edits whose editor has no membership record.
    fallback: Option<DirectoryLookup>,
}

#[async_trait]
impl EditorLookup for GroupMemberLookup {
    async fn lookup(&self, notification: &EditNotification) -> Result<EditorIdentity> {
        let conversation = self
            .store
            .get_conversation(&notification.conversation_id)
            .map_err(|e| EditError::from_store(e, "conversation", &notification.conversation_id))?;

        let members = self
            .groups
            .get_group_members(
                &conversation.group_id,
                std::slice::from_ref(&notification.editor_user_id),
            )
            .await
            .map_err(|e| EditError::upstream("group service", e))?;

        if let Some(member) = members
            .into_iter()
            .find(|m| m.user_id == notification.editor_user_id)
        {
            debug!(
                editor = %member.user_id,
                nickname = %member.nickname,
                role = member.role_level.0,
                "resolved editor from group membership"
            );
            return Ok(EditorIdentity {
                nickname: member.nickname,
                role: member.role_level,
            });
        }

        match &self.fallback {
            Some(directory) => directory.lookup(notification).await,
            None => {
                debug!(
                    editor = %notification.editor_user_id,
                    group_id = %conversation.group_id,
                    "editor is not a group member"
                );
                Ok(EditorIdentity {
                    nickname: UNKNOWN_EDITOR_NICKNAME.to_string(),
                    role: RoleLevel::NONE,
                })
            }
        }
    }
}

pub struct IdentityResolver {
    directory: DirectoryLookup,
    group_member: GroupMemberLookup,
    group_admin: GroupMemberLookup,
}

impl IdentityResolver {
    pub fn new(
        store: Arc<dyn EditStore>,
        directory: Arc<dyn UserDirectory>,
        groups: Arc<dyn GroupService>,
    ) -> Self {
        Self {
            directory: DirectoryLookup {
                directory: directory.clone(),
            },
            group_member: GroupMemberLookup {
                store: store.clone(),
                groups: groups.clone(),
                fallback: None,
            },
            group_admin: GroupMemberLookup {
                store,
                groups,
                fallback: Some(DirectoryLookup { directory }),
            },
        }
    }

    /// Select the lookup for a notification's conversation kind.
    ///
    /// `None` means the kind has no editor lookup.
    pub fn lookup_for(&self, notification: &EditNotification) -> Option<&dyn EditorLookup> {
        let kind = ConversationKind::from_session_type(notification.session_type);
        match (kind, notification.is_admin_edit) {
            (Some(ConversationKind::Group), false) => Some(&self.group_member),
            (Some(ConversationKind::Group), true) => Some(&self.group_admin),
            (Some(ConversationKind::Single), _) | (None, true) => Some(&self.directory),
            (None, false) => None,
        }
    }

    pub async fn resolve(&self, notification: &EditNotification) -> Result<EditorIdentity> {
        match self.lookup_for(notification) {
            Some(lookup) => lookup.lookup(notification).await,
            None => {
                warn!(
                    session_type = notification.session_type,
                    editor = %notification.editor_user_id,
                    "no editor lookup for session type"
                );
                Ok(EditorIdentity::default())
            }
        }
    }
}
