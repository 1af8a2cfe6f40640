//! User directory and group service collaborators.

use async_trait::async_trait;
use tracing::debug;

use missive_store::{GroupMember, StoreError};

use crate::store::SharedStore;

/// Public display data of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDisplay {
    pub nickname: String,
    pub face_url: String,
}

/// Resolves user ids to display names.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_user_display(&self, user_id: &str) -> anyhow::Result<UserDisplay>;
}

/// Resolves group membership.  Users that are not members of the group are
/// absent from the result; that is not an error.
#[async_trait]
pub trait GroupService: Send + Sync {
    async fn get_group_members(
        &self,
        group_id: &str,
        user_ids: &[String],
    ) -> anyhow::Result<Vec<GroupMember>>;
}

/// Directory and group service answered from the local database cache.
#[derive(Clone)]
pub struct LocalDirectory {
    store: SharedStore,
}

impl LocalDirectory {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserDirectory for LocalDirectory {
    async fn resolve_user_display(&self, user_id: &str) -> anyhow::Result<UserDisplay> {
        match self.store.get_user(user_id) {
            Ok(user) => {
                debug!(user_id, nickname = %user.nickname, "resolved user from local directory");
                Ok(UserDisplay {
                    nickname: user.nickname,
                    face_url: user.face_url,
                })
            }
            Err(StoreError::NotFound) => {
                Err(anyhow::anyhow!("user {user_id} is not in the local directory"))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl GroupService for LocalDirectory {
    async fn get_group_members(
        &self,
        group_id: &str,
        user_ids: &[String],
    ) -> anyhow::Result<Vec<GroupMember>> {
        Ok(self.store.get_group_members(group_id, user_ids)?)
    }
}
