//! Group membership queries.

use rusqlite::params;
use rusqlite::params_from_iter;

use missive_shared::types::RoleLevel;

use crate::database::Database;
use crate::error::Result;
use crate::models::GroupMember;

impl Database {
    pub fn upsert_group_member(&self, member: &GroupMember) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO group_members (group_id, user_id, nickname, role_level)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                member.group_id,
                member.user_id,
                member.nickname,
                member.role_level.0,
            ],
        )?;
        Ok(())
    }

    /// Members of `group_id` among `user_ids`.  Users that are not members are
    /// simply absent from the result.
    pub fn get_group_members(&self, group_id: &str, user_ids: &[String]) -> Result<Vec<GroupMember>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (0..user_ids.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn().prepare(&format!(
            "SELECT group_id, user_id, nickname, role_level
             FROM group_members
             WHERE group_id = ?1 AND user_id IN ({placeholders})
             ORDER BY user_id ASC"
        ))?;

        let args = std::iter::once(group_id).chain(user_ids.iter().map(String::as_str));
        let rows = stmt.query_map(params_from_iter(args), row_to_member)?;

        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }

    /// The owner and admins of `group_id`.
    pub fn get_group_admins_and_owner(&self, group_id: &str) -> Result<Vec<GroupMember>> {
        let mut stmt = self.conn().prepare(
            "SELECT group_id, user_id, nickname, role_level
             FROM group_members
             WHERE group_id = ?1 AND role_level IN (?2, ?3)
             ORDER BY role_level DESC, user_id ASC",
        )?;

        let rows = stmt.query_map(
            params![group_id, RoleLevel::OWNER.0, RoleLevel::ADMIN.0],
            row_to_member,
        )?;

        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }
}

fn row_to_member(row: &rusqlite::Row<'_>) -> rusqlite::Result<GroupMember> {
    Ok(GroupMember {
        group_id: row.get(0)?,
        user_id: row.get(1)?,
        nickname: row.get(2)?,
        role_level: RoleLevel(row.get(3)?),
    })
}
