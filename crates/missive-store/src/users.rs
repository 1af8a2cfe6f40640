use rusqlite::params;

use crate::database::Database;
use crate::error::{not_found, Result};
use crate::models::User;

impl Database {
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO users (user_id, nickname, face_url) VALUES (?1, ?2, ?3)",
            params![user.user_id, user.nickname, user.face_url],
        )?;
        Ok(())
    }

    pub fn get_user(&self, user_id: &str) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT user_id, nickname, face_url FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(User {
                        user_id: row.get(0)?,
                        nickname: row.get(1)?,
                        face_url: row.get(2)?,
                    })
                },
            )
            .map_err(not_found)
    }
}
