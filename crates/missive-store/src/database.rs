//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/missive/missive.db`
    /// - macOS:   `~/Library/Application Support/im.missive.missive/missive.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\missive\missive\data\missive.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("im", "missive", "missive").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("missive.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open a private in-memory database.  Nothing survives the handle.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed helpers; direct access is meant for
    /// ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    /// Apply every `(column, value)` assignment to the row matching `keys` in
    /// a single `UPDATE`.  Empty values are written like any other.
    ///
    /// Returns [`StoreError::NotFound`] when no row matched.
    pub(crate) fn update_columns(
        &self,
        table: &str,
        assignments: &[(&'static str, Value)],
        keys: &[(&'static str, &str)],
    ) -> Result<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let where_clause = keys
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{column} = ?{}", assignments.len() + i + 1))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!("UPDATE {table} SET {set_clause} WHERE {where_clause}");

        let values = assignments
            .iter()
            .map(|(_, value)| value.clone())
            .chain(keys.iter().map(|(_, key)| Value::Text(key.to_string())));

        let affected = self.conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
