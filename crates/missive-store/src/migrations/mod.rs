//! Schema migrations, tracked through `PRAGMA user_version`.
//!
//! Each entry of [`MIGRATIONS`] moves the schema from `version - 1` to
//! `version`.  A migration and its version bump commit together, so a crash
//! mid-migration leaves the previous version in place.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type MigrationFn = fn(&Connection) -> rusqlite::Result<()>;

/// `(version, name, up)` in ascending version order.
const MIGRATIONS: &[(u32, &str, MigrationFn)] = &[(1, "v001_initial", v001_initial::up)];

/// Schema version the running code expects.
pub const CURRENT_VERSION: u32 = 1;

/// Bring the schema up to [`CURRENT_VERSION`].
///
/// A database written by a newer client is rejected rather than opened with
/// a schema this code does not know.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {current} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    tracing::debug!(
        current_version = current,
        target_version = CURRENT_VERSION,
        "checking store schema"
    );

    for &(version, name, up) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        tracing::info!(version, name, "applying store migration");

        let tx = conn.unchecked_transaction()?;
        up(&tx).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(())
}
