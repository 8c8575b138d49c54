//! Database connection and schema utilities.

use std::path::{Path, PathBuf};

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::StoreError;

/// Default path for the records database.
pub const DEFAULT_DB_PATH: &str = "data/access_map.db";

/// Resolves the database path from the `DATABASE_PATH` environment
/// variable, falling back to [`DEFAULT_DB_PATH`].
#[must_use]
pub fn path_from_env() -> PathBuf {
    std::env::var("DATABASE_PATH").map_or_else(|_| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
}

/// Opens (or creates) the records `SQLite` database and ensures the schema
/// exists.
///
/// # Errors
///
/// Returns [`StoreError`] if the database cannot be opened or schema
/// creation fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db =
        init_sqlite_rusqlite(Some(path)).map_err(|e| StoreError::Connection(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Creates all tables and indexes if they don't already exist.
///
/// Reports and emotions have no foreign key to `locations`; deleting a
/// location leaves its records in place with a dangling reference.
async fn ensure_schema(db: &dyn Database) -> Result<(), StoreError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS locations (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            area        TEXT NOT NULL,
            coordinates TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_locations_area ON locations (area)")
        .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS reports (
            id          TEXT PRIMARY KEY,
            user_type   TEXT NOT NULL,
            issue_type  TEXT NOT NULL,
            description TEXT NOT NULL,
            location_id TEXT NOT NULL,
            longitude   REAL NOT NULL,
            latitude    REAL NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_reports_location ON reports (location_id)")
        .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS emotions (
            id          TEXT PRIMARY KEY,
            emotion     TEXT NOT NULL,
            user_type   TEXT NOT NULL,
            description TEXT,
            location_id TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_emotions_location ON emotions (location_id)")
        .await?;

    log::info!("Record store schema is up to date");

    Ok(())
}
