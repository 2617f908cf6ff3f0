//! Connection handling for the local preferences database.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;
use crate::types::errors::StorageError;

/// Owns the SQLite connection. Migrations have run by the time a
/// `Database` is handed out.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the database file at `path`, creating missing
    /// parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::DataDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        Self::migrated(Connection::open(path)?)
    }

    /// In-memory database for tests and the offline demo.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, StorageError> {
        migrations::run_all(&conn)?;
        tracing::debug!(version = migrations::get_schema_version(&conn), "database ready");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
