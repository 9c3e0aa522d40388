use rusqlite::Connection;
use std::path::Path;
use testsync_core::config::StorageConfig;
use testsync_core::error::StateError;
use tracing::info;

/// Open the state database, creating parent directories, with the
/// `[storage]` pragmas applied on top of WAL and enforced foreign keys.
pub fn open_configured(db_path: &Path, storage: &StorageConfig) -> Result<Connection, StateError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(StateError::Io)?;
    }
    let conn = Connection::open(db_path).map_err(StateError::sqlite)?;
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {};
         PRAGMA cache_size = {};",
        storage.busy_timeout_ms, storage.cache_size
    ))
    .map_err(StateError::sqlite)?;

    info!(db_path = %db_path.display(), "state database opened");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_configured_applies_storage_pragmas() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("state.db");
        let storage = StorageConfig {
            busy_timeout_ms: 1234,
            ..StorageConfig::default()
        };
        let conn = open_configured(&db_path, &storage).unwrap();

        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 1234);

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }
}
