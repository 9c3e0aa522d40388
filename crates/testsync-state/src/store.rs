use crate::{db, records, schema};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use testsync_core::config::StorageConfig;
use testsync_core::error::{ReconcileError, StateError};
use testsync_core::types::{NewTest, Test};
use testsync_engine::TestCreator;
use tracing::debug;

/// SQLite-backed test persistence shared between blocking and async callers.
#[derive(Clone)]
pub struct SqliteTestStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTestStore {
    /// Open (and migrate) the database at `db_path`.
    pub fn open(db_path: &Path, storage: &StorageConfig) -> Result<Self, StateError> {
        let conn = db::open_configured(db_path, storage)?;
        schema::create_tables(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StateError>,
    ) -> Result<T, StateError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StateError::Sqlite("connection mutex poisoned".into()))?;
        f(&conn)
    }
}

#[async_trait]
impl TestCreator for SqliteTestStore {
    async fn create_test(&self, test: NewTest) -> Result<Test, ReconcileError> {
        let store = self.clone();
        let created = tokio::task::spawn_blocking(move || {
            store.with_conn(|conn| records::create_test(conn, &test))
        })
        .await
        .map_err(|e| ReconcileError::Join(e.to_string()))??;
        debug!(test_id = %created.id, path = %created.path, "test created");
        Ok(created)
    }
}
