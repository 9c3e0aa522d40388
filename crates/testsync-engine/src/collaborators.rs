use async_trait::async_trait;
use testsync_core::error::ReconcileError;
use testsync_core::types::{DeleteFileRequest, NewTest, RemoteTree, Test};

/// Reads the test entries of a branch from the Git host.
///
/// A missing branch or an unknown integration is an error, never an empty tree.
#[async_trait]
pub trait RemoteTreeReader: Send + Sync {
    async fn read_tree(&self, branch: &str, integration_id: &str)
    -> Result<RemoteTree, ReconcileError>;
}

/// Persists a new test record.
#[async_trait]
pub trait TestCreator: Send + Sync {
    async fn create_test(&self, test: NewTest) -> Result<Test, ReconcileError>;
}

/// Deletes one file on the Git host.
///
/// Must fail with [`ReconcileError::StaleWrite`] when `sha` no longer matches
/// the file on the branch.
#[async_trait]
pub trait FileDeleter: Send + Sync {
    async fn delete_file(&self, request: DeleteFileRequest) -> Result<(), ReconcileError>;
}
