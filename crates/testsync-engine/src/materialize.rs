use crate::batch::run_bounded;
use crate::collaborators::{FileDeleter, TestCreator};
use std::sync::Arc;
use testsync_core::error::ReconcileError;
use testsync_core::types::{DeleteFileRequest, NewTest, RemoteTreeEntry, Test, tracked_path};
use tracing::debug;

/// Executes the create and delete sets through the injected collaborators.
pub struct Materializer {
    creator: Arc<dyn TestCreator>,
    deleter: Arc<dyn FileDeleter>,
    max_concurrency: usize,
}

/// Repository and branch a delete batch targets.
#[derive(Debug, Clone, Copy)]
pub struct DeleteTarget<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub branch: &'a str,
    pub tracked_prefix: &'a str,
}

impl Materializer {
    pub fn new(
        creator: Arc<dyn TestCreator>,
        deleter: Arc<dyn FileDeleter>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            creator,
            deleter,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Create an empty-code stub owned by `team_id` for every missing entry.
    ///
    /// Succeeds only if every creation succeeds. Stubs created before a
    /// sibling failed are not rolled back.
    pub async fn create_missing(
        &self,
        missing: &[&RemoteTreeEntry],
        team_id: &str,
    ) -> Result<Vec<Test>, ReconcileError> {
        let requests: Vec<NewTest> = missing
            .iter()
            .map(|entry| NewTest::stub(entry.path.as_str(), team_id))
            .collect();
        debug!(count = requests.len(), team_id, "creating missing tests");

        run_bounded("create", requests, self.max_concurrency, |request| {
            let creator = Arc::clone(&self.creator);
            async move { creator.create_test(request).await }
        })
        .await
    }

    /// Delete every entry from the branch, guarded by the sha read with the tree.
    ///
    /// Returns the number of files deleted.
    pub async fn delete_entries(
        &self,
        entries: &[&RemoteTreeEntry],
        target: DeleteTarget<'_>,
    ) -> Result<usize, ReconcileError> {
        let requests: Vec<DeleteFileRequest> = entries
            .iter()
            .map(|entry| DeleteFileRequest {
                owner: target.owner.to_string(),
                repo: target.repo.to_string(),
                branch: target.branch.to_string(),
                path: tracked_path(target.tracked_prefix, &entry.path),
                sha: entry.sha.clone(),
            })
            .collect();
        debug!(count = requests.len(), branch = target.branch, "deleting files");

        let deleted = run_bounded("delete", requests, self.max_concurrency, |request| {
            let deleter = Arc::clone(&self.deleter);
            async move { deleter.delete_file(request).await }
        })
        .await?;
        Ok(deleted.len())
    }
}
