use crate::collaborators::{FileDeleter, RemoteTreeReader, TestCreator};
use crate::diff::ReconcileBatch;
use crate::materialize::{DeleteTarget, Materializer};
use crate::merge::merge_sorted;
use crate::selector::select_integration;
use std::sync::Arc;
use testsync_core::config::SyncConfig;
use testsync_core::constants;
use testsync_core::error::ReconcileError;
use testsync_core::types::{Team, Test};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Directory of the repository that mirrors tests; joined onto delete paths.
    pub tracked_prefix: String,
    pub max_concurrency: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            tracked_prefix: constants::DEFAULT_TRACKED_PREFIX.to_string(),
            max_concurrency: constants::DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl From<&SyncConfig> for ReconcileOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            tracked_prefix: config.tracked_prefix.clone(),
            max_concurrency: config.max_concurrency,
        }
    }
}

/// Input of [`Reconciler::sync`].
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub branch: String,
    /// Team that owns tests created for files missing locally.
    pub team_id: String,
    pub teams: Vec<Team>,
    pub tests: Vec<Test>,
}

/// Input of [`Reconciler::prune`]; `tests` are the tests being removed.
#[derive(Debug, Clone)]
pub struct PruneRequest {
    pub branch: String,
    pub teams: Vec<Team>,
    pub tests: Vec<Test>,
}

/// Entry point for keeping stored tests and a branch's test files in step.
pub struct Reconciler {
    reader: Arc<dyn RemoteTreeReader>,
    materializer: Materializer,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(
        reader: Arc<dyn RemoteTreeReader>,
        creator: Arc<dyn TestCreator>,
        deleter: Arc<dyn FileDeleter>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            reader,
            materializer: Materializer::new(creator, deleter, options.max_concurrency),
            options,
        }
    }

    /// Create stubs for test files present on the branch but not stored
    /// locally, then return the branch's tests sorted by path.
    ///
    /// Local tests that are neither guides nor present on the branch are left
    /// out of the result but never deleted.
    pub async fn sync(&self, request: SyncRequest) -> Result<Vec<Test>, ReconcileError> {
        let integration_id = select_integration(&request.teams)?;
        if !request.teams.iter().any(|team| team.id == request.team_id) {
            return Err(ReconcileError::UnknownTeam {
                team_id: request.team_id,
            });
        }

        let tree = self
            .reader
            .read_tree(&request.branch, &integration_id)
            .await?;
        let batch = ReconcileBatch::new(
            request.branch,
            integration_id,
            request.tests,
            tree.tests,
        );

        let missing = batch.compute_missing();
        let kept: Vec<Test> = batch.compute_trackable().into_iter().cloned().collect();
        info!(
            branch = %batch.branch,
            integration_id = %batch.integration_id,
            remote = batch.remote_entries.len(),
            kept = kept.len(),
            missing = missing.len(),
            "syncing tests"
        );

        let created = self
            .materializer
            .create_missing(&missing, &request.team_id)
            .await?;

        let combined = merge_sorted(kept, created);
        debug!(branch = %batch.branch, "return {} tests", combined.len());
        Ok(combined)
    }

    /// Delete from the branch every test file whose path equals the name of
    /// one of `request.tests`.
    pub async fn prune(&self, request: PruneRequest) -> Result<(), ReconcileError> {
        let integration_id = select_integration(&request.teams)?;

        let tree = self
            .reader
            .read_tree(&request.branch, &integration_id)
            .await?;
        let (owner, repo) = (tree.owner, tree.repo);
        let batch = ReconcileBatch::new(
            request.branch,
            integration_id,
            request.tests,
            tree.tests,
        );

        let deletable = batch.compute_deletable();
        info!(
            branch = %batch.branch,
            repo = %format!("{owner}/{repo}"),
            targeted = batch.tests.len(),
            deletable = deletable.len(),
            "pruning tests"
        );

        let target = DeleteTarget {
            owner: &owner,
            repo: &repo,
            branch: &batch.branch,
            tracked_prefix: &self.options.tracked_prefix,
        };
        let deleted = self.materializer.delete_entries(&deletable, target).await?;
        debug!(branch = %batch.branch, deleted, "prune complete");
        Ok(())
    }
}
