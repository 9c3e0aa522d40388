use crate::registry::IntegrationRegistry;
use crate::repo::{branch_tip, open_repo};
use async_trait::async_trait;
use git2::{ErrorCode, ObjectType, Oid, TreeWalkMode, TreeWalkResult};
use std::path::Path;
use std::sync::Arc;
use testsync_core::config::SyncConfig;
use testsync_core::error::{ReconcileError, VcsError};
use testsync_core::types::{RemoteTree, RemoteTreeEntry};
use testsync_engine::RemoteTreeReader;
use tracing::debug;

/// Which files of a branch count as tests.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub tracked_prefix: String,
    pub test_suffix: String,
    pub include_content: bool,
}

impl From<&SyncConfig> for TreeOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            tracked_prefix: config.tracked_prefix.clone(),
            test_suffix: config.test_suffix.clone(),
            include_content: config.include_content,
        }
    }
}

/// List the test files of `branch` under the tracked prefix.
///
/// Paths are relative to the prefix and sorted. A branch without the prefix
/// directory has no tests; a missing branch is an error.
pub fn list_branch_tests(
    repo_path: &Path,
    branch: &str,
    options: &TreeOptions,
) -> Result<Vec<RemoteTreeEntry>, VcsError> {
    let repo = open_repo(repo_path)?;
    let (commit, _) = branch_tip(&repo, branch)?;
    let root = commit
        .tree()
        .map_err(|e| VcsError::GitError(format!("failed to load tree of `{branch}`: {e}")))?;

    let prefix = options.tracked_prefix.trim_matches('/');
    let tests_tree = if prefix.is_empty() {
        root
    } else {
        let entry = match root.get_path(Path::new(prefix)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VcsError::GitError(format!(
                    "failed to read `{prefix}` on `{branch}`: {e}"
                )));
            }
        };
        if entry.kind() != Some(ObjectType::Tree) {
            return Ok(Vec::new());
        }
        repo.find_tree(entry.id())
            .map_err(|e| VcsError::GitError(format!("failed to load `{prefix}` tree: {e}")))?
    };

    let mut found: Vec<(String, Oid)> = Vec::new();
    tests_tree
        .walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
                && name.ends_with(options.test_suffix.as_str())
            {
                found.push((format!("{dir}{name}"), entry.id()));
            }
            TreeWalkResult::Ok
        })
        .map_err(|e| VcsError::GitError(format!("failed to walk tree: {e}")))?;
    found.sort();

    let mut entries = Vec::with_capacity(found.len());
    for (path, oid) in found {
        let text = if options.include_content {
            let blob = repo
                .find_blob(oid)
                .map_err(|e| VcsError::GitError(format!("failed to load blob `{path}`: {e}")))?;
            Some(String::from_utf8_lossy(blob.content()).into_owned())
        } else {
            None
        };
        entries.push(RemoteTreeEntry {
            path,
            sha: oid.to_string(),
            text,
        });
    }
    Ok(entries)
}

/// [`RemoteTreeReader`] over repositories registered in an [`IntegrationRegistry`].
#[derive(Clone)]
pub struct GitTreeReader {
    registry: Arc<IntegrationRegistry>,
    options: TreeOptions,
}

impl GitTreeReader {
    pub fn new(registry: Arc<IntegrationRegistry>, options: TreeOptions) -> Self {
        Self { registry, options }
    }
}

#[async_trait]
impl RemoteTreeReader for GitTreeReader {
    async fn read_tree(
        &self,
        branch: &str,
        integration_id: &str,
    ) -> Result<RemoteTree, ReconcileError> {
        let target = self.registry.resolve(integration_id)?.clone();
        let options = self.options.clone();
        let branch = branch.to_string();

        let tests = tokio::task::spawn_blocking({
            let repo_path = target.repo_path.clone();
            move || list_branch_tests(&repo_path, &branch, &options)
        })
        .await
        .map_err(|e| ReconcileError::Join(e.to_string()))??;

        debug!(
            integration_id,
            repo = %format!("{}/{}", target.owner, target.repo),
            count = tests.len(),
            "read branch tree"
        );
        Ok(RemoteTree {
            tests,
            owner: target.owner,
            repo: target.repo,
        })
    }
}
