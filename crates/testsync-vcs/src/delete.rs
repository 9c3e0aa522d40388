use crate::registry::IntegrationRegistry;
use crate::repo::{branch_tip, open_repo};
use async_trait::async_trait;
use git2::{ErrorCode, Index, Signature};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use testsync_core::constants;
use testsync_core::error::{ReconcileError, VcsError};
use testsync_core::types::DeleteFileRequest;
use testsync_engine::FileDeleter;
use tracing::info;

/// Remove `path` from `branch` in a new commit, provided the file's blob is
/// still `sha`. Returns the id of the new commit.
pub fn delete_file_on_branch(
    repo_path: &Path,
    branch: &str,
    path: &str,
    sha: &str,
) -> Result<String, ReconcileError> {
    let repo = open_repo(repo_path)?;
    let (parent, ref_name) = branch_tip(&repo, branch)?;
    let tree = parent
        .tree()
        .map_err(|e| VcsError::GitError(format!("failed to load tree of `{branch}`: {e}")))?;

    let current = match tree.get_path(Path::new(path)) {
        Ok(entry) => entry.id().to_string(),
        Err(e) if e.code() == ErrorCode::NotFound => {
            return Err(ReconcileError::stale_write(path, sha, None));
        }
        Err(e) => {
            return Err(VcsError::GitError(format!("failed to read `{path}`: {e}")).into());
        }
    };
    if current != sha {
        return Err(ReconcileError::stale_write(path, sha, Some(current)));
    }

    let git_err = |what: &str, e: git2::Error| VcsError::GitError(format!("{what}: {e}"));
    let mut index = Index::new().map_err(|e| git_err("failed to create index", e))?;
    index
        .read_tree(&tree)
        .map_err(|e| git_err("failed to read tree into index", e))?;
    index
        .remove_path(Path::new(path))
        .map_err(|e| git_err("failed to remove path from index", e))?;
    let tree_oid = index
        .write_tree_to(&repo)
        .map_err(|e| git_err("failed to write tree", e))?;
    let new_tree = repo
        .find_tree(tree_oid)
        .map_err(|e| git_err("failed to load written tree", e))?;

    let signature = Signature::now(constants::COMMIT_AUTHOR_NAME, constants::COMMIT_AUTHOR_EMAIL)
        .map_err(|e| git_err("failed to build signature", e))?;
    let commit_oid = repo
        .commit(
            Some(ref_name.as_str()),
            &signature,
            &signature,
            &format!("Delete {path}"),
            &new_tree,
            &[&parent],
        )
        .map_err(|e| git_err("failed to commit delete", e))?;
    Ok(commit_oid.to_string())
}

/// [`FileDeleter`] over repositories registered in an [`IntegrationRegistry`].
///
/// Writes to the same repository are serialized; each delete builds on the
/// branch tip left by the previous one.
#[derive(Clone)]
pub struct GitFileDeleter {
    registry: Arc<IntegrationRegistry>,
    repo_locks: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl GitFileDeleter {
    pub fn new(registry: Arc<IntegrationRegistry>) -> Self {
        Self {
            registry,
            repo_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_for(&self, repo_path: &Path) -> Result<Arc<Mutex<()>>, ReconcileError> {
        let mut locks = self
            .repo_locks
            .lock()
            .map_err(|_| ReconcileError::remote("repository lock table poisoned"))?;
        Ok(Arc::clone(
            locks.entry(repo_path.to_path_buf()).or_default(),
        ))
    }
}

#[async_trait]
impl FileDeleter for GitFileDeleter {
    async fn delete_file(&self, request: DeleteFileRequest) -> Result<(), ReconcileError> {
        let target = self
            .registry
            .resolve_repo(&request.owner, &request.repo)?
            .clone();
        let lock = self.lock_for(&target.repo_path)?;

        let commit = tokio::task::spawn_blocking({
            let request = request.clone();
            move || {
                let _guard = lock
                    .lock()
                    .map_err(|_| ReconcileError::remote("repository lock poisoned"))?;
                delete_file_on_branch(&target.repo_path, &request.branch, &request.path, &request.sha)
            }
        })
        .await
        .map_err(|e| ReconcileError::Join(e.to_string()))??;

        info!(
            repo = %format!("{}/{}", request.owner, request.repo),
            branch = %request.branch,
            path = %request.path,
            %commit,
            "deleted file"
        );
        Ok(())
    }
}
