use git2::{BranchType, Commit, ErrorCode, Repository};
use std::path::Path;
use testsync_core::error::VcsError;

pub fn open_repo(repo_path: &Path) -> Result<Repository, VcsError> {
    Repository::open(repo_path).map_err(|_| VcsError::NotGitRepo {
        path: repo_path.display().to_string(),
    })
}

/// Resolve the tip commit of a local branch and its full ref name.
pub fn branch_tip<'r>(repo: &'r Repository, branch: &str) -> Result<(Commit<'r>, String), VcsError> {
    let found = repo
        .find_branch(branch, BranchType::Local)
        .map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec => VcsError::BranchNotFound {
                branch: branch.to_string(),
            },
            _ => VcsError::GitError(format!("failed to resolve branch `{branch}`: {e}")),
        })?;
    let reference = found.into_reference();
    let ref_name = reference
        .name()
        .map(str::to_string)
        .ok_or_else(|| VcsError::GitError(format!("branch `{branch}` has a non-utf8 ref name")))?;
    let commit = reference
        .peel_to_commit()
        .map_err(|e| VcsError::GitError(format!("failed to peel branch `{branch}`: {e}")))?;
    Ok((commit, ref_name))
}
