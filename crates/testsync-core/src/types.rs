use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A stored automated test belonging to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub id: String,
    pub team_id: String,
    /// Logical file path matched against remote tree entries when creating.
    pub path: String,
    /// Display name; matched against remote tree entries when keeping or deleting.
    pub name: String,
    pub code: String,
    /// Guide entries are kept by every sync regardless of remote presence.
    #[serde(default)]
    pub guide: bool,
}

/// A team and the git integration governing its repository, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub git_sync_integration_id: Option<String>,
}

/// A file observed in the current tree of a branch.
///
/// `path` is relative to the tracked test prefix. `sha` is the blob hash and
/// doubles as the concurrency token for deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTreeEntry {
    pub path: String,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RemoteTreeEntry {
    pub fn new(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sha: sha.into(),
            text: None,
        }
    }
}

/// Test entries of a branch plus the repository they were read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTree {
    pub tests: Vec<RemoteTreeEntry>,
    pub owner: String,
    pub repo: String,
}

/// Creation request for a test stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTest {
    pub code: String,
    pub path: String,
    pub team_id: String,
}

impl NewTest {
    /// Empty-code stub for a file that exists remotely but not locally.
    pub fn stub(path: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            code: String::new(),
            path: path.into(),
            team_id: team_id.into(),
        }
    }
}

/// Delete request for a single file on a branch, guarded by its blob sha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFileRequest {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Repository-relative path, including the tracked prefix.
    pub path: String,
    pub sha: String,
}

/// Where an integration id points: the repository coordinates reported to
/// callers and the local repository backing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationTarget {
    pub owner: String,
    pub repo: String,
    pub repo_path: PathBuf,
}

/// Join the tracked prefix and a tree-relative path into a repository path.
pub fn tracked_path(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        relative.to_string()
    } else {
        format!("{prefix}/{relative}")
    }
}
