use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("invalid config value: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a reconciliation call.
///
/// Collaborator implementations report their failures through the same type
/// so the engine can surface them unchanged.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("tests belong to multiple teams: integration ids {integration_ids:?}")]
    Configuration { integration_ids: Vec<Option<String>> },

    #[error("team {team_id} is not part of this reconciliation")]
    UnknownTeam { team_id: String },

    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("stale write: {path} expected sha {expected_sha}, found {actual_sha:?}")]
    StaleWrite {
        path: String,
        expected_sha: String,
        actual_sha: Option<String>,
    },

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("{operation} batch failed: {} of {} operations failed", .failures.len(), .failures.len() + .completed)]
    Batch {
        operation: &'static str,
        completed: usize,
        failures: Vec<ReconcileError>,
    },

    #[error("batch task did not complete: {0}")]
    Join(String),
}

impl ReconcileError {
    /// Convenience constructor for transport failures, use with `.map_err(ReconcileError::remote)`.
    pub fn remote<E: std::fmt::Display>(e: E) -> Self {
        Self::RemoteUnavailable(e.to_string())
    }

    /// Convenience constructor for creation failures, use with `.map_err(ReconcileError::persistence)`.
    pub fn persistence<E: std::fmt::Display>(e: E) -> Self {
        Self::Persistence(e.to_string())
    }

    pub fn stale_write(
        path: impl Into<String>,
        expected_sha: impl Into<String>,
        actual_sha: Option<String>,
    ) -> Self {
        Self::StaleWrite {
            path: path.into(),
            expected_sha: expected_sha.into(),
            actual_sha,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Flatten a batch into its individual failures; any other error yields itself.
    pub fn failures(&self) -> Vec<&ReconcileError> {
        match self {
            Self::Batch { failures, .. } => failures.iter().flat_map(|f| f.failures()).collect(),
            other => vec![other],
        }
    }
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("team not found: {team_id}")]
    TeamNotFound { team_id: String },

    #[error("test not found: {test_id}")]
    TestNotFound { test_id: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StateError {
    /// Convenience constructor for SQLite errors, use with `.map_err(StateError::sqlite)`.
    pub fn sqlite<E: std::fmt::Display>(e: E) -> Self {
        Self::Sqlite(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("not a git repository: {path}")]
    NotGitRepo { path: String },

    #[error("branch not found: {branch}")]
    BranchNotFound { branch: String },

    #[error("unknown integration: {integration_id}")]
    UnknownIntegration { integration_id: String },

    #[error("unknown repository: {owner}/{repo}")]
    UnknownRepository { owner: String, repo: String },

    #[error("git error: {0}")]
    GitError(String),
}

impl From<VcsError> for ReconcileError {
    fn from(err: VcsError) -> Self {
        ReconcileError::remote(err)
    }
}

impl From<StateError> for ReconcileError {
    fn from(err: StateError) -> Self {
        ReconcileError::persistence(err)
    }
}
