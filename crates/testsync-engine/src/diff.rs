use std::collections::HashSet;
use testsync_core::types::{RemoteTreeEntry, Test};

/// Remote entries whose `path` has no local test with an equal `path`.
///
/// Each path is reported once even if the tree lists it twice.
pub fn missing_entries<'a>(
    remote: &'a [RemoteTreeEntry],
    tests: &[Test],
) -> Vec<&'a RemoteTreeEntry> {
    let local_paths: HashSet<&str> = tests.iter().map(|t| t.path.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    remote
        .iter()
        .filter(|entry| !local_paths.contains(entry.path.as_str()))
        .filter(|entry| seen.insert(entry.path.as_str()))
        .collect()
}

/// Local tests that belong to the branch: guides, plus tests whose `name`
/// matches a remote entry `path`. Everything else is left out untouched.
pub fn trackable_tests<'a>(tests: &'a [Test], remote: &[RemoteTreeEntry]) -> Vec<&'a Test> {
    let remote_paths: HashSet<&str> = remote.iter().map(|e| e.path.as_str()).collect();
    tests
        .iter()
        .filter(|test| test.guide || remote_paths.contains(test.name.as_str()))
        .collect()
}

/// Remote entries whose `path` equals the `name` of a test targeted for removal.
pub fn deletable_entries<'a>(
    remote: &'a [RemoteTreeEntry],
    tests: &[Test],
) -> Vec<&'a RemoteTreeEntry> {
    let target_names: HashSet<&str> = tests.iter().map(|t| t.name.as_str()).collect();
    remote
        .iter()
        .filter(|entry| target_names.contains(entry.path.as_str()))
        .collect()
}

/// State of one reconciliation call: built per call, consumed by it, then dropped.
#[derive(Debug, Clone)]
pub struct ReconcileBatch {
    pub branch: String,
    pub integration_id: String,
    pub tests: Vec<Test>,
    pub remote_entries: Vec<RemoteTreeEntry>,
}

impl ReconcileBatch {
    pub fn new(
        branch: impl Into<String>,
        integration_id: impl Into<String>,
        tests: Vec<Test>,
        remote_entries: Vec<RemoteTreeEntry>,
    ) -> Self {
        Self {
            branch: branch.into(),
            integration_id: integration_id.into(),
            tests,
            remote_entries,
        }
    }

    /// The create set.
    pub fn compute_missing(&self) -> Vec<&RemoteTreeEntry> {
        missing_entries(&self.remote_entries, &self.tests)
    }

    /// The keep-and-merge set.
    pub fn compute_trackable(&self) -> Vec<&Test> {
        trackable_tests(&self.tests, &self.remote_entries)
    }

    /// The delete set, when `tests` holds the tests targeted for removal.
    pub fn compute_deletable(&self) -> Vec<&RemoteTreeEntry> {
        deletable_entries(&self.remote_entries, &self.tests)
    }
}
