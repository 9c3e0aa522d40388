//! Tree reads and sha-guarded deletes against scratch repositories.

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use testsync_core::error::{ReconcileError, VcsError};
use testsync_core::types::{IntegrationTarget, NewTest, Team, Test};
use testsync_engine::{
    FileDeleter, PruneRequest, ReconcileOptions, Reconciler, RemoteTreeReader, SyncRequest,
    TestCreator,
};
use testsync_vcs::delete::delete_file_on_branch;
use testsync_vcs::tree::list_branch_tests;
use testsync_vcs::{GitFileDeleter, GitTreeReader, IntegrationRegistry, TreeOptions};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn options() -> TreeOptions {
    TreeOptions {
        tracked_prefix: "qawolf".into(),
        test_suffix: ".test.js".into(),
        include_content: false,
    }
}

/// Write `files` into the work tree and commit them onto `branch`.
fn commit_files(repo: &Repository, branch: &str, files: &[(&str, &str)]) -> Oid {
    let workdir = repo.workdir().expect("non-bare repo").to_path_buf();
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        let full = workdir.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("fixture", "fixture@example.com").unwrap();
    let ref_name = format!("refs/heads/{branch}");
    let parent = repo
        .find_reference(&ref_name)
        .ok()
        .and_then(|r| r.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some(&ref_name), &sig, &sig, "fixture", &tree, &parents)
        .unwrap()
}

fn fixture_repo() -> (TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_files(
        &repo,
        "main",
        &[
            ("README.md", "# tests"),
            ("qawolf/a.test.js", "// a"),
            ("qawolf/nested/b.test.js", "// b"),
            ("qawolf/helpers/index.js", "// helpers"),
        ],
    );
    (dir, repo)
}

fn blob_sha(repo: &Repository, branch: &str, path: &str) -> String {
    let commit = repo
        .find_reference(&format!("refs/heads/{branch}"))
        .unwrap()
        .peel_to_commit()
        .unwrap();
    commit
        .tree()
        .unwrap()
        .get_path(Path::new(path))
        .unwrap()
        .id()
        .to_string()
}

fn registry_for(dir: &TempDir) -> Arc<IntegrationRegistry> {
    let mut registry = IntegrationRegistry::default();
    registry.insert(
        "int-1",
        IntegrationTarget {
            owner: "qawolf".into(),
            repo: "tests".into(),
            repo_path: dir.path().to_path_buf(),
        },
    );
    Arc::new(registry)
}

// ---------------------------------------------------------------------------
// Tree reads
// ---------------------------------------------------------------------------

#[test]
fn lists_tests_under_prefix_relative_and_sorted() {
    let (dir, repo) = fixture_repo();
    let entries = list_branch_tests(dir.path(), "main", &options()).unwrap();

    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["a.test.js", "nested/b.test.js"]);
    assert_eq!(entries[0].sha, blob_sha(&repo, "main", "qawolf/a.test.js"));
    assert!(entries.iter().all(|e| e.text.is_none()));
}

#[test]
fn content_is_included_on_request() {
    let (dir, _repo) = fixture_repo();
    let mut opts = options();
    opts.include_content = true;
    let entries = list_branch_tests(dir.path(), "main", &opts).unwrap();
    assert_eq!(entries[0].text.as_deref(), Some("// a"));
}

#[test]
fn missing_branch_is_an_error_not_an_empty_list() {
    let (dir, _repo) = fixture_repo();
    let err = list_branch_tests(dir.path(), "feature", &options()).unwrap_err();
    assert!(matches!(err, VcsError::BranchNotFound { ref branch } if branch == "feature"));
}

#[test]
fn branch_without_prefix_has_no_tests() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_files(&repo, "main", &[("src/app.js", "// app")]);
    assert!(
        list_branch_tests(dir.path(), "main", &options())
            .unwrap()
            .is_empty()
    );
}

// ---------------------------------------------------------------------------
// Deletes
// ---------------------------------------------------------------------------

#[test]
fn delete_commits_removal_onto_branch() {
    let (dir, repo) = fixture_repo();
    let sha = blob_sha(&repo, "main", "qawolf/a.test.js");

    delete_file_on_branch(dir.path(), "main", "qawolf/a.test.js", &sha).unwrap();

    let entries = list_branch_tests(dir.path(), "main", &options()).unwrap();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["nested/b.test.js"]);

    let tip = repo
        .find_reference("refs/heads/main")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(tip.message(), Some("Delete qawolf/a.test.js"));
    assert_eq!(tip.parent_count(), 1);
}

#[test]
fn delete_with_stale_sha_is_rejected() {
    let (dir, repo) = fixture_repo();
    let old_sha = blob_sha(&repo, "main", "qawolf/a.test.js");
    commit_files(&repo, "main", &[("qawolf/a.test.js", "// a, edited")]);
    let new_sha = blob_sha(&repo, "main", "qawolf/a.test.js");

    let err = delete_file_on_branch(dir.path(), "main", "qawolf/a.test.js", &old_sha).unwrap_err();
    match err {
        ReconcileError::StaleWrite {
            path,
            expected_sha,
            actual_sha,
        } => {
            assert_eq!(path, "qawolf/a.test.js");
            assert_eq!(expected_sha, old_sha);
            assert_eq!(actual_sha, Some(new_sha));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        list_branch_tests(dir.path(), "main", &options()).unwrap().len(),
        2
    );
}

#[test]
fn delete_of_missing_file_is_stale() {
    let (dir, _repo) = fixture_repo();
    let err = delete_file_on_branch(dir.path(), "main", "qawolf/gone.test.js", "abc").unwrap_err();
    assert!(matches!(err, ReconcileError::StaleWrite { actual_sha: None, .. }));
}

// ---------------------------------------------------------------------------
// Collaborators through the facade
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryCreator {
    created: Mutex<Vec<Test>>,
}

#[async_trait]
impl TestCreator for MemoryCreator {
    async fn create_test(&self, test: NewTest) -> Result<Test, ReconcileError> {
        let mut created = self.created.lock().unwrap();
        let test = Test {
            id: format!("new-{}", created.len()),
            team_id: test.team_id,
            name: test.path.clone(),
            path: test.path,
            code: test.code,
            guide: false,
        };
        created.push(test.clone());
        Ok(test)
    }
}

fn team() -> Team {
    Team {
        id: "team-1".into(),
        name: "Team".into(),
        git_sync_integration_id: Some("int-1".into()),
    }
}

#[tokio::test]
async fn reader_reports_repository_coordinates() {
    let (dir, _repo) = fixture_repo();
    let reader = GitTreeReader::new(registry_for(&dir), options());

    let tree = reader.read_tree("main", "int-1").await.unwrap();
    assert_eq!((tree.owner.as_str(), tree.repo.as_str()), ("qawolf", "tests"));
    assert_eq!(tree.tests.len(), 2);

    let err = reader.read_tree("main", "int-9").await.unwrap_err();
    assert!(matches!(err, ReconcileError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn deleter_rejects_unknown_repository() {
    let (dir, _repo) = fixture_repo();
    let deleter = GitFileDeleter::new(registry_for(&dir));
    let err = deleter
        .delete_file(testsync_core::types::DeleteFileRequest {
            owner: "someone".into(),
            repo: "else".into(),
            branch: "main".into(),
            path: "qawolf/a.test.js".into(),
            sha: "abc".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn sync_then_prune_against_local_repository() {
    let (dir, _repo) = fixture_repo();
    let registry = registry_for(&dir);
    let creator = Arc::new(MemoryCreator::default());
    let reconciler = Reconciler::new(
        Arc::new(GitTreeReader::new(Arc::clone(&registry), options())),
        creator.clone(),
        Arc::new(GitFileDeleter::new(Arc::clone(&registry))),
        ReconcileOptions {
            tracked_prefix: "qawolf".into(),
            max_concurrency: 4,
        },
    );

    let synced = reconciler
        .sync(SyncRequest {
            branch: "main".into(),
            team_id: "team-1".into(),
            teams: vec![team()],
            tests: vec![],
        })
        .await
        .unwrap();
    let paths: Vec<&str> = synced.iter().map(|t| t.path.as_str()).collect();
    assert_eq!(paths, vec!["a.test.js", "nested/b.test.js"]);

    reconciler
        .prune(PruneRequest {
            branch: "main".into(),
            teams: vec![team()],
            tests: synced.clone(),
        })
        .await
        .unwrap();
    assert!(
        list_branch_tests(dir.path(), "main", &options())
            .unwrap()
            .is_empty()
    );

    let resynced = reconciler
        .sync(SyncRequest {
            branch: "main".into(),
            team_id: "team-1".into(),
            teams: vec![team()],
            tests: synced,
        })
        .await
        .unwrap();
    assert!(resynced.is_empty());
    assert_eq!(creator.created.lock().unwrap().len(), 2);
}
