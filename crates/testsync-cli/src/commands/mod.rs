pub mod init;
pub mod prune;
pub mod sync;
pub mod team;

use anyhow::{Context, Result};
use std::sync::Arc;
use testsync_core::config::Config;
use testsync_core::error::ReconcileError;
use testsync_core::types::Test;
use testsync_engine::{ReconcileOptions, Reconciler};
use testsync_state::SqliteTestStore;
use testsync_vcs::{GitFileDeleter, GitTreeReader, IntegrationRegistry, TreeOptions};
use tracing::warn;

pub(crate) fn open_store(config: &Config) -> Result<SqliteTestStore> {
    let db_path = config.state_db_path();
    SqliteTestStore::open(&db_path, &config.storage)
        .with_context(|| format!("Failed to open state database {}", db_path.display()))
}

/// Wire the git host and the store into a reconciler.
pub(crate) fn build_reconciler(config: &Config, store: &SqliteTestStore) -> Reconciler {
    let registry = Arc::new(IntegrationRegistry::from_config(config));
    if registry.is_empty() {
        warn!("no integrations configured; add [integrations.<id>] to .testsync/config.toml");
    }
    Reconciler::new(
        Arc::new(GitTreeReader::new(
            Arc::clone(&registry),
            TreeOptions::from(&config.sync),
        )),
        Arc::new(store.clone()),
        Arc::new(GitFileDeleter::new(registry)),
        ReconcileOptions::from(&config.sync),
    )
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create tokio runtime")
}

/// Print each failure of an aggregated batch error to stderr.
pub(crate) fn report_failures<T>(outcome: &Result<T, ReconcileError>) {
    if let Err(err @ ReconcileError::Batch { .. }) = outcome {
        for failure in err.failures() {
            eprintln!("  failed: {failure}");
        }
    }
}

pub(crate) fn print_tests(tests: &[Test], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tests)?);
        return Ok(());
    }
    if tests.is_empty() {
        println!("No tests.");
        return Ok(());
    }
    for test in tests {
        let marker = if test.guide { " (guide)" } else { "" };
        println!("  {}  {}  [{}]{}", test.id, test.path, test.name, marker);
    }
    Ok(())
}
