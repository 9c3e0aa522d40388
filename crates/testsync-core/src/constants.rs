/// Directory inside the Git repository that mirrors synced tests.
pub const DEFAULT_TRACKED_PREFIX: &str = "qawolf";

/// File name suffix that marks a tree entry as a test.
pub const DEFAULT_TEST_SUFFIX: &str = ".test.js";

/// Upper bound on concurrently dispatched create/delete calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default data directory name under home.
pub const DEFAULT_DATA_DIR: &str = ".testsync";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = ".testsync/config.toml";

/// SQLite database file name.
pub const STATE_DB_FILE: &str = "state.db";

/// Author used for commits written by the local git host.
pub const COMMIT_AUTHOR_NAME: &str = "testsync";
pub const COMMIT_AUTHOR_EMAIL: &str = "testsync@localhost";
