use crate::constants;
use crate::error::ConfigError;
use crate::types::IntegrationTarget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Integration id -> repository it governs.
    #[serde(default)]
    pub integrations: BTreeMap<String, IntegrationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u32,
    #[serde(default = "default_cache_size")]
    pub cache_size: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_tracked_prefix")]
    pub tracked_prefix: String,
    #[serde(default = "default_test_suffix")]
    pub test_suffix: String,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub include_content: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub owner: String,
    pub repo: String,
    pub repo_path: String,
}

fn default_data_dir() -> String {
    "~/.testsync".into()
}
fn default_busy_timeout() -> u32 {
    5000
}
fn default_cache_size() -> i32 {
    -64000
}
fn default_tracked_prefix() -> String {
    constants::DEFAULT_TRACKED_PREFIX.into()
}
fn default_test_suffix() -> String {
    constants::DEFAULT_TEST_SUFFIX.into()
}
fn default_max_concurrency() -> usize {
    constants::DEFAULT_MAX_CONCURRENCY
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            busy_timeout_ms: default_busy_timeout(),
            cache_size: default_cache_size(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tracked_prefix: default_tracked_prefix(),
            test_suffix: default_test_suffix(),
            max_concurrency: default_max_concurrency(),
            include_content: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration with layered precedence:
    /// 1. Environment variables `TESTSYNC_<SECTION>_<KEY>` (highest priority)
    /// 2. Explicit config file (from `--config`)
    /// 3. Project config: `<project_root>/.testsync/config.toml`
    /// 4. Global config: `~/.testsync/config.toml`
    /// 5. Built-in defaults (lowest priority)
    ///
    /// Only fields explicitly set in a higher-priority file override lower layers.
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_file(project_root, None)
    }

    pub fn load_with_file(
        project_root: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        if let Some(home) = dirs::home_dir() {
            let global_path = home.join(constants::DEFAULT_DATA_DIR).join("config.toml");
            if global_path.exists() {
                let raw = load_toml_value(&global_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(root) = project_root {
            let project_path = root.join(constants::PROJECT_CONFIG_FILE);
            if project_path.exists() {
                let raw = load_toml_value(&project_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(cf) = config_file {
            if !cf.exists() {
                return Err(ConfigError::NotFound {
                    path: cf.display().to_string(),
                });
            }
            let raw = load_toml_value(cf)?;
            merge_toml_values(&mut merged, &raw);
        }

        // Deserialize the merged value into Config (fills remaining fields with defaults)
        let config_str =
            toml::to_string(&merged).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let mut config: Config =
            toml::from_str(&config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        apply_env_overrides(&mut config);
        config.normalize(project_root)?;
        Ok(config)
    }

    fn normalize(&mut self, project_root: Option<&Path>) -> Result<(), ConfigError> {
        if self.sync.max_concurrency == 0 {
            self.sync.max_concurrency = 1;
        }
        self.sync.tracked_prefix = self.sync.tracked_prefix.trim_matches('/').to_string();
        self.storage.data_dir = expand_tilde(&self.storage.data_dir);

        for (id, integration) in &mut self.integrations {
            if integration.repo_path.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("integrations.{id}.repo_path"),
                    reason: "must not be empty".into(),
                });
            }
            let expanded = PathBuf::from(expand_tilde(&integration.repo_path));
            let resolved = match project_root {
                Some(root) if expanded.is_relative() => root.join(&expanded),
                _ => expanded,
            };
            integration.repo_path = resolved.to_string_lossy().to_string();
        }
        Ok(())
    }

    /// Path of the SQLite database holding teams and tests.
    pub fn state_db_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(constants::STATE_DB_FILE)
    }

    /// Resolve the configured integrations into repository targets.
    pub fn integration_targets(&self) -> BTreeMap<String, IntegrationTarget> {
        self.integrations
            .iter()
            .map(|(id, cfg)| {
                (
                    id.clone(),
                    IntegrationTarget {
                        owner: cfg.owner.clone(),
                        repo: cfg.repo.clone(),
                        repo_path: PathBuf::from(&cfg.repo_path),
                    },
                )
            })
            .collect()
    }
}

fn load_toml_value(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    content
        .parse::<toml::Value>()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Deep-merge `overlay` into `base`. Only keys present in `overlay` are written.
fn merge_toml_values(base: &mut toml::Value, overlay: &toml::Value) {
    if let (toml::Value::Table(base_map), toml::Value::Table(overlay_map)) = (base, overlay) {
        for (key, overlay_val) in overlay_map {
            if let Some(base_val) = base_map.get_mut(key) {
                if base_val.is_table() && overlay_val.is_table() {
                    merge_toml_values(base_val, overlay_val);
                } else {
                    *base_val = overlay_val.clone();
                }
            } else {
                base_map.insert(key.clone(), overlay_val.clone());
            }
        }
    }
}

/// Convention: `TESTSYNC_<SECTION>_<KEY>` in UPPER_SNAKE_CASE.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("TESTSYNC_STORAGE_DATA_DIR") {
        config.storage.data_dir = v;
    }
    if let Ok(v) = std::env::var("TESTSYNC_STORAGE_BUSY_TIMEOUT_MS")
        && let Ok(n) = v.parse()
    {
        config.storage.busy_timeout_ms = n;
    }
    if let Ok(v) = std::env::var("TESTSYNC_SYNC_TRACKED_PREFIX") {
        config.sync.tracked_prefix = v;
    }
    if let Ok(v) = std::env::var("TESTSYNC_SYNC_TEST_SUFFIX") {
        config.sync.test_suffix = v;
    }
    if let Ok(v) = std::env::var("TESTSYNC_SYNC_MAX_CONCURRENCY")
        && let Ok(n) = v.parse()
    {
        config.sync.max_concurrency = n;
    }
    if let Ok(v) = std::env::var("TESTSYNC_SYNC_INCLUDE_CONTENT") {
        config.sync.include_content = v == "true" || v == "1";
    }
    if let Ok(v) = std::env::var("TESTSYNC_LOGGING_LEVEL") {
        config.logging.level = v;
    }
}

fn expand_tilde(path: &str) -> String {
    if path.starts_with('~')
        && let Some(home) = dirs::home_dir()
    {
        return path.replacen('~', &home.to_string_lossy(), 1);
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.sync.tracked_prefix, "qawolf");
        assert_eq!(config.sync.test_suffix, ".test.js");
        assert_eq!(config.sync.max_concurrency, 8);
        assert!(!config.sync.include_content);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn merge_only_overrides_explicit_keys() {
        let mut base: toml::Value = toml::from_str(
            r#"
            [sync]
            tracked_prefix = "tests"
            max_concurrency = 4
            "#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
            [sync]
            max_concurrency = 2
            "#,
        )
        .unwrap();

        merge_toml_values(&mut base, &overlay);
        let sync = base.get("sync").and_then(|v| v.as_table()).unwrap();
        assert_eq!(sync.get("tracked_prefix").and_then(|v| v.as_str()), Some("tests"));
        assert_eq!(sync.get("max_concurrency").and_then(|v| v.as_integer()), Some(2));
    }

    #[test]
    fn project_config_resolves_integrations_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".testsync");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
            [sync]
            tracked_prefix = "/qawolf/"
            max_concurrency = 0

            [integrations.int-1]
            owner = "qawolf"
            repo = "tests"
            repo_path = "repos/tests"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.sync.tracked_prefix, "qawolf");
        assert_eq!(config.sync.max_concurrency, 1);

        let targets = config.integration_targets();
        let target = targets.get("int-1").unwrap();
        assert_eq!(target.owner, "qawolf");
        assert_eq!(target.repo, "tests");
        assert_eq!(target.repo_path, dir.path().join("repos/tests"));
    }

    #[test]
    fn empty_repo_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(
            &file,
            r#"
            [integrations.int-1]
            owner = "o"
            repo = "r"
            repo_path = " "
            "#,
        )
        .unwrap();

        let err = Config::load_with_file(None, Some(&file)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "integrations.int-1.repo_path"));
    }

    #[test]
    fn missing_explicit_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_with_file(None, Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
