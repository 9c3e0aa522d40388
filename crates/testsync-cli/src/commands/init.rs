use anyhow::{Context, Result};
use std::path::Path;
use testsync_core::config::Config;
use testsync_core::constants;
use testsync_state::teams;
use tracing::info;

const CONFIG_TEMPLATE: &str = r#"[sync]
tracked_prefix = "qawolf"
test_suffix = ".test.js"
max_concurrency = 8

# One table per Git sync integration. `repo_path` is resolved against the
# project root when relative.
#
# [integrations.main-repo]
# owner = "acme"
# repo = "e2e-tests"
# repo_path = "../e2e-tests"
"#;

pub fn run(project_root: &Path, config: &Config) -> Result<()> {
    let project_root =
        std::fs::canonicalize(project_root).context("Failed to resolve project path")?;

    let store = super::open_store(config)?;
    let team_count = store.with_conn(|conn| teams::list_teams(conn).map(|t| t.len()))?;

    let config_path = project_root.join(constants::PROJECT_CONFIG_FILE);
    let wrote_config = if config_path.exists() {
        false
    } else {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(&config_path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        true
    };

    println!("Project initialized successfully!");
    println!("  Root:         {}", project_root.display());
    println!("  Database:     {}", config.state_db_path().display());
    println!(
        "  Config:       {}{}",
        config_path.display(),
        if wrote_config { " (created)" } else { "" }
    );
    println!("  Teams:        {}", team_count);
    println!("  Integrations: {}", config.integrations.len());
    println!();
    println!("Next step: run `testsync team add` to register a team.");

    info!(root = %project_root.display(), wrote_config, "Project initialized");
    Ok(())
}
