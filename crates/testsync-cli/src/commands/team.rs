use anyhow::Result;
use testsync_core::config::Config;
use testsync_core::types::Team;
use testsync_state::teams;
use tracing::{info, warn};

pub fn add(config: &Config, id: &str, name: &str, integration: Option<String>) -> Result<()> {
    if let Some(integration_id) = integration.as_deref()
        && !config.integrations.contains_key(integration_id)
    {
        warn!(integration_id, "integration is not configured");
    }

    let team = Team {
        id: id.to_string(),
        name: name.to_string(),
        git_sync_integration_id: integration,
    };
    let store = super::open_store(config)?;
    store.with_conn(|conn| teams::upsert_team(conn, &team))?;

    println!("Team saved: {} ({})", team.id, team.name);
    info!(team_id = %team.id, "team saved");
    Ok(())
}

pub fn list(config: &Config) -> Result<()> {
    let store = super::open_store(config)?;
    let all = store.with_conn(teams::list_teams)?;
    if all.is_empty() {
        println!("No teams.");
        return Ok(());
    }
    for team in all {
        println!(
            "  {}  {}  integration: {}",
            team.id,
            team.name,
            team.git_sync_integration_id.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
