use anyhow::Result;
use testsync_core::config::Config;
use testsync_core::error::StateError;
use testsync_core::types::{Team, Test};
use testsync_engine::SyncRequest;
use testsync_state::{SqliteTestStore, records, teams};
use tracing::info;

/// Teams and stored tests taking part in one sync.
#[derive(Debug)]
pub(crate) struct SyncInputs {
    pub team_ids: Vec<String>,
    pub teams: Vec<Team>,
    pub tests: Vec<Test>,
}

pub fn run(
    config: &Config,
    branch: &str,
    team_id: &str,
    with_teams: &[String],
    json: bool,
) -> Result<()> {
    let store = super::open_store(config)?;
    let inputs = sync_inputs(&store, team_id, with_teams)?;
    let stored = inputs.tests.len();

    let reconciler = super::build_reconciler(config, &store);
    let outcome = super::runtime()?.block_on(reconciler.sync(SyncRequest {
        branch: branch.to_string(),
        team_id: team_id.to_string(),
        teams: inputs.teams,
        tests: inputs.tests,
    }));
    super::report_failures(&outcome);
    let synced = outcome?;

    if !json {
        println!("Sync complete");
        println!("  Branch:        {}", branch);
        println!("  Teams:         {}", inputs.team_ids.join(", "));
        println!("  Stored before: {}", stored);
        println!("  Tracking:      {}", synced.len());
    }
    super::print_tests(&synced, json)?;

    info!(branch, tracking = synced.len(), "sync finished");
    Ok(())
}

/// Load the creating team, the extra teams, and every test they own.
///
/// The creating team comes first; repeated ids are dropped.
pub(crate) fn sync_inputs(
    store: &SqliteTestStore,
    team_id: &str,
    with_teams: &[String],
) -> Result<SyncInputs, StateError> {
    let mut team_ids = vec![team_id.to_string()];
    for id in with_teams {
        if !team_ids.contains(id) {
            team_ids.push(id.clone());
        }
    }

    store.with_conn(|conn| {
        let teams = teams::get_teams(conn, &team_ids)?;
        let tests = records::list_tests_for_teams(conn, &team_ids)?;
        Ok(SyncInputs {
            team_ids: team_ids.clone(),
            teams,
            tests,
        })
    })
}
