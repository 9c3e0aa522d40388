use anyhow::{Result, bail};
use testsync_core::config::Config;
use testsync_core::error::StateError;
use testsync_core::types::{Team, Test};
use testsync_engine::PruneRequest;
use testsync_state::{SqliteTestStore, records, teams};
use tracing::debug;

pub fn run(
    config: &Config,
    branch: &str,
    team_ids: &[String],
    test_ids: &[String],
    names: &[String],
) -> Result<()> {
    if test_ids.is_empty() && names.is_empty() {
        bail!("Nothing to prune: pass at least one --test or --name.");
    }

    let store = super::open_store(config)?;
    let (teams, tests) = prune_targets(&store, team_ids, test_ids, names)?;

    let reconciler = super::build_reconciler(config, &store);
    let outcome = super::runtime()?.block_on(reconciler.prune(PruneRequest {
        branch: branch.to_string(),
        teams,
        tests: tests.clone(),
    }));
    super::report_failures(&outcome);
    outcome?;

    println!("Prune complete");
    println!("  Branch: {}", branch);
    println!("  Targeted tests:");
    for test in &tests {
        println!("    {}  {}", test.id, test.name);
    }
    Ok(())
}

/// Resolve the tests being removed and every team that owns one of them.
///
/// The returned teams are `team_ids` plus the owner of each targeted test, so
/// the integration check covers the repository of every test, not only the
/// teams named on the command line.
pub(crate) fn prune_targets(
    store: &SqliteTestStore,
    team_ids: &[String],
    test_ids: &[String],
    names: &[String],
) -> Result<(Vec<Team>, Vec<Test>), StateError> {
    store.with_conn(|conn| {
        let mut tests = records::get_tests(conn, test_ids)?;
        for test in records::find_tests_by_name(conn, team_ids, names)? {
            if !tests.iter().any(|t| t.id == test.id) {
                tests.push(test);
            }
        }

        let mut owners: Vec<String> = team_ids.to_vec();
        for test in &tests {
            if !owners.contains(&test.team_id) {
                debug!(test_id = %test.id, team_id = %test.team_id, "adding owning team");
                owners.push(test.team_id.clone());
            }
        }
        let teams = teams::get_teams(conn, &owners)?;
        Ok((teams, tests))
    })
}
