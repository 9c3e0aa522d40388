use std::collections::BTreeSet;
use testsync_core::error::ReconcileError;
use testsync_core::types::Team;
use tracing::error;

/// Resolve the one git integration shared by every participating team.
///
/// Fails with [`ReconcileError::Configuration`] unless exactly one non-null id
/// is present; the offending id list is logged at error level.
pub fn select_integration(teams: &[Team]) -> Result<String, ReconcileError> {
    let distinct: BTreeSet<Option<&str>> = teams
        .iter()
        .map(|team| team.git_sync_integration_id.as_deref())
        .collect();

    let mut ids = distinct.iter();
    if let (Some(Some(id)), None) = (ids.next(), ids.next()) {
        return Ok((*id).to_string());
    }

    let integration_ids: Vec<Option<String>> = distinct
        .into_iter()
        .map(|id| id.map(str::to_string))
        .collect();
    error!(
        ?integration_ids,
        teams = teams.len(),
        "{}",
        rejection_message(&integration_ids)
    );
    Err(ReconcileError::Configuration { integration_ids })
}

fn rejection_message(integration_ids: &[Option<String>]) -> &'static str {
    if integration_ids.len() > 1 {
        "multiple integration ids"
    } else {
        "expected exactly one integration id"
    }
}
