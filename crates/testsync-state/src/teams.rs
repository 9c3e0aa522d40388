use rusqlite::{Connection, Row, params};
use testsync_core::error::StateError;
use testsync_core::time::now_iso8601;
use testsync_core::types::Team;

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        git_sync_integration_id: row.get(2)?,
    })
}

/// Insert a team, or update its name and integration if it already exists.
pub fn upsert_team(conn: &Connection, team: &Team) -> Result<(), StateError> {
    let now = now_iso8601();
    conn.execute(
        "INSERT INTO teams (id, name, git_sync_integration_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            git_sync_integration_id = excluded.git_sync_integration_id,
            updated_at = excluded.updated_at",
        params![team.id, team.name, team.git_sync_integration_id, now],
    )
    .map_err(StateError::sqlite)?;
    Ok(())
}

pub fn get_team(conn: &Connection, team_id: &str) -> Result<Option<Team>, StateError> {
    let row = conn.query_row(
        "SELECT id, name, git_sync_integration_id FROM teams WHERE id = ?1",
        params![team_id],
        team_from_row,
    );

    match row {
        Ok(team) => Ok(Some(team)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StateError::sqlite(e)),
    }
}

/// Load every listed team, failing on the first unknown id.
pub fn get_teams(conn: &Connection, team_ids: &[String]) -> Result<Vec<Team>, StateError> {
    team_ids
        .iter()
        .map(|id| {
            get_team(conn, id)?.ok_or_else(|| StateError::TeamNotFound {
                team_id: id.clone(),
            })
        })
        .collect()
}

pub fn list_teams(conn: &Connection) -> Result<Vec<Team>, StateError> {
    let mut stmt = conn
        .prepare("SELECT id, name, git_sync_integration_id FROM teams ORDER BY id")
        .map_err(StateError::sqlite)?;
    let rows = stmt
        .query_map([], team_from_row)
        .map_err(StateError::sqlite)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StateError::sqlite)
}
