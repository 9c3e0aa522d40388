use rusqlite::{Connection, Row, params, params_from_iter};
use testsync_core::error::StateError;
use testsync_core::ids::new_test_id;
use testsync_core::time::now_iso8601;
use testsync_core::types::{NewTest, Test};

const TEST_COLUMNS: &str = "id, team_id, path, name, code, guide";

fn test_from_row(row: &Row<'_>) -> rusqlite::Result<Test> {
    Ok(Test {
        id: row.get(0)?,
        team_id: row.get(1)?,
        path: row.get(2)?,
        name: row.get(3)?,
        code: row.get(4)?,
        guide: row.get::<_, i32>(5)? != 0,
    })
}

pub fn insert_test(conn: &Connection, test: &Test) -> Result<(), StateError> {
    let now = now_iso8601();
    conn.execute(
        "INSERT INTO tests (id, team_id, path, name, code, guide, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            test.id,
            test.team_id,
            test.path,
            test.name,
            test.code,
            test.guide as i32,
            now
        ],
    )
    .map_err(StateError::sqlite)?;
    Ok(())
}

/// Persist a new test. The name defaults to the path and the test is never a guide.
pub fn create_test(conn: &Connection, new_test: &NewTest) -> Result<Test, StateError> {
    let test = Test {
        id: new_test_id(),
        team_id: new_test.team_id.clone(),
        path: new_test.path.clone(),
        name: new_test.path.clone(),
        code: new_test.code.clone(),
        guide: false,
    };
    insert_test(conn, &test)?;
    Ok(test)
}

pub fn get_test(conn: &Connection, test_id: &str) -> Result<Option<Test>, StateError> {
    let row = conn.query_row(
        &format!("SELECT {TEST_COLUMNS} FROM tests WHERE id = ?1"),
        params![test_id],
        test_from_row,
    );

    match row {
        Ok(test) => Ok(Some(test)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StateError::sqlite(e)),
    }
}

/// Load every listed test, failing on the first unknown id.
pub fn get_tests(conn: &Connection, test_ids: &[String]) -> Result<Vec<Test>, StateError> {
    test_ids
        .iter()
        .map(|id| {
            get_test(conn, id)?.ok_or_else(|| StateError::TestNotFound {
                test_id: id.clone(),
            })
        })
        .collect()
}

/// All tests owned by any of `team_ids`, ordered by path.
pub fn list_tests_for_teams(conn: &Connection, team_ids: &[String]) -> Result<Vec<Test>, StateError> {
    if team_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; team_ids.len()].join(", ");
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {TEST_COLUMNS} FROM tests WHERE team_id IN ({placeholders}) ORDER BY path, id"
        ))
        .map_err(StateError::sqlite)?;
    let rows = stmt
        .query_map(params_from_iter(team_ids.iter()), test_from_row)
        .map_err(StateError::sqlite)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StateError::sqlite)
}

/// Tests of `team_ids` whose name is one of `names`, ordered by path.
pub fn find_tests_by_name(
    conn: &Connection,
    team_ids: &[String],
    names: &[String],
) -> Result<Vec<Test>, StateError> {
    if team_ids.is_empty() || names.is_empty() {
        return Ok(Vec::new());
    }
    let team_placeholders = vec!["?"; team_ids.len()].join(", ");
    let name_placeholders = vec!["?"; names.len()].join(", ");
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {TEST_COLUMNS} FROM tests
             WHERE team_id IN ({team_placeholders}) AND name IN ({name_placeholders})
             ORDER BY path, id"
        ))
        .map_err(StateError::sqlite)?;
    let rows = stmt
        .query_map(
            params_from_iter(team_ids.iter().chain(names.iter())),
            test_from_row,
        )
        .map_err(StateError::sqlite)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StateError::sqlite)
}
