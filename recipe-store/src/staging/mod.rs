//! Staging loader: bulk-loads each raw CSV into a staging table that
//! mirrors its columns.

pub mod values;

use csv::{ReaderBuilder, StringRecord};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

use crate::config::Sources;
use crate::db::execute_statement;
use crate::db::schema::{StagingTable, STAGING_RECIPES, STAGING_REVIEWS, STAGING_USERS};
use crate::error::{ImportError, StoreResult};

/// Rows loaded into each staging table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingCounts {
    pub users: u64,
    pub reviews: u64,
    pub recipes: u64,
}

/// Load all three sources, users first. Stops at the first failure.
pub fn load_all(conn: &Connection, sources: &Sources) -> StoreResult<StagingCounts> {
    Ok(StagingCounts {
        users: load_table(conn, &STAGING_USERS, sources.users.as_deref())?,
        reviews: load_table(conn, &STAGING_REVIEWS, sources.reviews.as_deref())?,
        recipes: load_table(conn, &STAGING_RECIPES, sources.recipes.as_deref())?,
    })
}

/// Recreate one staging table and fill it from a CSV file whose first line
/// is a header. Returns the number of rows loaded.
pub fn load_table(conn: &Connection, table: &StagingTable, path: Option<&Path>) -> StoreResult<u64> {
    execute_statement(conn, table.name, &table.drop_sql())?;
    execute_statement(conn, table.name, &table.create_sql())?;

    let path = path.ok_or(ImportError::MissingSourcePath { table: table.name })?;
    let csv_error = |source: csv::Error| ImportError::Csv {
        table: table.name,
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();
    let mapping = column_mapping(table, &headers)?;

    let insert_sql = table.insert_sql();
    let mut stmt = conn
        .prepare(&insert_sql)
        .map_err(|e| ImportError::statement(table.name, e))?;

    let mut record = StringRecord::new();
    let mut rows = 0u64;
    while reader.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = mapping
            .iter()
            .zip(table.columns)
            .map(|(&index, column)| {
                let raw = record.get(index).unwrap_or("");
                values::convert(column.column_type, raw).map_err(|reason| {
                    ImportError::InvalidValue {
                        table: table.name,
                        column: column.name,
                        line,
                        reason,
                    }
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        stmt.execute(params_from_iter(row))
            .map_err(|e| ImportError::statement(format!("{} line {}", table.name, line), e))?;
        rows += 1;
    }

    tracing::info!("Loaded {} rows into {} from {}", rows, table.name, path.display());
    Ok(rows)
}

/// Map each staging column to a CSV field index.
///
/// Columns are matched by header name when every column is present,
/// otherwise positionally when the counts agree.
fn column_mapping(table: &StagingTable, headers: &StringRecord) -> StoreResult<Vec<usize>> {
    let by_name: Option<Vec<usize>> = table
        .columns
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(column.name))
        })
        .collect();

    if let Some(mapping) = by_name {
        return Ok(mapping);
    }

    if headers.len() == table.columns.len() {
        tracing::debug!("Header of {} does not match column names, mapping by position", table.name);
        return Ok((0..table.columns.len()).collect());
    }

    Err(ImportError::ColumnMismatch {
        table: table.name,
        expected: table.columns.len(),
        found: headers.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write csv");
        file
    }

    const USERS_HEADER: &str =
        "AuthorId,AuthorName,Gender,Age,Followers,Following,FollowerUsers,FollowingUsers\n";

    #[test]
    fn test_load_users() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let file = csv_file(&format!(
            "{}1,Ann,Female,30,1,1,\"2\",\"2\"\n2,Bob,Male,,0,0,,\n",
            USERS_HEADER
        ));

        let rows = load_table(&conn, &STAGING_USERS, Some(file.path())).expect("load succeeds");
        assert_eq!(rows, 2);

        let age: Option<i64> = conn
            .query_row("SELECT Age FROM staging_users WHERE AuthorId = 2", [], |row| row.get(0))
            .expect("Failed to query");
        assert_eq!(age, None, "empty field is NULL");
    }

    #[test]
    fn test_quoted_empty_field_is_null() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let file = csv_file(&format!("{}4,\"\",,,,,\"\",\"\"\n", USERS_HEADER));

        load_table(&conn, &STAGING_USERS, Some(file.path())).expect("load succeeds");
        let (name, followers): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT AuthorName, FollowerUsers FROM staging_users WHERE AuthorId = 4",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("Failed to query");
        assert_eq!((name, followers), (None, None));
    }

    #[test]
    fn test_columns_mapped_by_name() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let file = csv_file(
            "FollowingUsers,FollowerUsers,Following,Followers,Age,Gender,AuthorName,AuthorId\n\
             \"9\",,1,0,41,Male,Cal,3\n",
        );

        load_table(&conn, &STAGING_USERS, Some(file.path())).expect("load succeeds");
        let (id, name, following): (i64, String, String) = conn
            .query_row(
                "SELECT AuthorId, AuthorName, FollowingUsers FROM staging_users",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("Failed to query");
        assert_eq!((id, name.as_str(), following.as_str()), (3, "Cal", "9"));
    }

    #[test]
    fn test_columns_mapped_by_position() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let file = csv_file("id,name,gender,age,a,b,c,d\n5,Dee,F,22,0,0,,\n");

        load_table(&conn, &STAGING_USERS, Some(file.path())).expect("load succeeds");
        let name: String = conn
            .query_row("SELECT AuthorName FROM staging_users WHERE AuthorId = 5", [], |row| {
                row.get(0)
            })
            .expect("Failed to query");
        assert_eq!(name, "Dee");
    }

    #[test]
    fn test_column_count_mismatch() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let file = csv_file("a,b,c\n1,2,3\n");

        let err = load_table(&conn, &STAGING_USERS, Some(file.path())).expect_err("must fail");
        assert!(matches!(
            err,
            ImportError::ColumnMismatch { expected: 8, found: 3, .. }
        ));
    }

    #[test]
    fn test_invalid_value_reports_line() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let file = csv_file(&format!("{}1,Ann,F,30,0,0,,\nx,Bob,M,30,0,0,,\n", USERS_HEADER));

        let err = load_table(&conn, &STAGING_USERS, Some(file.path())).expect_err("must fail");
        match err {
            ImportError::InvalidValue { column, line, .. } => {
                assert_eq!(column, "AuthorId");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_path_fails_after_table_creation() {
        let conn = Connection::open_in_memory().expect("Failed to open database");

        let err = load_table(&conn, &STAGING_REVIEWS, None).expect_err("must fail");
        assert!(matches!(err, ImportError::MissingSourcePath { table: "staging_reviews" }));

        let exists: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='staging_reviews'",
                [],
                |row| row.get(0),
            )
            .expect("Failed to check table");
        assert_eq!(exists, 1);
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let err = load_table(&conn, &STAGING_USERS, Some(Path::new("/nonexistent/user.csv")))
            .expect_err("must fail");
        assert!(matches!(err, ImportError::Csv { .. }));
        assert!(err.to_string().contains("/nonexistent/user.csv"));
    }

    #[test]
    fn test_ragged_record_is_rejected() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        let file = csv_file(&format!("{}1,Ann,F,30\n", USERS_HEADER));
        let err = load_table(&conn, &STAGING_USERS, Some(file.path())).expect_err("must fail");
        assert!(matches!(err, ImportError::Csv { .. }));
    }
}
