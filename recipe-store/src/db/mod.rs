pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::{Database, DatabaseTarget, DbConnection, DbPool};

use rusqlite::Connection;

use crate::error::{ImportError, StoreResult};

/// Execute one statement, logging and wrapping any failure with the table
/// it belongs to. Takes a `Connection` so a `Transaction` can be passed.
pub fn execute_statement(conn: &Connection, context: &str, sql: &str) -> StoreResult<usize> {
    conn.execute(sql, []).map_err(|e| {
        tracing::error!("Failed to execute SQL for {}: {}", context, e);
        tracing::debug!("Failed statement: {}", sql);
        ImportError::statement(context, e)
    })
}

/// Count the rows of a table, if it can be read
pub fn count_rows(conn: &Connection, table: &str) -> StoreResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}
