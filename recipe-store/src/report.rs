//! Result reporter: database-side timing and per-table row counts.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use recipe_types::{FinalTable, ImportSummary, TableCounts};

use crate::db::{count_rows, execute_statement};
use crate::error::StoreResult;

const TIMING_TABLE: &str = "import_timing";

/// Start time, end time and elapsed milliseconds according to the database clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseTiming {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Record the database clock at the start of the run
pub fn start_timing(conn: &Connection) -> StoreResult<()> {
    execute_statement(
        conn,
        TIMING_TABLE,
        "CREATE TEMP TABLE IF NOT EXISTS import_timing (start_time TEXT NOT NULL)",
    )?;
    execute_statement(conn, TIMING_TABLE, "DELETE FROM import_timing")?;
    execute_statement(
        conn,
        TIMING_TABLE,
        "INSERT INTO import_timing VALUES (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
    )?;
    Ok(())
}

/// Read the elapsed time since `start_timing`. `None` if the stored times
/// cannot be read back.
pub fn measure_timing(conn: &Connection) -> StoreResult<Option<DatabaseTiming>> {
    let row: Option<(String, String, i64)> = conn
        .query_row(
            "SELECT start_time,
                    strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                    CAST(round((julianday('now') - julianday(start_time)) * 86400000.0) AS INTEGER)
             FROM import_timing",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    Ok(row.and_then(|(start, end, duration_ms)| {
        let start_time = start.parse::<DateTime<Utc>>().ok()?;
        let end_time = end.parse::<DateTime<Utc>>().ok()?;
        Some(DatabaseTiming {
            start_time,
            end_time,
            duration_ms,
        })
    }))
}

pub fn finish_timing(conn: &Connection) -> StoreResult<()> {
    execute_statement(conn, TIMING_TABLE, "DROP TABLE IF EXISTS temp.import_timing")?;
    Ok(())
}

/// Count every final table. A table that cannot be counted reports zero.
pub fn count_tables(conn: &Connection) -> TableCounts {
    let mut counts = TableCounts::default();
    for table in FinalTable::ALL {
        let count = count_rows(conn, table.as_str()).unwrap_or_else(|e| {
            tracing::debug!("Could not count {}: {}", table, e);
            0
        });
        counts.set(table, count);
    }
    counts
}

/// Fill the summary with the database timing and the row counts, then
/// remove the timing table.
pub fn collect(conn: &Connection, summary: &mut ImportSummary) -> StoreResult<()> {
    if let Some(timing) = measure_timing(conn)? {
        summary.record_database_timing(timing.start_time, timing.end_time, timing.duration_ms);
    }
    summary.counts = count_tables(conn);
    finish_timing(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tables_count_as_zero() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        assert_eq!(count_tables(&conn), TableCounts::default());
    }

    #[test]
    fn test_counts_match_table_contents() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        conn.execute_batch(
            "CREATE TABLE Likes (ReviewId INT, AuthorId INT);
             INSERT INTO Likes VALUES (1, 2), (1, 3), (2, 2);",
        )
        .expect("Failed to seed");

        let counts = count_tables(&conn);
        assert_eq!(counts.likes, 3);
        assert_eq!(counts.users, 0);
    }

    #[test]
    fn test_timing_round_trip() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        assert_eq!(
            measure_timing(&conn).ok().flatten(),
            None,
            "no timing table yet"
        );

        start_timing(&conn).expect("Failed to start timing");
        let timing = measure_timing(&conn)
            .expect("Failed to measure")
            .expect("timing recorded");
        assert!(timing.duration_ms >= 0);
        assert!(timing.end_time >= timing.start_time);

        finish_timing(&conn).expect("Failed to drop timing table");
        let exists: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_temp_master WHERE name = 'import_timing'",
                [],
                |row| row.get(0),
            )
            .expect("Failed to check temp table");
        assert_eq!(exists, 0);
    }

    #[test]
    fn test_collect_fills_summary() {
        let conn = Connection::open_in_memory().expect("Failed to open database");
        start_timing(&conn).expect("Failed to start timing");
        conn.execute_batch("CREATE TABLE Users_rf (id INT); INSERT INTO Users_rf VALUES (1);")
            .expect("Failed to seed");

        let mut summary = ImportSummary::begin(Utc::now());
        collect(&conn, &mut summary).expect("Failed to collect");
        assert_eq!(summary.counts.users, 1);
        assert!(summary.duration_ms.is_some());
        assert!(summary.end_time.is_some());
    }
}
