//! Schema normalizer: rebuilds the final tables from the staging tables.

use rusqlite::Connection;

use crate::db::execute_statement;
use crate::db::schema::FINAL_TABLES;
use crate::error::StoreResult;

/// Drop and rebuild every final table.
///
/// All final tables are dropped first, children before parents, so a parent
/// is never dropped while a table referencing it still exists. They are then
/// created and filled in dependency order. The first failing statement aborts.
pub fn run(conn: &Connection) -> StoreResult<()> {
    for def in FINAL_TABLES.iter().rev() {
        execute_statement(conn, def.table.as_str(), &def.drop_sql())?;
    }

    for def in FINAL_TABLES.iter() {
        let table = def.table.as_str();
        tracing::debug!("Building {}", table);

        execute_statement(conn, table, def.create)?;
        let mut inserted = 0;
        for sql in (def.populate)() {
            inserted += execute_statement(conn, table, &sql)?;
        }
        tracing::debug!("{} rows inserted into {}", inserted, table);
    }

    Ok(())
}
