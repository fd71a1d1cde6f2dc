//! The import run: load, normalize and report inside one transaction.

use chrono::Utc;
use std::time::Instant;

use recipe_types::ImportSummary;

use crate::config::{Settings, Sources};
use crate::db::Database;
use crate::error::StoreResult;
use crate::{normalize, report, staging};

/// Run the whole import described by `settings`.
///
/// Never fails: every error ends up in the returned summary.
pub fn run(settings: &Settings) -> ImportSummary {
    let clock = Instant::now();
    let mut summary = ImportSummary::begin(Utc::now());

    match Database::open(&settings.database.url) {
        Ok(db) => {
            let result = import(&db, &settings.sources, &mut summary);
            conclude(&mut summary, result);
        }
        Err(e) => conclude(&mut summary, Err(e)),
    }

    summary.finish(Utc::now(), clock.elapsed());
    summary
}

/// Run the import against an already opened database
pub fn run_on(db: &Database, sources: &Sources) -> ImportSummary {
    let clock = Instant::now();
    let mut summary = ImportSummary::begin(Utc::now());

    let result = import(db, sources, &mut summary);
    conclude(&mut summary, result);

    summary.finish(Utc::now(), clock.elapsed());
    summary
}

fn conclude(summary: &mut ImportSummary, result: StoreResult<()>) {
    match result {
        Ok(()) => summary.mark_succeeded(),
        Err(e) => {
            tracing::error!("Import failed: {}", e);
            summary.record_failure(e.to_string());
        }
    }
}

/// Everything happens in one transaction that is committed last. Returning
/// early drops the transaction, which rolls back staging and final tables alike.
fn import(db: &Database, sources: &Sources, summary: &mut ImportSummary) -> StoreResult<()> {
    sources.warn_missing();

    let mut conn = db.connection()?;
    let tx = conn.transaction()?;

    report::start_timing(&tx)?;

    let staged = staging::load_all(&tx, sources)?;
    tracing::info!(
        "Staged {} users, {} reviews, {} recipes",
        staged.users,
        staged.reviews,
        staged.recipes
    );

    normalize::run(&tx)?;
    report::collect(&tx, summary)?;

    tx.commit()?;
    tracing::info!("Import committed");
    Ok(())
}
