mod user_repository;
mod review_repository;
mod recipe_repository;
mod follow_repository;
mod staging_repository;

pub use user_repository::UserRepository;
pub use review_repository::ReviewRepository;
pub use recipe_repository::RecipeRepository;
pub use follow_repository::FollowRepository;
pub use staging_repository::{StagingRepository, StagingUserLists};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

/// Read an optional RFC3339 timestamp column
fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        s.parse::<DateTime<Utc>>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
