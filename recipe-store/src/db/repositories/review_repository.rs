use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use recipe_types::{Like, Review};

use super::timestamp_column;
use crate::db::DbPool;

pub struct ReviewRepository {
    pool: DbPool,
}

impl ReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_by_id(&self, review_id: i64) -> Result<Option<Review>> {
        let conn = self.pool.get()?;
        let review = conn
            .query_row(
                r#"SELECT "ReviewID", Rating, "Review Content", "Date Submitted", "Date Modified"
                   FROM Reviews_rf
                   WHERE "ReviewID" = ?"#,
                [review_id],
                |row| {
                    Ok(Review {
                        review_id: row.get(0)?,
                        rating: row.get(1)?,
                        content: row.get(2)?,
                        date_submitted: timestamp_column(row, 3)?,
                        date_modified: timestamp_column(row, 4)?,
                    })
                },
            )
            .optional()
            .context("Failed to load review")?;

        Ok(review)
    }

    /// Every like, ordered by review then author
    pub fn all_likes(&self) -> Result<Vec<Like>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT ReviewId, AuthorId FROM Likes ORDER BY ReviewId, AuthorId")?;
        let likes = stmt
            .query_map([], |row| {
                Ok(Like {
                    review_id: row.get(0)?,
                    author_id: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(likes)
    }

    /// Authors who liked a review
    pub fn likers(&self, review_id: i64) -> Result<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT AuthorId FROM Likes WHERE ReviewId = ? ORDER BY AuthorId")?;
        let authors = stmt
            .query_map([review_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(authors)
    }
}
