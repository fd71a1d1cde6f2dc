use anyhow::Result;

use crate::db::DbPool;

/// The follow lists of one staged user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingUserLists {
    pub author_id: i64,
    pub following: Option<String>,
    pub followers: Option<String>,
}

/// Raw list columns kept in the staging tables after an import, used to
/// check the final tables against what was loaded
pub struct StagingRepository {
    pool: DbPool,
}

impl StagingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn user_lists(&self) -> Result<Vec<StagingUserLists>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT AuthorId, FollowingUsers, FollowerUsers FROM staging_users ORDER BY AuthorId",
        )?;
        let users = stmt
            .query_map([], |row| {
                Ok(StagingUserLists {
                    author_id: row.get(0)?,
                    following: row.get(1)?,
                    followers: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// `(ReviewId, Likes)` for every staged review
    pub fn review_likes(&self) -> Result<Vec<(i64, Option<String>)>> {
        self.id_and_text("SELECT ReviewId, Likes FROM staging_reviews ORDER BY ReviewId")
    }

    /// `(RecipeId, FavoriteUsers)` for every staged recipe
    pub fn recipe_favorites(&self) -> Result<Vec<(i64, Option<String>)>> {
        self.id_and_text("SELECT RecipeId, FavoriteUsers FROM staging_recipes ORDER BY RecipeId")
    }

    /// `(RecipeId, RecipeInstructions)` for every staged recipe
    pub fn recipe_instructions(&self) -> Result<Vec<(i64, Option<String>)>> {
        self.id_and_text(
            "SELECT RecipeId, RecipeInstructions FROM staging_recipes ORDER BY RecipeId",
        )
    }

    fn id_and_text(&self, sql: &str) -> Result<Vec<(i64, Option<String>)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
