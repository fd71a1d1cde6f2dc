use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use recipe_types::User;

use crate::db::DbPool;

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get user by author id
    pub fn get_by_id(&self, author_id: i64) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                r#"SELECT "AuthorID", "Name", Age, Gender, "Following Count", "Follower Count"
                   FROM Users_rf
                   WHERE "AuthorID" = ?"#,
                [author_id],
                |row| {
                    Ok(User {
                        author_id: row.get(0)?,
                        name: row.get(1)?,
                        age: row.get(2)?,
                        gender: row.get(3)?,
                        following_count: row.get(4)?,
                        follower_count: row.get(5)?,
                    })
                },
            )
            .optional()
            .context("Failed to load user")?;

        Ok(user)
    }

    /// All author ids, ascending
    pub fn list_ids(&self) -> Result<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(r#"SELECT "AuthorID" FROM Users_rf ORDER BY "AuthorID""#)?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
