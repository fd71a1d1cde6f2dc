use anyhow::Result;

use recipe_types::FollowEdge;

use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Every edge, ordered by follower then followed user
    pub fn all_edges(&self) -> Result<Vec<FollowEdge>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT FollowerID, FollowingID FROM Follow ORDER BY FollowerID, FollowingID",
        )?;
        let edges = stmt
            .query_map([], |row| Ok(FollowEdge::new(row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    /// Users that `author_id` follows
    pub fn get_following(&self, author_id: i64) -> Result<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT FollowingID FROM Follow WHERE FollowerID = ? ORDER BY FollowingID",
        )?;
        let ids = stmt
            .query_map([author_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Users following `author_id`
    pub fn get_followers(&self, author_id: i64) -> Result<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT FollowerID FROM Follow WHERE FollowingID = ? ORDER BY FollowerID",
        )?;
        let ids = stmt
            .query_map([author_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn is_following(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM Follow WHERE FollowerID = ? AND FollowingID = ?",
            [follower_id, following_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
