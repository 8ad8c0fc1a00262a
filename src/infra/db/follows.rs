use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{FollowsRepo, RepoError};
use crate::domain::entities::FollowRecord;

use super::SqliteRepositories;
use super::map_sqlx_error;

#[async_trait]
impl FollowsRepo for SqliteRepositories {
    async fn create_follow(
        &self,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<FollowRecord, RepoError> {
        let id = Uuid::new_v4();

        // UNIQUE(user_id, author_id) turns a concurrent duplicate insert into
        // RepoError::Duplicate for the caller to absorb.
        sqlx::query("INSERT INTO follows (id, user_id, author_id) VALUES (?, ?, ?)")
            .bind(id)
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(FollowRecord {
            id,
            user_id,
            author_id,
        })
    }

    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(found != 0)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn count_follows_of(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count.max(0) as u64)
    }
}
