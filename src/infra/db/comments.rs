use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CommentsRepo, NewComment, RepoError};
use crate::domain::entities::CommentRecord;

use super::SqliteRepositories;
use super::map_sqlx_error;

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    author_username: String,
    text: String,
    created: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: row.author_username,
            text: row.text,
            created: row.created,
        }
    }
}

const SELECT_COMMENT: &str = "SELECT c.id, c.post_id, c.author_id, \
     u.username AS author_username, c.text, c.created \
     FROM comments c \
     INNER JOIN users u ON u.id = c.author_id";

#[async_trait]
impl CommentsRepo for SqliteRepositories {
    async fn create_comment(&self, comment: NewComment) -> Result<CommentRecord, RepoError> {
        let id = Uuid::new_v4();
        let created = OffsetDateTime::now_utc();

        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, text, created) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(created)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let row =
            sqlx::query_as::<_, CommentRow>(&format!("{SELECT_COMMENT} WHERE c.id = ?"))
                .bind(id)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{SELECT_COMMENT} WHERE c.post_id = ? ORDER BY c.created DESC, c.id DESC"
        ))
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn count_comments(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count.max(0) as u64)
    }
}
