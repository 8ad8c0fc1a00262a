use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{NewPost, PostFilter, PostsRepo, RepoError, UpdatePost};
use crate::domain::entities::{GroupRef, PostRecord};

use super::SqliteRepositories;
use super::map_sqlx_error;

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    text: String,
    pub_date: OffsetDateTime,
    author_id: Uuid,
    author_username: String,
    group_id: Option<Uuid>,
    group_title: Option<String>,
    group_slug: Option<String>,
    image: Option<String>,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        let group = match (row.group_id, row.group_title, row.group_slug) {
            (Some(id), Some(title), Some(slug)) => Some(GroupRef { id, title, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author_id: row.author_id,
            author_username: row.author_username,
            group,
            image: row.image,
        }
    }
}

const SELECT_POST: &str = "SELECT p.id, p.text, p.pub_date, p.author_id, \
     u.username AS author_username, p.group_id, g.title AS group_title, \
     g.slug AS group_slug, p.image \
     FROM posts p \
     INNER JOIN users u ON u.id = p.author_id \
     LEFT JOIN post_groups g ON g.id = p.group_id";

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: PostFilter) {
    if let Some(group_id) = filter.group_id {
        qb.push(" AND p.group_id = ");
        qb.push_bind(group_id);
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND p.author_id = ");
        qb.push_bind(author_id);
    }
    if let Some(user_id) = filter.followed_by {
        qb.push(" AND p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ");
        qb.push_bind(user_id);
        qb.push(")");
    }
}

#[async_trait]
impl PostsRepo for SqliteRepositories {
    async fn create_post(&self, post: NewPost) -> Result<PostRecord, RepoError> {
        let id = Uuid::new_v4();
        let pub_date = OffsetDateTime::now_utc();

        sqlx::query(
            "INSERT INTO posts (id, text, pub_date, author_id, group_id, image) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&post.text)
        .bind(pub_date)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.get_post(id).await?.ok_or(RepoError::NotFound)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{SELECT_POST} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(PostRecord::from))
    }

    async fn update_post(&self, update: UpdatePost) -> Result<PostRecord, RepoError> {
        let result = sqlx::query("UPDATE posts SET text = ?, group_id = ?, image = ? WHERE id = ?")
            .bind(&update.text)
            .bind(update.group_id)
            .bind(&update.image)
            .bind(update.id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.get_post(update.id).await?.ok_or(RepoError::NotFound)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::new(SELECT_POST);
        qb.push(" WHERE 1=1");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ");
        qb.push_bind(i64::from(limit));
        qb.push(" OFFSET ");
        qb.push_bind(offset as i64);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE 1=1");
        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.max(0) as u64)
    }
}
