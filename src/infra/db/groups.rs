use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use crate::application::repos::{GroupsRepo, NewGroup, RepoError};
use crate::domain::entities::GroupRecord;

use super::SqliteRepositories;
use super::map_sqlx_error;

#[derive(Debug, FromRow)]
struct GroupRow {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
}

impl From<GroupRow> for GroupRecord {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
        }
    }
}

const SELECT_GROUP: &str = "SELECT id, title, slug, description FROM post_groups";

#[async_trait]
impl GroupsRepo for SqliteRepositories {
    async fn create_group(&self, group: NewGroup) -> Result<GroupRecord, RepoError> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO post_groups (id, title, slug, description) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(&group.title)
            .bind(&group.slug)
            .bind(&group.description)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(GroupRecord {
            id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        })
    }

    async fn get_group(&self, id: Uuid) -> Result<Option<GroupRecord>, RepoError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!("{SELECT_GROUP} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(GroupRecord::from))
    }

    async fn get_group_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!("{SELECT_GROUP} WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(GroupRecord::from))
    }

    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!("{SELECT_GROUP} ORDER BY title"))
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(GroupRecord::from).collect())
    }

    async fn delete_group(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM post_groups WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
