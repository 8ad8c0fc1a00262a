//! Post mutations: create and author-only edit.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::forms::{FieldError, PostInput, ValidPost, validate_post};
use crate::application::repos::{GroupsRepo, NewPost, PostsRepo, UpdatePost};
use crate::domain::entities::PostRecord;

pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    groups: Arc<dyn GroupsRepo>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostsRepo>, groups: Arc<dyn GroupsRepo>) -> Self {
        Self { posts, groups }
    }

    /// Persist a new post for `author`. `image` is the already-stored
    /// relative path, if the submission carried one.
    pub async fn create(
        &self,
        author: Uuid,
        input: &PostInput,
        image: Option<String>,
    ) -> Result<PostRecord, AppError> {
        let valid = self.validated(input).await?;

        let post = self
            .posts
            .create_post(NewPost {
                text: valid.text,
                author_id: author,
                group_id: valid.group_id,
                image,
            })
            .await?;

        info!(post_id = %post.id, author = %post.author_username, "post created");
        Ok(post)
    }

    /// Apply field changes to an existing post. Only the author may edit;
    /// `pub_date` and authorship never change. When `image` is `None` the
    /// stored image is kept.
    pub async fn edit(
        &self,
        post_id: Uuid,
        editor: Uuid,
        input: &PostInput,
        image: Option<String>,
    ) -> Result<PostRecord, AppError> {
        let existing = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.author_id != editor {
            return Err(AppError::Forbidden);
        }

        let valid = self.validated(input).await?;

        let updated = self
            .posts
            .update_post(UpdatePost {
                id: existing.id,
                text: valid.text,
                group_id: valid.group_id,
                image: image.or(existing.image),
            })
            .await?;

        info!(post_id = %updated.id, "post edited");
        Ok(updated)
    }

    async fn validated(&self, input: &PostInput) -> Result<ValidPost, AppError> {
        let valid = validate_post(input).map_err(AppError::validation)?;

        if let Some(group_id) = valid.group_id
            && self.groups.get_group(group_id).await?.is_none()
        {
            return Err(AppError::validation(vec![FieldError::new(
                "group",
                "Select a valid group",
            )]));
        }

        Ok(valid)
    }
}
