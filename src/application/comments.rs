//! Comment creation against existing posts.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::forms::validate_comment;
use crate::application::repos::{CommentsRepo, NewComment, PostsRepo};
use crate::domain::entities::CommentRecord;

pub struct CommentService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostsRepo>, comments: Arc<dyn CommentsRepo>) -> Self {
        Self { posts, comments }
    }

    pub async fn add(
        &self,
        post_id: Uuid,
        author: Uuid,
        text: &str,
    ) -> Result<CommentRecord, AppError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let text = validate_comment(text).map_err(AppError::validation)?;

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: post.id,
                author_id: author,
                text,
            })
            .await?;

        info!(comment_id = %comment.id, post_id = %post.id, "comment added");
        Ok(comment)
    }
}
