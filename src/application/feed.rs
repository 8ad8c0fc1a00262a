//! Read-only query layer: paginated post listings and the post detail view.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Paginated, Paginator};
use crate::application::repos::{CommentsRepo, GroupsRepo, PostFilter, PostsRepo, UsersRepo};
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

/// Post detail plus everything the detail page shows alongside it.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostRecord,
    /// Total number of posts by this post's author.
    pub author_post_count: u64,
    /// All comments, newest-first.
    pub comments: Vec<CommentRecord>,
}

/// An author profile listing: the user, one page of their posts, and the
/// author's total post count.
#[derive(Debug, Clone)]
pub struct AuthorFeed {
    pub user: UserRecord,
    pub posts: Paginated<PostRecord>,
}

pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    groups: Arc<dyn GroupsRepo>,
    users: Arc<dyn UsersRepo>,
    comments: Arc<dyn CommentsRepo>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        groups: Arc<dyn GroupsRepo>,
        users: Arc<dyn UsersRepo>,
        comments: Arc<dyn CommentsRepo>,
        page_size: u32,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            comments,
            paginator: Paginator::new(page_size),
        }
    }

    /// Every post, newest-first.
    pub async fn list_all(&self, page: Option<&str>) -> Result<Paginated<PostRecord>, AppError> {
        self.list_filtered(PostFilter::default(), page).await
    }

    /// Posts filed under the group with this slug.
    pub async fn list_by_group(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(GroupRecord, Paginated<PostRecord>), AppError> {
        let group = self
            .groups
            .get_group_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound)?;
        let posts = self.list_filtered(PostFilter::by_group(group.id), page).await?;
        Ok((group, posts))
    }

    /// Posts authored by this user, plus the author record.
    pub async fn list_by_author(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<AuthorFeed, AppError> {
        let user = self
            .users
            .get_user_by_username(username)
            .await?
            .ok_or(AppError::NotFound)?;
        let posts = self.list_filtered(PostFilter::by_author(user.id), page).await?;
        Ok(AuthorFeed { user, posts })
    }

    /// Posts authored by anyone the caller follows.
    pub async fn list_followed(
        &self,
        current_user: Uuid,
        page: Option<&str>,
    ) -> Result<Paginated<PostRecord>, AppError> {
        self.list_filtered(PostFilter::followed_by(current_user), page)
            .await
    }

    /// Every group, for the post form's selector.
    pub async fn list_groups(&self) -> Result<Vec<GroupRecord>, AppError> {
        Ok(self.groups.list_groups().await?)
    }

    pub async fn post_detail(&self, post_id: Uuid) -> Result<PostDetail, AppError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let author_post_count = self
            .posts
            .count_posts(PostFilter::by_author(post.author_id))
            .await?;
        let comments = self.comments.list_comments(post.id).await?;
        Ok(PostDetail {
            post,
            author_post_count,
            comments,
        })
    }

    async fn list_filtered(
        &self,
        filter: PostFilter,
        page: Option<&str>,
    ) -> Result<Paginated<PostRecord>, AppError> {
        let total = self.posts.count_posts(filter).await?;
        let window = self.paginator.window(total, page);
        let items = self
            .posts
            .list_posts(filter, window.limit, window.offset)
            .await?;
        Ok(Paginated::new(items, window))
    }
}
