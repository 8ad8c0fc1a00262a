//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CommentRecord, FollowRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("integrity error: {message}")]
    Integrity { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Filter applied to post listings. Fields combine with AND; an empty filter
/// selects every post. Ordering is always newest-first by `pub_date`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub group_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    /// Restrict to posts whose author is followed by this user.
    pub followed_by: Option<Uuid>,
}

impl PostFilter {
    pub fn by_group(group_id: Uuid) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn followed_by(user_id: Uuid) -> Self {
        Self {
            followed_by: Some(user_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

/// Field changes applied on edit. `pub_date` and `author_id` are immutable
/// and deliberately absent.
#[derive(Debug, Clone)]
pub struct UpdatePost {
    pub id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, username: &str) -> Result<UserRecord, RepoError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait GroupsRepo: Send + Sync {
    async fn create_group(&self, group: NewGroup) -> Result<GroupRecord, RepoError>;
    async fn get_group(&self, id: Uuid) -> Result<Option<GroupRecord>, RepoError>;
    async fn get_group_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError>;
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError>;
    async fn delete_group(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<PostRecord, RepoError>;
    async fn get_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;
    async fn update_post(&self, update: UpdatePost) -> Result<PostRecord, RepoError>;
    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostRecord>, RepoError>;
    async fn count_posts(&self, filter: PostFilter) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn create_comment(&self, comment: NewComment) -> Result<CommentRecord, RepoError>;
    /// Comments for a post, newest-first.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError>;
    async fn count_comments(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait FollowsRepo: Send + Sync {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid)
    -> Result<FollowRecord, RepoError>;
    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;
    /// Returns the number of relations removed (zero or one).
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, RepoError>;
    async fn count_follows_of(&self, author_id: Uuid) -> Result<u64, RepoError>;
}
