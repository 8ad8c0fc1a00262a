//! Follow relations between users.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{FollowsRepo, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

pub struct FollowService {
    users: Arc<dyn UsersRepo>,
    follows: Arc<dyn FollowsRepo>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UsersRepo>, follows: Arc<dyn FollowsRepo>) -> Self {
        Self { users, follows }
    }

    /// Subscribe `follower` to `username`'s posts. Already-following and
    /// self-follow are silent no-ops; only an unknown username is an error.
    pub async fn follow(&self, follower: Uuid, username: &str) -> Result<UserRecord, AppError> {
        let author = self.author(username).await?;

        if author.id == follower || self.follows.follow_exists(follower, author.id).await? {
            return Ok(author);
        }

        match self.follows.create_follow(follower, author.id).await {
            Ok(_) => {
                info!(follower = %follower, author = %author.username, "follow created");
                Ok(author)
            }
            // A concurrent request won the insert; the relation exists, which
            // is all the caller asked for.
            Err(RepoError::Duplicate { .. }) => Ok(author),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove the relation. Unknown username or a pair that was never
    /// followed is NotFound.
    pub async fn unfollow(&self, follower: Uuid, username: &str) -> Result<UserRecord, AppError> {
        let author = self.author(username).await?;

        let removed = self.follows.delete_follow(follower, author.id).await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }

        info!(follower = %follower, author = %author.username, "follow removed");
        Ok(author)
    }

    pub async fn is_following(&self, follower: Uuid, author_id: Uuid) -> Result<bool, AppError> {
        Ok(self.follows.follow_exists(follower, author_id).await?)
    }

    async fn author(&self, username: &str) -> Result<UserRecord, AppError> {
        self.users
            .get_user_by_username(username)
            .await?
            .ok_or(AppError::NotFound)
    }
}
