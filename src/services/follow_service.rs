//! Domain service for the directed follow graph.

use thiserror::Error;

use crate::db::Account;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("An account cannot follow itself")]
    SelfFollowNotAllowed,

    #[error("Account not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for FollowError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FollowError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for follow/unfollow and graph queries.
#[async_trait::async_trait]
pub trait FollowService: Send + Sync {
    /// Creates the edge requester → target. Following an already-followed
    /// account is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`FollowError::SelfFollowNotAllowed`] when requester and
    /// target are the same account.
    async fn follow(&self, requester: &Account, target_id: i32) -> Result<(), FollowError>;

    /// Removes the edge if present; an absent edge is a no-op.
    async fn unfollow(&self, requester: &Account, target_id: i32) -> Result<(), FollowError>;

    /// Accounts `account_id` follows, in primary-key order.
    async fn following(&self, account_id: i32) -> Result<Vec<Account>, FollowError>;

    /// Accounts following `account_id`, in primary-key order.
    async fn followers(&self, account_id: i32) -> Result<Vec<Account>, FollowError>;

    async fn is_following(
        &self,
        follower_id: i32,
        followee_id: i32,
    ) -> Result<bool, FollowError>;
}
