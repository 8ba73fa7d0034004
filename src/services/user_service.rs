//! Domain service for the account lifecycle: signup, profile reads, guarded
//! partial updates, and admin-only deletion with referential cleanup.

use thiserror::Error;

use crate::db::Account;
use crate::domain::validate::FieldError;
use crate::entities::microposts;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Account not found")]
    NotFound,

    /// The target exists but the requester may not touch it.
    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed on {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Email uniqueness violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<FieldError> for UserError {
    fn from(err: FieldError) -> Self {
        Self::Validation {
            field: err.field,
            reason: err.reason,
        }
    }
}

/// Signup input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Typed partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile view: the account with its posts and graph counts.
#[derive(Debug, Clone)]
pub struct Profile {
    pub account: Account,
    pub posts: Vec<microposts::Model>,
    pub following_count: u64,
    pub follower_count: u64,
}

/// Domain service trait for the account lifecycle.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates an account and issues a token so the caller is
    /// authenticated immediately.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] on any rejected field and
    /// [`UserError::Conflict`] on a duplicate email; neither writes anything.
    async fn create(&self, new_user: NewUser) -> Result<(Account, String), UserError>;

    async fn get(&self, id: i32) -> Result<Account, UserError>;

    async fn list(&self) -> Result<Vec<Account>, UserError>;

    /// Account plus posts and following/follower counts.
    async fn profile(&self, id: i32) -> Result<Profile, UserError>;

    /// Applies a partial update; owner-or-admin only, and the merged result
    /// is re-validated before anything is committed.
    async fn update(
        &self,
        requester: &Account,
        target_id: i32,
        patch: UserPatch,
    ) -> Result<Account, UserError>;

    /// Deletes an account; admin only. Cascades tokens, posts, and follow
    /// edges in both directions.
    async fn delete(&self, requester: &Account, target_id: i32) -> Result<(), UserError>;
}
