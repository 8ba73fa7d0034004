//! Domain service for microposts.

use thiserror::Error;

use crate::db::Account;
use crate::domain::validate::FieldError;
use crate::entities::microposts;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Micropost not found")]
    NotFound,

    /// The post exists but the requester is not its author.
    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed on {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for PostError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PostError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<FieldError> for PostError {
    fn from(err: FieldError) -> Self {
        Self::Validation {
            field: err.field,
            reason: err.reason,
        }
    }
}

/// Domain service trait for micropost writes and per-author reads.
#[async_trait::async_trait]
pub trait MicropostService: Send + Sync {
    async fn create(
        &self,
        author: &Account,
        content: &str,
        picture: Option<String>,
    ) -> Result<microposts::Model, PostError>;

    /// Deletes a post; author only, admins included out.
    async fn delete(&self, requester: &Account, post_id: i32) -> Result<(), PostError>;

    /// An author's posts, newest first.
    async fn by_author(&self, author_id: i32) -> Result<Vec<microposts::Model>, PostError>;
}
