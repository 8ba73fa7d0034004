//! Domain service for authentication: credential verification and the
//! token/session lifecycle.

use thiserror::Error;

use crate::db::Account;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password, or dead token. Deliberately carries
    /// no detail so callers cannot enumerate accounts.
    #[error("Authentication failed")]
    Unauthenticated,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Successful login: the account plus its freshly rotated bearer token.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub account: Account,
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and rotates the account's token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] for both unknown email and
    /// wrong password, with no distinguishing signal.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a presented bearer token to its account.
    async fn resolve_token(&self, token: &str) -> Result<Account, AuthError>;

    /// Revokes all live tokens for an account. Idempotent.
    async fn logout(&self, account_id: i32) -> Result<(), AuthError>;
}
