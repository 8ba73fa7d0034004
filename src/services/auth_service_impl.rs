//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::db::{Account, Store};
use crate::domain::validate::normalize_email;
use crate::services::auth_service::{AuthError, AuthService, LoginResult};

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let email = normalize_email(email);

        let account = self
            .store
            .verify_credentials(&email, password)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        // Rotation happens inside one transaction: any prior token dies the
        // moment the new one becomes visible.
        let token = self.store.issue_token(account.id).await?;

        Ok(LoginResult { account, token })
    }

    async fn resolve_token(&self, token: &str) -> Result<Account, AuthError> {
        self.store
            .resolve_token(token)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }

    async fn logout(&self, account_id: i32) -> Result<(), AuthError> {
        self.store.revoke_tokens(account_id).await?;
        Ok(())
    }
}
