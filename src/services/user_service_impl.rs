//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password;
use crate::db::{Account, AccountChanges, Store};
use crate::domain::guard;
use crate::domain::validate::{
    normalize_email, validate_email, validate_name, validate_password,
};
use crate::services::user_service::{NewUser, Profile, UserError, UserPatch, UserService};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn hash(&self, password: &str) -> Result<String, UserError> {
        let password = password.to_string();
        let config = self.security.clone();

        task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .map_err(|e| UserError::Database(format!("Hashing task panicked: {e}")))?
            .map_err(UserError::from)
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create(&self, new_user: NewUser) -> Result<(Account, String), UserError> {
        validate_name(&new_user.name)?;
        validate_email(&new_user.email)?;
        validate_password(&new_user.password)?;

        let email = normalize_email(&new_user.email);

        if self.store.email_taken(&email, None).await? {
            return Err(UserError::Conflict("Email is already registered".into()));
        }

        let password_hash = self.hash(&new_user.password).await?;

        let account = self
            .store
            .create_user(&new_user.name, &email, &password_hash)
            .await?;

        let token = self.store.issue_token(account.id).await?;

        Ok((account, token))
    }

    async fn get(&self, id: i32) -> Result<Account, UserError> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Account>, UserError> {
        Ok(self.store.list_users().await?)
    }

    async fn profile(&self, id: i32) -> Result<Profile, UserError> {
        let account = self
            .store
            .get_user_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        let posts = self.store.posts_by_author(id, None).await?;
        let following_count = self.store.following_count(id).await?;
        let follower_count = self.store.follower_count(id).await?;

        Ok(Profile {
            account,
            posts,
            following_count,
            follower_count,
        })
    }

    async fn update(
        &self,
        requester: &Account,
        target_id: i32,
        patch: UserPatch,
    ) -> Result<Account, UserError> {
        let target = self
            .store
            .get_user_by_id(target_id)
            .await?
            .ok_or(UserError::NotFound)?;

        if !guard::can_mutate_account(requester, target.id) {
            return Err(UserError::Forbidden);
        }

        // Validate the merged result before committing anything.
        let merged_name = patch.name.as_deref().unwrap_or(&target.name);
        validate_name(merged_name)?;

        let normalized_email = match patch.email.as_deref() {
            Some(email) => {
                validate_email(email)?;
                let normalized = normalize_email(email);
                if self.store.email_taken(&normalized, Some(target.id)).await? {
                    return Err(UserError::Conflict("Email is already registered".into()));
                }
                Some(normalized)
            }
            None => None,
        };

        let password_hash = match patch.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(self.hash(password).await?)
            }
            None => None,
        };

        let account = self
            .store
            .update_user(
                target.id,
                AccountChanges {
                    name: patch.name,
                    email: normalized_email,
                    password_hash,
                },
            )
            .await?;

        Ok(account)
    }

    async fn delete(&self, requester: &Account, target_id: i32) -> Result<(), UserError> {
        if !guard::can_delete_account(requester) {
            return Err(UserError::Forbidden);
        }

        let target = self
            .store
            .get_user_by_id(target_id)
            .await?
            .ok_or(UserError::NotFound)?;

        self.store.delete_account_cascade(target.id).await?;

        tracing::info!(account_id = target.id, "Account deleted by admin");

        Ok(())
    }
}
