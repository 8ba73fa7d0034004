use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Statement, TransactionTrait,
};
use tracing::{info, warn};

use crate::entities::{follows, microposts, tokens, users};

pub mod migrator;
pub mod repositories;

pub use repositories::user::{Account, AccountChanges};

/// Single handle over the persistent store. All cross-request state lives
/// here; repositories share the pooled connection.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn micropost_repo(&self) -> repositories::micropost::MicropostRepository {
        repositories::micropost::MicropostRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account> {
        self.user_repo().create(name, email, password_hash).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<Account>> {
        retry_once(|| async move { self.user_repo().get_by_id(id).await }).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<Account>> {
        retry_once(|| async move { self.user_repo().get_by_email(email).await }).await
    }

    pub async fn list_users(&self) -> Result<Vec<Account>> {
        retry_once(|| async move { self.user_repo().list().await }).await
    }

    pub async fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        retry_once(|| async move { self.user_repo().email_taken(email, exclude_id).await }).await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<Account>> {
        // Not retried: one Argon2 pass per attempt, and the failure mode is
        // surfaced to the caller uniformly anyway.
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn update_user(&self, id: i32, changes: AccountChanges) -> Result<Account> {
        self.user_repo().update(id, changes).await
    }

    /// Remove an account and everything referencing it: tokens, microposts,
    /// and follow edges in both directions, in one transaction so no
    /// dangling references survive a partial failure.
    pub async fn delete_account_cascade(&self, id: i32) -> Result<()> {
        self.conn
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    tokens::Entity::delete_many()
                        .filter(tokens::Column::UserId.eq(id))
                        .exec(txn)
                        .await?;

                    microposts::Entity::delete_many()
                        .filter(microposts::Column::UserId.eq(id))
                        .exec(txn)
                        .await?;

                    follows::Entity::delete_many()
                        .filter(
                            follows::Column::FollowerId
                                .eq(id)
                                .or(follows::Column::FolloweeId.eq(id)),
                        )
                        .exec(txn)
                        .await?;

                    users::Entity::delete_by_id(id).exec(txn).await?;

                    Ok(())
                })
            })
            .await
            .context("Account delete cascade failed")?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    pub async fn issue_token(&self, user_id: i32) -> Result<String> {
        // Never retried blindly: rotation is not idempotent.
        self.token_repo().issue(user_id).await
    }

    pub async fn resolve_token(&self, token: &str) -> Result<Option<Account>> {
        retry_once(|| async move { self.token_repo().resolve(token).await }).await
    }

    pub async fn revoke_tokens(&self, user_id: i32) -> Result<()> {
        self.token_repo().revoke_all(user_id).await
    }

    pub async fn live_token_count(&self, user_id: i32) -> Result<u64> {
        self.token_repo().live_count(user_id).await
    }

    // ------------------------------------------------------------------
    // Follow graph
    // ------------------------------------------------------------------

    pub async fn add_follow(&self, follower_id: i32, followee_id: i32) -> Result<()> {
        self.follow_repo().add(follower_id, followee_id).await
    }

    pub async fn remove_follow(&self, follower_id: i32, followee_id: i32) -> Result<()> {
        self.follow_repo().remove(follower_id, followee_id).await
    }

    pub async fn is_following(&self, follower_id: i32, followee_id: i32) -> Result<bool> {
        retry_once(|| async move { self.follow_repo().is_following(follower_id, followee_id).await }).await
    }

    pub async fn following(&self, follower_id: i32) -> Result<Vec<Account>> {
        retry_once(|| async move { self.follow_repo().following(follower_id).await }).await
    }

    pub async fn followers(&self, followee_id: i32) -> Result<Vec<Account>> {
        retry_once(|| async move { self.follow_repo().followers(followee_id).await }).await
    }

    pub async fn followee_ids(&self, follower_id: i32) -> Result<Vec<i32>> {
        retry_once(|| async move { self.follow_repo().followee_ids(follower_id).await }).await
    }

    pub async fn following_count(&self, follower_id: i32) -> Result<u64> {
        retry_once(|| async move { self.follow_repo().following_count(follower_id).await }).await
    }

    pub async fn follower_count(&self, followee_id: i32) -> Result<u64> {
        retry_once(|| async move { self.follow_repo().follower_count(followee_id).await }).await
    }

    // ------------------------------------------------------------------
    // Microposts
    // ------------------------------------------------------------------

    pub async fn create_post(
        &self,
        user_id: i32,
        content: &str,
        picture: Option<String>,
    ) -> Result<microposts::Model> {
        self.micropost_repo().create(user_id, content, picture).await
    }

    pub async fn get_post(&self, id: i32) -> Result<Option<microposts::Model>> {
        retry_once(|| async move { self.micropost_repo().get(id).await }).await
    }

    pub async fn posts_by_author(
        &self,
        user_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<microposts::Model>> {
        retry_once(|| async move { self.micropost_repo().by_author(user_id, limit).await }).await
    }

    pub async fn post_count_by_author(&self, user_id: i32) -> Result<u64> {
        retry_once(|| async move { self.micropost_repo().count_by_author(user_id).await }).await
    }

    pub async fn delete_post(&self, id: i32) -> Result<()> {
        self.micropost_repo().delete(id).await
    }
}

/// Retry a read-only store call once on a transient connection failure.
/// Only used for idempotent queries; mutations go through untouched.
async fn retry_once<T, F, Fut>(op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(e) if is_transient(&e) => {
            warn!("Transient store error, retrying once: {e:#}");
            op().await
        }
        Err(e) => Err(e),
    }
}

fn is_transient(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<DbErr>(),
            Some(DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
        )
    })
}
