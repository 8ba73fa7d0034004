use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{follows, users};

use super::user::Account;

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create the edge follower → followee.
    ///
    /// An already-existing edge is a successful no-op: the insert carries
    /// ON CONFLICT DO NOTHING against the unique pair index, so two racing
    /// follow calls cannot produce a duplicate.
    pub async fn add(&self, follower_id: i32, followee_id: i32) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = follows::ActiveModel {
            follower_id: Set(follower_id),
            followee_id: Set(followee_id),
            created_at: Set(now),
            ..Default::default()
        };

        let result = follows::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    follows::Column::FollowerId,
                    follows::Column::FolloweeId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) => Ok(()),
            // DO NOTHING fired: the edge already exists.
            Err(sea_orm::DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e).context("Failed to insert follow edge"),
        }
    }

    /// Delete the edge if present; an absent edge is not an error.
    pub async fn remove(&self, follower_id: i32, followee_id: i32) -> Result<()> {
        follows::Entity::delete_many()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FolloweeId.eq(followee_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete follow edge")?;

        Ok(())
    }

    pub async fn is_following(&self, follower_id: i32, followee_id: i32) -> Result<bool> {
        let count = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FolloweeId.eq(followee_id))
            .count(&self.conn)
            .await
            .context("Failed to check follow edge")?;

        Ok(count > 0)
    }

    /// Accounts this user follows, in primary-key order.
    pub async fn following(&self, follower_id: i32) -> Result<Vec<Account>> {
        let ids: Vec<i32> = self.followee_ids(follower_id).await?;
        self.accounts_by_ids(ids).await
    }

    /// Accounts following this user, in primary-key order.
    pub async fn followers(&self, followee_id: i32) -> Result<Vec<Account>> {
        let edges = follows::Entity::find()
            .filter(follows::Column::FolloweeId.eq(followee_id))
            .all(&self.conn)
            .await
            .context("Failed to query followers")?;

        let ids = edges.into_iter().map(|e| e.follower_id).collect();
        self.accounts_by_ids(ids).await
    }

    /// Followee ids only; the feed path needs no account details up front.
    pub async fn followee_ids(&self, follower_id: i32) -> Result<Vec<i32>> {
        let edges = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .all(&self.conn)
            .await
            .context("Failed to query following")?;

        Ok(edges.into_iter().map(|e| e.followee_id).collect())
    }

    pub async fn following_count(&self, follower_id: i32) -> Result<u64> {
        follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .count(&self.conn)
            .await
            .context("Failed to count following")
    }

    pub async fn follower_count(&self, followee_id: i32) -> Result<u64> {
        follows::Entity::find()
            .filter(follows::Column::FolloweeId.eq(followee_id))
            .count(&self.conn)
            .await
            .context("Failed to count followers")
    }

    async fn accounts_by_ids(&self, ids: Vec<i32>) -> Result<Vec<Account>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load accounts for follow edges")?;

        Ok(users.into_iter().map(Account::from).collect())
    }
}
