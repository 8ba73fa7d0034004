//! `SeaORM` implementation of the `FollowService` trait.

use async_trait::async_trait;

use crate::db::{Account, Store};
use crate::services::follow_service::{FollowError, FollowService};

pub struct SeaOrmFollowService {
    store: Store,
}

impl SeaOrmFollowService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn require_account(&self, id: i32) -> Result<Account, FollowError> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or(FollowError::NotFound)
    }
}

#[async_trait]
impl FollowService for SeaOrmFollowService {
    async fn follow(&self, requester: &Account, target_id: i32) -> Result<(), FollowError> {
        if requester.id == target_id {
            return Err(FollowError::SelfFollowNotAllowed);
        }

        let target = self.require_account(target_id).await?;
        self.store.add_follow(requester.id, target.id).await?;

        Ok(())
    }

    async fn unfollow(&self, requester: &Account, target_id: i32) -> Result<(), FollowError> {
        if requester.id == target_id {
            return Err(FollowError::SelfFollowNotAllowed);
        }

        // No existence check on the edge: removing an absent edge is a no-op.
        let target = self.require_account(target_id).await?;
        self.store.remove_follow(requester.id, target.id).await?;

        Ok(())
    }

    async fn following(&self, account_id: i32) -> Result<Vec<Account>, FollowError> {
        self.require_account(account_id).await?;
        Ok(self.store.following(account_id).await?)
    }

    async fn followers(&self, account_id: i32) -> Result<Vec<Account>, FollowError> {
        self.require_account(account_id).await?;
        Ok(self.store.followers(account_id).await?)
    }

    async fn is_following(
        &self,
        follower_id: i32,
        followee_id: i32,
    ) -> Result<bool, FollowError> {
        Ok(self.store.is_following(follower_id, followee_id).await?)
    }
}
