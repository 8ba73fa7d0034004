//! `SeaORM` implementation of the `MicropostService` trait.

use async_trait::async_trait;

use crate::db::{Account, Store};
use crate::domain::guard;
use crate::domain::validate::validate_post_content;
use crate::entities::microposts;
use crate::services::micropost_service::{MicropostService, PostError};

pub struct SeaOrmMicropostService {
    store: Store,
}

impl SeaOrmMicropostService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MicropostService for SeaOrmMicropostService {
    async fn create(
        &self,
        author: &Account,
        content: &str,
        picture: Option<String>,
    ) -> Result<microposts::Model, PostError> {
        validate_post_content(content)?;

        Ok(self.store.create_post(author.id, content, picture).await?)
    }

    async fn delete(&self, requester: &Account, post_id: i32) -> Result<(), PostError> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or(PostError::NotFound)?;

        if !guard::can_delete_post(requester, post.user_id) {
            return Err(PostError::Forbidden);
        }

        self.store.delete_post(post.id).await?;

        Ok(())
    }

    async fn by_author(&self, author_id: i32) -> Result<Vec<microposts::Model>, PostError> {
        self.store
            .get_user_by_id(author_id)
            .await?
            .ok_or(PostError::NotFound)?;

        Ok(self.store.posts_by_author(author_id, None).await?)
    }
}
