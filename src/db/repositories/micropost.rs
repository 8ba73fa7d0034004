use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::microposts;

pub struct MicropostRepository {
    conn: DatabaseConnection,
}

impl MicropostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        content: &str,
        picture: Option<String>,
    ) -> Result<microposts::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = microposts::ActiveModel {
            user_id: Set(user_id),
            content: Set(content.trim().to_string()),
            picture: Set(picture),
            created_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert micropost")
    }

    pub async fn get(&self, id: i32) -> Result<Option<microposts::Model>> {
        microposts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query micropost")
    }

    /// Most-recent posts by one author, newest first, id descending on
    /// equal timestamps so the order is deterministic.
    pub async fn by_author(
        &self,
        user_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<microposts::Model>> {
        let mut query = microposts::Entity::find()
            .filter(microposts::Column::UserId.eq(user_id))
            .order_by_desc(microposts::Column::CreatedAt)
            .order_by_desc(microposts::Column::Id);

        if let Some(n) = limit {
            query = query.limit(n);
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to query microposts by author")
    }

    pub async fn count_by_author(&self, user_id: i32) -> Result<u64> {
        microposts::Entity::find()
            .filter(microposts::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count microposts")
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        microposts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete micropost")?;

        Ok(())
    }

    /// Cascade hook used by account deletion.
    pub async fn delete_by_author(&self, user_id: i32) -> Result<()> {
        microposts::Entity::delete_many()
            .filter(microposts::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete author's microposts")?;

        Ok(())
    }
}
