//! `SeaORM` implementation of the `FeedService` trait.
//!
//! Read-only and lock-free: the follow set and per-author lists may change
//! between sub-fetches, which is acceptable; the whole aggregation is
//! bounded by a single deadline instead.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;

use crate::config::FeedConfig;
use crate::db::Store;
use crate::entities::microposts;
use crate::services::feed_service::{FeedError, FeedItem, FeedService, merge_author_feeds};

pub struct SeaOrmFeedService {
    store: Store,
    config: FeedConfig,
}

impl SeaOrmFeedService {
    #[must_use]
    pub const fn new(store: Store, config: FeedConfig) -> Self {
        Self { store, config }
    }

    async fn aggregate(&self, account_id: i32) -> Result<Vec<FeedItem>, FeedError> {
        let authors = self.store.following(account_id).await?;
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let names: HashMap<i32, String> = authors
            .iter()
            .map(|a| (a.id, a.name.clone()))
            .collect();

        // One capped fetch per followed author, issued concurrently.
        let limit = Some(self.config.per_author_limit);
        let fetches = authors
            .iter()
            .map(|author| self.store.posts_by_author(author.id, limit));
        let per_author_posts = try_join_all(fetches).await?;

        let mut per_author = Vec::with_capacity(per_author_posts.len());
        for posts in per_author_posts {
            let mut items = Vec::with_capacity(posts.len());
            for post in posts {
                items.push(to_feed_item(post, &names)?);
            }
            per_author.push(items);
        }

        Ok(merge_author_feeds(per_author))
    }
}

fn to_feed_item(
    post: microposts::Model,
    names: &HashMap<i32, String>,
) -> Result<FeedItem, FeedError> {
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&post.created_at)
        .map_err(|e| FeedError::Database(format!("Corrupt post timestamp: {e}")))?
        .with_timezone(&Utc);

    let author_name = names.get(&post.user_id).cloned().unwrap_or_default();

    Ok(FeedItem {
        post_id: post.id,
        author_id: post.user_id,
        author_name,
        content: post.content,
        picture: post.picture,
        created_at,
    })
}

#[async_trait]
impl FeedService for SeaOrmFeedService {
    async fn feed(&self, account_id: i32) -> Result<Vec<FeedItem>, FeedError> {
        let deadline = Duration::from_secs(self.config.timeout_seconds);

        tokio::time::timeout(deadline, self.aggregate(account_id))
            .await
            .map_err(|_| FeedError::Timeout)?
    }
}
