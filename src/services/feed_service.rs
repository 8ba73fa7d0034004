//! Feed aggregation: fan-out-on-read over the follow graph.
//!
//! The feed is the globally time-ordered union of posts authored by every
//! followed account. Per-author lists arrive already sorted newest-first;
//! a k-way merge produces the global order. Ordering contract:
//! `created_at` descending; on a cross-author timestamp tie the lower
//! author id drains first, and within one author the incoming list order
//! is preserved, so the result is deterministic.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The aggregation missed its deadline. The whole call fails; a
    /// partial feed is never returned.
    #[error("Feed aggregation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for FeedError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FeedError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// One feed entry: a post together with its author's display name.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub post_id: i32,
    pub author_id: i32,
    pub author_name: String,
    pub content: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Domain service trait for feed aggregation.
#[async_trait::async_trait]
pub trait FeedService: Send + Sync {
    /// Aggregated feed for an account. An empty follow set yields an empty
    /// feed, not an error.
    async fn feed(&self, account_id: i32) -> Result<Vec<FeedItem>, FeedError>;
}

/// Merge per-author lists (each already newest-first) into the global
/// feed order.
#[must_use]
pub fn merge_author_feeds(per_author: Vec<Vec<FeedItem>>) -> Vec<FeedItem> {
    use std::cmp::Ordering;
    use std::collections::BinaryHeap;

    struct Head {
        ts: DateTime<Utc>,
        author_id: i32,
        post_id: i32,
        list: usize,
        pos: usize,
    }

    // Max-heap ordered so the pop sequence is the feed order: newest
    // first, ties to the smaller author id, then the smaller post id.
    impl Ord for Head {
        fn cmp(&self, other: &Self) -> Ordering {
            self.ts
                .cmp(&other.ts)
                .then_with(|| other.author_id.cmp(&self.author_id))
                .then_with(|| other.post_id.cmp(&self.post_id))
        }
    }

    impl PartialOrd for Head {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl PartialEq for Head {
        fn eq(&self, other: &Self) -> bool {
            self.cmp(other) == Ordering::Equal
        }
    }

    impl Eq for Head {}

    let total: usize = per_author.iter().map(Vec::len).sum();
    let mut heap = BinaryHeap::with_capacity(per_author.len());

    for (list, items) in per_author.iter().enumerate() {
        if let Some(item) = items.first() {
            heap.push(Head {
                ts: item.created_at,
                author_id: item.author_id,
                post_id: item.post_id,
                list,
                pos: 0,
            });
        }
    }

    let mut merged = Vec::with_capacity(total);
    while let Some(head) = heap.pop() {
        let items = &per_author[head.list];
        merged.push(items[head.pos].clone());

        if let Some(next) = items.get(head.pos + 1) {
            heap.push(Head {
                ts: next.created_at,
                author_id: next.author_id,
                post_id: next.post_id,
                list: head.list,
                pos: head.pos + 1,
            });
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(author_id: i32, post_id: i32, ts_secs: i64) -> FeedItem {
        FeedItem {
            post_id,
            author_id,
            author_name: format!("author{author_id}"),
            content: format!("post {post_id}"),
            picture: None,
            created_at: Utc.timestamp_opt(ts_secs, 0).unwrap(),
        }
    }

    #[test]
    fn merges_to_global_descending_order() {
        // Author A (id 1) posted at t=5 and t=3; author B (id 2) at t=4 and
        // t=1. Global order interleaves: [5(A), 4(B), 3(A), 1(B)].
        let a = vec![item(1, 10, 5), item(1, 11, 3)];
        let b = vec![item(2, 20, 4), item(2, 21, 1)];

        let merged = merge_author_feeds(vec![a, b]);

        let order: Vec<(i32, i64)> = merged
            .iter()
            .map(|i| (i.author_id, i.created_at.timestamp()))
            .collect();
        assert_eq!(order, vec![(1, 5), (2, 4), (1, 3), (2, 1)]);
    }

    #[test]
    fn equal_timestamps_break_by_author_then_post_id() {
        let a = vec![item(2, 7, 10)];
        let b = vec![item(1, 9, 10), item(1, 3, 10)];

        let merged = merge_author_feeds(vec![a, b]);

        let ids: Vec<(i32, i32)> = merged.iter().map(|i| (i.author_id, i.post_id)).collect();
        // Author 1 drains before author 2 on equal timestamps; within one
        // author the list keeps its repository order (newest id first).
        assert_eq!(ids, vec![(1, 9), (1, 3), (2, 7)]);
    }

    #[test]
    fn empty_input_yields_empty_feed() {
        assert!(merge_author_feeds(vec![]).is_empty());
        assert!(merge_author_feeds(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn single_author_passes_through() {
        let a = vec![item(1, 2, 9), item(1, 1, 4)];
        let merged = merge_author_feeds(vec![a.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].post_id, a[0].post_id);
    }
}
