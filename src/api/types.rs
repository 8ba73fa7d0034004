use serde::Serialize;

use crate::db::Account;
use crate::entities::microposts;
use crate::services::{FeedItem, Profile};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public account view; the password hash never leaves the repository.
#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            is_admin: account.is_admin,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub created_at: String,
}

impl From<microposts::Model> for PostDto {
    fn from(post: microposts::Model) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            content: post.content,
            picture: post.picture,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub user: AccountDto,
    pub microposts: Vec<PostDto>,
    pub following_count: u64,
    pub follower_count: u64,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        Self {
            user: AccountDto::from(profile.account),
            microposts: profile.posts.into_iter().map(PostDto::from).collect(),
            following_count: profile.following_count,
            follower_count: profile.follower_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedItemDto {
    pub post_id: i32,
    pub author_id: i32,
    pub author_name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub created_at: String,
}

impl From<FeedItem> for FeedItemDto {
    fn from(item: FeedItem) -> Self {
        Self {
            post_id: item.post_id,
            author_id: item.author_id,
            author_name: item.author_name,
            content: item.content,
            picture: item.picture,
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FollowStateDto {
    pub following: bool,
}
