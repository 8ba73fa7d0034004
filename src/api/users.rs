use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{AccountDto, FeedItemDto, FollowStateDto, PostDto, ProfileDto};
use crate::db::Account;
use crate::services::{NewUser, UserPatch};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Supported partial-update fields; anything absent keeps its value.
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(serde::Serialize)]
pub struct SignupResponse {
    pub user: AccountDto,
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /users (public)
/// Signup. The fresh token authenticates the caller immediately.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SignupResponse>>), ApiError> {
    let (account, token) = state
        .user_service()
        .create(NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    session
        .insert("user_id", account.id)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SignupResponse {
            user: AccountDto::from(account),
            token,
        })),
    ))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(_requester): Extension<Account>,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    let users = state.user_service().list().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(AccountDto::from).collect(),
    )))
}

/// GET /users/{id}
/// Profile: the account, its posts, and graph counts.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(_requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state.user_service().profile(id).await?;
    Ok(Json(ApiResponse::success(ProfileDto::from(profile))))
}

/// PATCH /users/{id}
/// Owner-or-admin partial update.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let account = state
        .user_service()
        .update(
            &requester,
            id,
            UserPatch {
                name: payload.name,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// DELETE /users/{id}
/// Admin only; cascades tokens, posts, and follow edges.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.user_service().delete(&requester, id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// POST /users/{id}/follow
pub async fn follow_user(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.follow_service().follow(&requester, id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// POST /users/{id}/unfollow
pub async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.follow_service().unfollow(&requester, id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// GET /users/{id}/following
pub async fn following(
    State(state): State<Arc<AppState>>,
    Extension(_requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    let accounts = state.follow_service().following(id).await?;
    Ok(Json(ApiResponse::success(
        accounts.into_iter().map(AccountDto::from).collect(),
    )))
}

/// GET /users/{id}/followers
pub async fn followers(
    State(state): State<Arc<AppState>>,
    Extension(_requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    let accounts = state.follow_service().followers(id).await?;
    Ok(Json(ApiResponse::success(
        accounts.into_iter().map(AccountDto::from).collect(),
    )))
}

/// GET /users/{id}/is-following
/// Does the requester follow account {id}?
pub async fn is_following(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<FollowStateDto>>, ApiError> {
    let following = state
        .follow_service()
        .is_following(requester.id, id)
        .await?;

    Ok(Json(ApiResponse::success(FollowStateDto { following })))
}

/// GET /users/{id}/microposts
pub async fn user_posts(
    State(state): State<Arc<AppState>>,
    Extension(_requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<PostDto>>>, ApiError> {
    let posts = state.post_service().by_author(id).await?;
    Ok(Json(ApiResponse::success(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

/// GET /feed
/// The requester's aggregated feed, globally ordered newest-first.
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
) -> Result<Json<ApiResponse<Vec<FeedItemDto>>>, ApiError> {
    let items = state.feed_service().feed(requester.id).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(FeedItemDto::from).collect(),
    )))
}
