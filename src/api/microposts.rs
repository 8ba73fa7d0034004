use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::PostDto;
use crate::db::Account;

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub picture: Option<String>,
}

/// POST /microposts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostDto>>), ApiError> {
    let post = state
        .post_service()
        .create(&requester, &payload.content, payload.picture)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(PostDto::from(post))),
    ))
}

/// DELETE /microposts/{id}
/// Author only; an admin cannot delete someone else's post.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Account>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.post_service().delete(&requester, id).await?;
    Ok(Json(ApiResponse::success(())))
}
