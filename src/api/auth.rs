use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::AccountDto;
use crate::db::Account;

const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: AccountDto,
    pub token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware supporting both modes:
/// 1. Server-side session (cookie from login)
/// 2. `Authorization: Bearer <token>` header
///
/// Whichever succeeds, the resolved [`Account`] is attached to the request
/// extensions so handlers receive the requester explicitly - there is no
/// ambient current-user state.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    // Session first (fastest path for browser clients)
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await
        && let Ok(Some(account)) = state.store().get_user_by_id(user_id).await
    {
        tracing::Span::current().record("user_id", account.id);
        request.extensions_mut().insert(account);
        return Ok(next.run(request).await);
    }

    if let Some(token) = extract_bearer_token(&headers)
        && let Ok(account) = state.auth_service().resolve_token(&token).await
    {
        tracing::Span::current().record("user_id", account.id);
        request.extensions_mut().insert(account);
        return Ok(next.run(request).await);
    }

    let body = ApiResponse::<()>::error("Unauthorized");
    Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response())
}

/// Extract a bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with email and password. Rotates the bearer token and
/// establishes a session; failures are opaque whatever the cause.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("email", "is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("password", "is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    session
        .insert(SESSION_USER_KEY, result.account.id)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        user: AccountDto::from(result.account),
        token: result.token,
    })))
}

/// POST /auth/logout
/// Revokes the requester's tokens and drops the session. Idempotent.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
    axum::Extension(account): axum::Extension<Account>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().logout(account.id).await?;

    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    })))
}
