use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, FeedError, FollowError, PostError, UserError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    /// Authenticated but not allowed; distinct from NotFound so "exists but
    /// not yours" does not masquerade as absence.
    Forbidden(String),

    /// Missing or invalid credentials. Always the same body for login
    /// failures, whatever the cause.
    Unauthorized(String),

    Validation { field: String, reason: String },

    Conflict(String),

    BadRequest(String),

    Timeout(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Validation { field, reason } => {
                write!(f, "Validation error on {}: {}", field, reason)
            }
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Validation { field, reason } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{field} {reason}"),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // One opaque message for every authentication failure.
            AuthError::Unauthenticated => ApiError::Unauthorized("Invalid credentials".into()),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => ApiError::NotFound("Account not found".into()),
            UserError::Forbidden => ApiError::Forbidden("Not allowed".into()),
            UserError::Validation { field, reason } => ApiError::Validation {
                field: field.to_string(),
                reason,
            },
            UserError::Conflict(msg) => ApiError::Conflict(msg),
            UserError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<FollowError> for ApiError {
    fn from(err: FollowError) -> Self {
        match err {
            FollowError::SelfFollowNotAllowed => {
                ApiError::BadRequest("An account cannot follow itself".into())
            }
            FollowError::NotFound => ApiError::NotFound("Account not found".into()),
            FollowError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Timeout => ApiError::Timeout("Feed aggregation timed out".into()),
            FeedError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound => ApiError::NotFound("Micropost not found".into()),
            PostError::Forbidden => ApiError::Forbidden("Not allowed".into()),
            PostError::Validation { field, reason } => ApiError::Validation {
                field: field.to_string(),
                reason,
            },
            PostError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
