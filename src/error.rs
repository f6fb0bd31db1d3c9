use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::{auth::AuthError, users::StoreError};

/// Failures as seen by an HTTP client. Each variant maps to exactly one status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("username or email already in use")]
    DuplicateKey,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("token required")]
    AuthRequired,
    #[error("token invalid")]
    InvalidToken,
    #[error("user not found")]
    NotFound,
    #[error("server error")]
    Internal(#[source] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateKey => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::AuthRequired => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey => ApiError::DuplicateKey,
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidToken | AuthError::ExpiredToken => {
                debug!(reason = %e, "token rejected");
                ApiError::InvalidToken
            }
            AuthError::Store(e) => e.into(),
            AuthError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Validation(e.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
