use crate::{state::AppState, users::StoreError};
use axum::Router;
use thiserror::Error;

mod claims;
pub mod dto;
mod extractors;
mod gateway;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use claims::Claims;
pub use extractors::AuthUser;
pub use gateway::AuthGateway;
pub use jwt::JwtKeys;
pub use password::Passwords;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("token signature or format invalid")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
