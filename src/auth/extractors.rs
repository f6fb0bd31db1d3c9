use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{claims::Claims, gateway::AuthGateway, AuthError};
use crate::error::ApiError;

/// Verified caller identity, taken from `Authorization: Bearer <token>`.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AuthGateway>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default();

        // "<scheme> <token>"; a header with no token part counts as missing.
        let mut split = header.split_whitespace();
        let scheme = split.next();
        let Some(token) = split.next() else {
            return Err(ApiError::AuthRequired);
        };
        if !scheme.is_some_and(|s| s.eq_ignore_ascii_case("bearer")) {
            warn!("non-bearer authorization scheme");
            return Err(AuthError::InvalidToken.into());
        }

        let gateway = Arc::<AuthGateway>::from_ref(state);
        match gateway.verify_token(token) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(e) => {
                warn!(reason = %e, "token rejected");
                Err(e.into())
            }
        }
    }
}
