use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{LoginRequest, MessageResponse, TokenResponse},
    AuthError,
};
use crate::{
    error::ApiResult,
    state::AppState,
    users::{services::create_user, CreateUserRequest},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    let user = create_user(&state, payload).await?;
    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "registration successful".into(),
        }),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(payload) = payload?;
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AuthError::InvalidCredentials.into());
    };
    let token = state.gateway.authenticate(username.trim(), &password).await?;
    info!(username = %username.trim(), "user logged in");
    Ok(Json(TokenResponse { token }))
}
