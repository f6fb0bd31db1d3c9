use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateUserRequest, UpdateUserRequest},
    repo_types::PublicUser,
    services::{create_user, parse_id, update_user},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create))
        .route("/users/:id", get(get_user).put(update).delete(delete))
}

#[instrument(skip_all, fields(caller = %caller.0.username))]
pub async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    Ok(Json(state.users.list().await?))
}

#[instrument(skip(state, caller), fields(caller = %caller.0.username))]
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let id = parse_id(&id)?;
    let user = state.users.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(caller = %caller.0.username))]
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let Json(payload) = payload?;
    let user = create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.0.username))]
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<PublicUser>> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let user = update_user(&state, id, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, caller), fields(caller = %caller.0.username))]
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.users.delete(id).await?;
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
