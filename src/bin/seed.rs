//! Inserts one user from `SEED_USERNAME`, `SEED_EMAIL` and `SEED_PASSWORD`.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use userguard::{
    config::AppConfig,
    db,
    error::ApiError,
    state::AppState,
    users::{services::create_user, CreateUserRequest, PgUserStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    userguard::init_tracing();

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config).await;
    db::migrate(&pool).await?;
    let state = AppState::from_parts(Arc::new(config), Arc::new(PgUserStore::new(pool)))?;

    let req = CreateUserRequest {
        username: Some(std::env::var("SEED_USERNAME").context("SEED_USERNAME is not set")?),
        email: Some(std::env::var("SEED_EMAIL").context("SEED_EMAIL is not set")?),
        password: Some(std::env::var("SEED_PASSWORD").context("SEED_PASSWORD is not set")?),
    };

    match create_user(&state, req).await {
        Ok(user) => info!(user_id = %user.id, username = %user.username, "seed user created"),
        Err(ApiError::DuplicateKey) => info!("seed user already exists"),
        Err(e) => return Err(anyhow::anyhow!(e)),
    }
    Ok(())
}
