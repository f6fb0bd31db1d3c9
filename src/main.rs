use userguard::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    userguard::init_tracing();

    let app_state = AppState::init().await?;
    let config = app_state.config.clone();

    let router = app::build_app(app_state);
    app::serve(router, &config).await
}
