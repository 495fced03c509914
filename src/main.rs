use forkedflavors::{app, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "forkedflavors=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let address = config.server_address();

    let state = match AppState::init(config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return Err(e);
        }
    };

    app::serve(app::build_app(state.clone()), &address).await?;

    state.db.close().await?;
    Ok(())
}
