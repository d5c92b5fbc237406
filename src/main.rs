use log::{error, info};
use mealie_import::config::AppConfig;
use mealie_import::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AppConfig::load().inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let state = AppState::from_config(&config).inspect_err(|e| error!("Startup failed: {}", e))?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(
        "Listening on {} (provider: {}, fallback: {})",
        listener.local_addr()?,
        config.default_provider,
        if config.fallback.enabled { "on" } else { "off" }
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}
