use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod db;
mod state;

use rueso_backend::config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rueso_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / Загрузить конфигурацию
    let app_config = config::load_config()
        .map_err(anyhow::Error::msg)?
        .apply_env();
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);
    tracing::info!("Catalog databases in {:?}", app_config.get_data_dir());

    let state = Arc::new(AppState::from_config(&app_config));
    let cors = api::cors_layer(&app_config.server.cors_origins);
    let app = api::router(state, cors);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
