use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_relay::app;
use media_relay::config::settings::AppConfig;
use media_relay::infrastructure::storage::s3::StorageService;
use media_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_relay=debug,tower_http=info".into()),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("invalid configuration")?;

    let storage = StorageService::new(
        &config.storage_endpoint_url(),
        &config.minio_region,
        &config.minio_bucket,
        &config.minio_access_key,
        &config.minio_secret_key,
    );

    let port = config.server_port;
    let state = AppState::new(config, storage).context("failed to build media API client")?;
    if !state.credentials.is_configured() {
        info!("No MEDIA_API_KEY set, job submission stays disabled until a key is saved");
    }

    let app = app::create_app(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
