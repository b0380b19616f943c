use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use farm_monitor_service::{
    api,
    config::Config,
    firebase::FirebaseClient,
    irrigation::service::AdvisoryService,
    response_store::ResponseStore,
    sensors::SensorService,
    snapshot_cache::SnapshotCache,
    weather::WeatherClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent; env vars may be set externally)
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    let responses = ResponseStore::new(config.response_dump_dir.clone());
    if responses.is_enabled() {
        info!(dir = ?config.response_dump_dir, "Raw upstream responses will be saved");
    }

    // Latest derived state, shared by both poll loops and the HTTP handlers
    let cache = SnapshotCache::new();

    // Spawn sensor-polling task
    {
        let firebase = FirebaseClient::new(&config, responses.clone());
        let service = SensorService::new(firebase, cache.clone(), config.poll_interval_secs);
        tokio::spawn(service.run());
    }

    // Spawn forecast-polling task
    {
        let weather = WeatherClient::new(&config, responses);
        let service = AdvisoryService::new(weather, cache.clone(), config.forecast_interval_secs);
        tokio::spawn(service.run());
    }

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(cache))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
