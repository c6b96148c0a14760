mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use pinhole_core::{Repository, Shortener};
use pinhole_gateway::{App, AppState, JwtIdentityProvider};
use pinhole_generator::HashGenerator;
use pinhole_shortener::ShortenerService;
use pinhole_storage::{InMemoryRepository, MySqlRepository};
use pinhole_telemetry::TelemetryConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let telemetry = TelemetryConfig::builder()
        .service_name("pinhole-gateway")
        .filter(config.log_filter.clone())
        .format(config.log_format.into())
        .otlp_endpoint(config.otlp_endpoint.clone())
        .build();
    let _telemetry = pinhole_telemetry::init(&telemetry).context("failed to initialize tracing")?;

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        code_length = config.code_length,
        "starting gateway server"
    );

    let shortener = match config.storage {
        StorageBackendArg::InMemory => build_shortener(InMemoryRepository::new(), &config),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to mysql")?;
            build_shortener(repository, &config)
        }
    };

    let identity = Arc::new(JwtIdentityProvider::new(config.jwt_secret.as_bytes()));
    let state = AppState::new(shortener, identity, config.public_base_url.clone());

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server failed")?;

    info!("gateway stopped");
    Ok(())
}

fn build_shortener<R: Repository>(repository: R, config: &CLI) -> Arc<dyn Shortener> {
    let generator = HashGenerator::builder()
        .code_length(config.code_length)
        .build();
    Arc::new(ShortenerService::new(repository, generator))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
