//! Tally calculation service (`calcsrv`)

use std::net::SocketAddr;

use clap::Parser;
use common::logging::{self, LogConfig};
use common::sqlite::SqliteClient;
use common::ServiceArgs;
use errors::{ServiceError, ServiceResult};
use tokio_util::sync::CancellationToken;
use tracing::info;

use calcsrv::config::SERVICE_NAME;
use calcsrv::{create_routes, AppState, CalcsrvConfig};

#[tokio::main]
async fn main() -> ServiceResult<()> {
    let args = ServiceArgs::parse();
    let config = CalcsrvConfig::load(&args)?;

    logging::init_with_config(LogConfig {
        service_name: SERVICE_NAME.to_string(),
        log_dir: config.logging.dir.clone(),
        level: config.logging.level.clone(),
        enable_json: config.logging.json,
        enable_file: config.logging.enable_file,
        ansi: !args.no_color,
    })
    .map_err(|e| ServiceError::StartupFailed(format!("Failed to initialize logging: {}", e)))?;

    // Validation mode: validate and exit
    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    info!(
        "Starting {} v{}",
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION")
    );

    let db = SqliteClient::new(&config.database.path).await?;
    let addr: SocketAddr = config.api.bind_address().parse().map_err(|e| {
        ServiceError::Configuration(format!(
            "Invalid bind address '{}': {}",
            config.api.bind_address(),
            e
        ))
    })?;

    let state = AppState::build(config, db).await?;
    let app = create_routes(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::StartupFailed(format!("Failed to bind to {}: {}", addr, e)))?;
    info!("API server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let shutdown_token = CancellationToken::new();
    common::shutdown::cancel_on_shutdown(shutdown_token.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await?;

    info!("{} stopped", SERVICE_NAME);
    Ok(())
}
