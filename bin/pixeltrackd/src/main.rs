//! `pixeltrackd` — the pixel tracking server binary.
//!
//! Usage:
//!   pixeltrackd [--data-dir <dir>] [--sqlite <path>] [--listen <addr>]

mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use pixeltrack_core::Module;
use pixeltrack_sql::SqliteStore;
use tracking::TrackingModule;
use tracking::service::TrackingService;

/// Pixel tracking server.
#[derive(Parser, Debug)]
#[command(name = "pixeltrackd", about = "Pixel tracking server")]
struct Cli {
    /// Directory holding the service's data files.
    #[arg(long = "data-dir", default_value = "data")]
    data_dir: PathBuf,

    /// Path to the SQLite database (overrides `{data-dir}/data.sqlite`).
    #[arg(long = "sqlite")]
    sqlite: Option<PathBuf>,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = pixeltrack_core::ServiceConfig {
        data_dir: Some(cli.data_dir.clone()),
        sqlite_path: cli.sqlite.clone(),
        listen: cli.listen.clone(),
    };

    std::fs::create_dir_all(&cli.data_dir)?;

    // Initialize storage.
    let sqlite_path = config.resolve_sqlite_path();
    info!("Opening SQLite database at {}", sqlite_path.display());
    let sql = Box::new(
        SqliteStore::open(&sqlite_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let tracking_module = TrackingModule::new(
        TrackingService::new(sql)
            .map_err(|e| anyhow::anyhow!("failed to initialize tracking service: {}", e))?,
    );
    info!("Tracking module initialized");

    let module_routes = vec![(tracking_module.name().to_string(), tracking_module.routes())];

    // Build router.
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("pixeltrackd listening on {}", config.listen);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
