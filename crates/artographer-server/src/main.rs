use std::sync::Arc;

use tracing::{error, info};

use artographer_api::{AppState, AppStateInner};
use artographer_db::Database;
use artographer_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    artographer_server::init_tracing(config.log_json);

    let db = Database::open(&config.db_path)?;
    let state: AppState = Arc::new(AppStateInner {
        db,
        dashboard_log_limit: config.dashboard_log_limit,
    });

    let app = artographer_server::app(state, &config.dashboard_dir);

    let addr = config.addr()?;
    info!("Artographer server listening on {}", addr);
    info!("Dashboard served from {}", config.dashboard_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
