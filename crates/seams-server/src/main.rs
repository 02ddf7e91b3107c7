use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use seams_api::auth::{AppState, AppStateInner};

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "seams=debug,seams_api=debug,seams_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("SEAMS_JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.into());
    let db_path = std::env::var("SEAMS_DB_PATH").unwrap_or_else(|_| "seams.db".into());
    let host = std::env::var("SEAMS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SEAMS_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    if jwt_secret == DEV_JWT_SECRET {
        warn!("SEAMS_JWT_SECRET is not set, using the development secret");
    }

    // Init store
    let db = seams_db::Database::open(&PathBuf::from(&db_path))?;
    let state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    let app = seams_api::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Seams server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
