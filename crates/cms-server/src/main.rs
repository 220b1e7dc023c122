mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use cms_api::blobs::ContentBlobs;
use cms_api::credentials::CredentialStore;
use cms_api::documents::DocumentStore;
use cms_api::routes;
use cms_api::state::{AppState, AppStateInner};
use cms_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms=debug,cms_api=debug,cms_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting with {:?}", config);

    let db = Arc::new(Database::open(&config.db_path)?);
    let blobs = ContentBlobs::new(config.docs_path.clone()).await?;

    let credentials = CredentialStore::new(db.clone());
    if let Some(admin) = &config.admin {
        if credentials.ensure_admin(&admin.handle, &admin.password).await? {
            info!("Created admin user {}", admin.handle);
        }
    }

    let state: AppState = Arc::new(AppStateInner {
        credentials,
        documents: DocumentStore::new(db, blobs),
    });

    let app = routes::router(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("cms listening on {}", addr);

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
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
