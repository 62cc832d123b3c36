use crate::catalog::{Catalog, SqliteCatalog};
use crate::config::Config;
use crate::storage::{BlobStore, FilesystemBlobStore};
use crate::streaming;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use vidstream_common::{Error, VideoId};
use vidstream_db::pool::{init_pool, DbPool};

mod error;
pub mod routes_videos;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Catalog database connection pool
    pub db_pool: DbPool,
    /// Lookup used by the streaming path
    pub catalog: Arc<dyn Catalog>,
    /// Storage for uploaded video bytes
    pub blobs: Arc<dyn BlobStore>,
}

impl AppContext {
    /// Build a context whose catalog reads from `db_pool`.
    pub fn new(config: Config, db_pool: DbPool, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(SqliteCatalog::new(db_pool.clone())),
            db_pool,
            blobs,
        }
    }

    /// Open the catalog database and upload directory named in `config`.
    pub async fn from_config(config: Config) -> Result<Self> {
        let db_path = config.storage.database_path.to_string_lossy().into_owned();
        let db_pool = init_pool(&db_path)
            .with_context(|| format!("Failed to open catalog database {:?}", db_path))?;

        let blobs = FilesystemBlobStore::new(config.storage.upload_dir.clone())
            .await
            .with_context(|| {
                format!(
                    "Failed to open upload directory {:?}",
                    config.storage.upload_dir
                )
            })?;
        tracing::info!("Storing uploads in {:?}", blobs.root());

        Ok(Self::new(config, db_pool, Arc::new(blobs)))
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
        ]);

    let api = routes_videos::video_routes(ctx.config.server.max_upload_bytes)
        .merge(streaming::stream_routes());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Identifiers that are not UUIDs cannot name a video, so they are reported
/// the same way as unknown ones.
pub(crate) fn parse_video_id(raw: &str) -> Result<VideoId, Error> {
    raw.parse()
        .map_err(|_| Error::not_found(format!("video {raw}")))
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(config).await?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
