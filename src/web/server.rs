//! HTTP server implementation

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::handlers::{
    get_empty_key_handler, get_handler, put_handler, shard_stats_handler, stats_handler, SharedBackend,
};
use crate::store::Store;

/// add/get routes bound to one backend
fn kv_routes(backend: SharedBackend) -> Router {
    Router::new()
        .route("/add", post(put_handler))
        .route("/get/", get(get_empty_key_handler))
        .route("/get/*key", get(get_handler))
        .with_state(backend)
}

/// Build the application router
///
/// The local store serves `/add` and `/get/*key`. When a comparison backend
/// is given, the same routes are also mounted under `/redis`.
pub fn router(store: Arc<Store>, comparison: Option<SharedBackend>) -> Router {
    let local: SharedBackend = store.clone();

    let stats = Router::new()
        .route("/stats", get(stats_handler))
        .route("/shards", get(shard_stats_handler))
        .with_state(store);

    let mut app = kv_routes(local).merge(stats);

    if let Some(backend) = comparison {
        info!("Mounting {} backend under /redis", backend.name());
        app = app.nest("/redis", kv_routes(backend));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the web server until `shutdown` is cancelled
pub async fn run_web_server(
    addr: SocketAddr,
    store: Arc<Store>,
    comparison: Option<SharedBackend>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = router(store, comparison);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("HTTP interface available at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}
