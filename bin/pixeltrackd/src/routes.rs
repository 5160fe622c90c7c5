//! Route registration — collects module routes + system endpoints.

use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Build the complete router with all routes.
pub fn build_router(module_routes: Vec<(String, Router)>) -> Router {
    // System endpoints.
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    // Module routes define their own absolute paths; merge them in.
    for (name, router) in module_routes {
        info!("Mounting routes for module {}", name);
        app = app.merge(router);
    }

    // The pixel is embedded on foreign pages, so cross-origin GET must work.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE]);

    app.layer(cors)
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "pixeltrackd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
