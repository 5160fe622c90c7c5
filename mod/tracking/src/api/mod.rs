pub mod pixel;
pub mod tracking;

use std::sync::Arc;

use axum::Router;

use crate::service::TrackingService;

/// Shared application state.
pub type AppState = Arc<TrackingService>;

/// Build the tracking API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(pixel::routes())
        .merge(tracking::routes())
        .with_state(state)
}
