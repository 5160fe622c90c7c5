pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use pixeltrack_core::Module;

use service::TrackingService;

/// Tracking module — pixel hit recording plus the tracking CRUD API.
pub struct TrackingModule {
    service: Arc<TrackingService>,
}

impl TrackingModule {
    pub fn new(service: TrackingService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for TrackingModule {
    fn name(&self) -> &str {
        "tracking"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
