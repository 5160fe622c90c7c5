pub mod pixel;
pub mod schema;

use pixeltrack_core::ServiceError;
use pixeltrack_sql::SqlStore;

/// Tracking service — owns the storage backend and the `tracking_pixels`
/// table.
pub struct TrackingService {
    pub(crate) sql: Box<dyn SqlStore>,
}

impl TrackingService {
    pub fn new(sql: Box<dyn SqlStore>) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql })
    }
}
