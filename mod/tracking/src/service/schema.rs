use pixeltrack_core::ServiceError;
use pixeltrack_sql::SqlStore;

/// SQL DDL statements to initialize the tracking database schema.
///
/// The table stores the full JSON document in a `data` TEXT column, with
/// indexed columns extracted for efficient filtering.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tracking_pixels (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        ip TEXT,
        user_agent TEXT,
        referer TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_px_ip ON tracking_pixels(ip)",
    "CREATE INDEX IF NOT EXISTS idx_px_user_agent ON tracking_pixels(user_agent)",
    "CREATE INDEX IF NOT EXISTS idx_px_referer ON tracking_pixels(referer)",
    "CREATE INDEX IF NOT EXISTS idx_px_created_at ON tracking_pixels(created_at)",
];

pub fn init_schema(sql: &dyn SqlStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
