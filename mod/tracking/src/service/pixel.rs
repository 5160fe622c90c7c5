use pixeltrack_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, now_rfc3339};
use pixeltrack_sql::Value;

use crate::model::{CreatePixel, TrackingPixel};
use super::TrackingService;

/// Optional equality filters for list/count queries.
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct PixelFilters {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl PixelFilters {
    /// Render the WHERE clause and its bound parameters.
    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        let columns = [
            ("ip", &self.ip),
            ("user_agent", &self.user_agent),
            ("referer", &self.referer),
        ];
        for (col, val) in columns {
            if let Some(v) = val {
                if !v.is_empty() {
                    clauses.push(format!("{} = ?{}", col, params.len() + 1));
                    params.push(Value::Text(v.clone()));
                }
            }
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (where_sql, params)
    }
}

impl TrackingService {
    /// Record a new tracking pixel hit.
    pub fn create_pixel(&self, input: CreatePixel) -> Result<TrackingPixel, ServiceError> {
        let now = now_rfc3339();
        let record = TrackingPixel {
            id: new_id(),
            ip: input.ip,
            user_agent: input.user_agent,
            referer: input.referer,
            created_at: now.clone(),
            updated_at: now,
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO tracking_pixels
                 (id, data, ip, user_agent, referer, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                &[
                    Value::Text(record.id.clone()),
                    Value::Text(json),
                    Value::opt_text(record.ip.as_deref()),
                    Value::opt_text(record.user_agent.as_deref()),
                    Value::opt_text(record.referer.as_deref()),
                    Value::Text(record.created_at.clone()),
                    Value::Text(record.updated_at.clone()),
                ],
            )
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint") {
                    ServiceError::Conflict(msg)
                } else {
                    ServiceError::Storage(msg)
                }
            })?;

        Ok(record)
    }

    /// Convenience for the pixel endpoint.
    pub fn record_hit(
        &self,
        ip: Option<String>,
        user_agent: Option<String>,
        referer: Option<String>,
    ) -> Result<TrackingPixel, ServiceError> {
        self.create_pixel(CreatePixel { ip, user_agent, referer })
    }

    /// Get a tracking pixel by id.
    pub fn get_pixel(&self, id: &str) -> Result<TrackingPixel, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM tracking_pixels WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows.first()
            .ok_or_else(|| ServiceError::NotFound(format!("tracking_pixels/{}", id)))?;
        let data = row.get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// List tracking pixels, newest first, with optional filters and a
    /// total count for page metadata.
    pub fn list_pixels(
        &self,
        params: &ListParams,
        filters: &PixelFilters,
    ) -> Result<ListResult<TrackingPixel>, ServiceError> {
        let limit = params.limit.min(500);
        let (where_sql, mut sql_params) = filters.to_sql();

        let total = {
            let count_sql = format!(
                "SELECT COUNT(*) as cnt FROM tracking_pixels{}",
                where_sql,
            );
            let rows = self.sql
                .query(&count_sql, &sql_params)
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
            rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize
        };

        let limit_idx = sql_params.len() + 1;
        let offset_idx = sql_params.len() + 2;
        sql_params.push(Value::Integer(limit as i64));
        sql_params.push(Value::Integer(params.offset as i64));

        let sql = format!(
            "SELECT data FROM tracking_pixels{} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            where_sql, limit_idx, offset_idx,
        );

        let rows = self.sql
            .query(&sql, &sql_params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row.get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let item: TrackingPixel = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok(ListResult { items, total })
    }

    /// Count tracking pixels matching the filters.
    pub fn count_pixels(&self, filters: &PixelFilters) -> Result<i64, ServiceError> {
        let (where_sql, sql_params) = filters.to_sql();
        let sql = format!("SELECT COUNT(*) as cnt FROM tracking_pixels{}", where_sql);
        let rows = self.sql
            .query(&sql, &sql_params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }

    /// Update a tracking pixel with JSON merge-patch semantics.
    ///
    /// `id` and `createdAt` cannot be overwritten; `updatedAt` is always
    /// re-stamped.
    pub fn update_pixel(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<TrackingPixel, ServiceError> {
        let current = self.get_pixel(id)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut patch = patch;
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
            obj.remove("createdAt");
            obj.remove("updatedAt");
        }
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["createdAt"] = serde_json::json!(current.created_at);
        base["updatedAt"] = serde_json::json!(now);

        let updated: TrackingPixel = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let json = serde_json::to_string(&updated)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let affected = self.sql
            .exec(
                "UPDATE tracking_pixels
                 SET data = ?1, ip = ?2, user_agent = ?3, referer = ?4, updated_at = ?5
                 WHERE id = ?6",
                &[
                    Value::Text(json),
                    Value::opt_text(updated.ip.as_deref()),
                    Value::opt_text(updated.user_agent.as_deref()),
                    Value::opt_text(updated.referer.as_deref()),
                    Value::Text(updated.updated_at.clone()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("tracking_pixels/{}", id)));
        }

        Ok(updated)
    }

    /// Delete a tracking pixel by id.
    pub fn delete_pixel(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self.sql
            .exec(
                "DELETE FROM tracking_pixels WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("tracking_pixels/{}", id)));
        }
        Ok(())
    }
}
