use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use pixeltrack_core::{ListParams, ListResult, ServiceError};

use crate::model::{CreatePixel, TrackingPixel};
use crate::service::pixel::PixelFilters;
use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tracking", get(list_pixels).post(create_pixel))
        .route("/tracking/by-ip", get(list_by_ip))
        .route("/tracking/by-user-agent", get(list_by_user_agent))
        .route("/tracking/by-referer", get(list_by_referer))
        .route("/tracking/{id}", get(get_pixel).put(update_pixel).delete(delete_pixel))
}

async fn list_pixels(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<TrackingPixel>>, ServiceError> {
    Ok(Json(svc.list_pixels(&params, &PixelFilters::default())?))
}

#[derive(Debug, Deserialize)]
struct IpQuery {
    ip: String,
}

async fn list_by_ip(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
    Query(query): Query<IpQuery>,
) -> Result<Json<ListResult<TrackingPixel>>, ServiceError> {
    let filters = PixelFilters {
        ip: Some(query.ip),
        ..Default::default()
    };
    Ok(Json(svc.list_pixels(&params, &filters)?))
}

#[derive(Debug, Deserialize)]
struct UserAgentQuery {
    #[serde(rename = "user-agent")]
    user_agent: String,
}

async fn list_by_user_agent(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
    Query(query): Query<UserAgentQuery>,
) -> Result<Json<ListResult<TrackingPixel>>, ServiceError> {
    let filters = PixelFilters {
        user_agent: Some(query.user_agent),
        ..Default::default()
    };
    Ok(Json(svc.list_pixels(&params, &filters)?))
}

#[derive(Debug, Deserialize)]
struct RefererQuery {
    referer: String,
}

async fn list_by_referer(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
    Query(query): Query<RefererQuery>,
) -> Result<Json<ListResult<TrackingPixel>>, ServiceError> {
    let filters = PixelFilters {
        referer: Some(query.referer),
        ..Default::default()
    };
    Ok(Json(svc.list_pixels(&params, &filters)?))
}

async fn get_pixel(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrackingPixel>, ServiceError> {
    Ok(Json(svc.get_pixel(&id)?))
}

async fn create_pixel(
    State(svc): State<AppState>,
    Json(input): Json<CreatePixel>,
) -> Result<(StatusCode, Json<TrackingPixel>), ServiceError> {
    let pixel = svc.create_pixel(input)?;
    Ok((StatusCode::CREATED, Json(pixel)))
}

async fn update_pixel(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<TrackingPixel>, ServiceError> {
    Ok(Json(svc.update_pixel(&id, patch)?))
}

async fn delete_pixel(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_pixel(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
