//! Farm HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Farm, GpsCoordinates, NearbyFarm};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::farm::{CreateFarmInput, FarmService, DEFAULT_NEARBY_RADIUS_KM};
use crate::AppState;

/// List all farms
pub async fn list_farms(State(state): State<AppState>) -> AppResult<Json<Vec<Farm>>> {
    let service = FarmService::new(state.db);
    Ok(Json(service.list_farms().await?))
}

/// Create a farm
pub async fn create_farm(
    State(state): State<AppState>,
    Json(input): Json<CreateFarmInput>,
) -> AppResult<(StatusCode, Json<Farm>)> {
    let service = FarmService::new(state.db);
    let farm = service.create_farm(input).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

/// Get a farm
pub async fn get_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<Farm>> {
    let service = FarmService::new(state.db);
    Ok(Json(service.get_farm(farm_id).await?))
}

/// Farm opened by the mobile app on first launch
pub async fn get_default_farm(State(state): State<AppState>) -> AppResult<Json<Farm>> {
    let service = FarmService::new(state.db);
    Ok(Json(service.ensure_default_farm().await?))
}

/// Query parameters for the neighbouring-farms map
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub radius_km: Option<f64>,
    /// Farm to leave out, usually the caller's own
    pub exclude: Option<Uuid>,
}

/// Farms near a point, nearest first
pub async fn nearby_farms(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> AppResult<Json<Vec<NearbyFarm>>> {
    let service = FarmService::new(state.db);
    let farms = service
        .nearby_farms(
            GpsCoordinates::new(query.latitude, query.longitude),
            query.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM),
            query.exclude,
        )
        .await?;
    Ok(Json(farms))
}
