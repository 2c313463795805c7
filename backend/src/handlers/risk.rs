//! Farm risk HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::FarmRisk;
use uuid::Uuid;

use crate::error::AppResult;
use crate::repositories::PgRiskRepository;
use crate::services::risk::{ClimateAdjustedRisk, RiskImport, RiskRecomputation, RiskService};
use crate::services::{ClimateService, FarmService};
use crate::AppState;

fn risk_service(state: &AppState) -> RiskService<PgRiskRepository> {
    RiskService::new(
        PgRiskRepository::new(state.db.clone()),
        state.config.risk.blend_strategy(),
    )
}

/// Stored risk of a farm
pub async fn get_risk(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<FarmRisk>> {
    Ok(Json(risk_service(&state).current(farm_id).await?))
}

/// Recompute the farm risk from its analysed animals
pub async fn recompute_risk(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<RiskRecomputation>> {
    let result = risk_service(&state)
        .recompute(farm_id, Utc::now().date_naive())
        .await?;
    Ok(Json(result))
}

/// Infestation values picked on the history calendar
#[derive(Debug, Deserialize)]
pub struct HistorySelectionInput {
    pub values: Vec<f64>,
}

/// Apply a history selection and recompute
pub async fn apply_history_selection(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<HistorySelectionInput>,
) -> AppResult<Json<RiskRecomputation>> {
    let result = risk_service(&state)
        .apply_history_selection(farm_id, &input.values, Utc::now().date_naive())
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ImportRiskInput {
    pub source_farm_id: Uuid,
}

/// Blend a neighbouring farm's risk into this farm
pub async fn import_risk(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<ImportRiskInput>,
) -> AppResult<Json<RiskImport>> {
    let result = risk_service(&state)
        .import_from(farm_id, input.source_farm_id)
        .await?;
    Ok(Json(result))
}

/// Farm risk under the climate currently observed at the farm
pub async fn climate_adjusted_risk(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<ClimateAdjustedRisk>> {
    let farm = FarmService::new(state.db.clone()).get_farm(farm_id).await?;
    let reading = ClimateService::new(state.climate.clone())
        .current_reading(farm.coordinates.latitude, farm.coordinates.longitude)
        .await?;

    let result = risk_service(&state)
        .climate_adjusted(farm_id, reading)
        .await?;
    Ok(Json(result))
}
