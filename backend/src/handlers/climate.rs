//! Climate HTTP handlers

use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::ClimateRisk;

use crate::error::AppResult;
use crate::services::climate::{AssessClimateInput, ClimateReport, ClimateService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

/// Current climate at a location
pub async fn current_climate(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<ClimateReport>> {
    let service = ClimateService::new(state.climate);
    Ok(Json(service.current(query.latitude, query.longitude).await?))
}

/// Assess manually entered conditions
pub async fn assess_climate(Json(input): Json<AssessClimateInput>) -> AppResult<Json<ClimateRisk>> {
    Ok(Json(ClimateService::assess(&input)?))
}
