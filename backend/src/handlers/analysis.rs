//! Infestation analysis HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::InfestationSample;
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::AnalysisEngine;
use crate::services::analysis::{AnalysisOutcome, AnalysisService, AnalyzeAnimalInput};
use crate::AppState;

fn analysis_service(state: &AppState) -> AnalysisService<AnalysisEngine> {
    AnalysisService::new(
        state.db.clone(),
        state.analysis.clone(),
        state.config.risk.blend_strategy(),
    )
}

/// Analyse an animal's photos and update the farm risk
pub async fn analyze_animal(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<AnalyzeAnimalInput>,
) -> AppResult<(StatusCode, Json<AnalysisOutcome>)> {
    let outcome = analysis_service(&state)
        .analyze_animal(farm_id, animal_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Analysis history of an animal
pub async fn list_analyses(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<InfestationSample>>> {
    let samples = analysis_service(&state)
        .list_samples(farm_id, animal_id)
        .await?;
    Ok(Json(samples))
}
