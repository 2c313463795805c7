//! Contamination history HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use shared::{ContaminationCalendar, DateRange};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::history::{
    CalendarUpdate, DayToggle, HistoryService, PeriodCount, ReplaceDaysInput,
};
use crate::AppState;

fn history_service(state: &AppState) -> HistoryService {
    HistoryService::new(state.db.clone(), state.config.risk.blend_strategy())
}

/// Marked contamination days
pub async fn list_days(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<ContaminationCalendar>> {
    let service = history_service(&state);
    Ok(Json(service.list_days(farm_id, Utc::now().date_naive()).await?))
}

/// Replace the marked days and recompute the farm risk
pub async fn replace_days(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<ReplaceDaysInput>,
) -> AppResult<Json<CalendarUpdate>> {
    let service = history_service(&state);
    let calendar = service
        .replace_days(farm_id, &input.days, Utc::now().date_naive())
        .await?;
    Ok(Json(calendar))
}

/// Toggle one day and recompute the farm risk
pub async fn toggle_day(
    State(state): State<AppState>,
    Path((farm_id, day)): Path<(Uuid, NaiveDate)>,
) -> AppResult<Json<DayToggle>> {
    let service = history_service(&state);
    let toggle = service
        .toggle_day(farm_id, day, Utc::now().date_naive())
        .await?;
    Ok(Json(toggle))
}

/// Count marked days between `start` and `end`
pub async fn count_days(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Query(range): Query<DateRange>,
) -> AppResult<Json<PeriodCount>> {
    let service = history_service(&state);
    Ok(Json(service.count_in_period(farm_id, range).await?))
}
