//! Animal HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::{Animal, AnimalPhoto, Shift};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::animal::{AddPhotoInput, AnimalService, CreateAnimalInput};
use crate::AppState;

/// List the animals of a farm
pub async fn list_animals(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<Vec<Animal>>> {
    let service = AnimalService::new(state.db);
    Ok(Json(service.list_animals(farm_id).await?))
}

/// Register an animal
pub async fn create_animal(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<CreateAnimalInput>,
) -> AppResult<(StatusCode, Json<Animal>)> {
    let service = AnimalService::new(state.db);
    let animal = service.create_animal(farm_id, input).await?;
    Ok((StatusCode::CREATED, Json(animal)))
}

/// Get an animal
pub async fn get_animal(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Animal>> {
    let service = AnimalService::new(state.db);
    Ok(Json(service.get_animal(farm_id, animal_id).await?))
}

/// Record an uploaded photo
pub async fn add_photo(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<AddPhotoInput>,
) -> AppResult<(StatusCode, Json<AnimalPhoto>)> {
    let service = AnimalService::new(state.db);
    let photo = service.add_photo(farm_id, animal_id, input).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    pub shift: Option<Shift>,
    pub date: Option<NaiveDate>,
}

/// List the photos of an animal
pub async fn list_photos(
    State(state): State<AppState>,
    Path((farm_id, animal_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<PhotoQuery>,
) -> AppResult<Json<Vec<AnimalPhoto>>> {
    let service = AnimalService::new(state.db);
    service.get_animal(farm_id, animal_id).await?;
    let photos = service
        .list_photos(animal_id, query.shift, query.date)
        .await?;
    Ok(Json(photos))
}
