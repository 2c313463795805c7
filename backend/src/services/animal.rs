//! Animal service for the per-farm herd and animal photos

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    photo_storage_path, validate_ear_tag, validate_photo_slot, Animal, AnimalPhoto,
    PhotoPosition, Shift,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::farm::{ensure_farm_exists, FarmService};

/// Animal service for managing the herd
#[derive(Clone)]
pub struct AnimalService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct AnimalRow {
    id: Uuid,
    farm_id: Uuid,
    ear_tag: String,
    name: Option<String>,
    infestation_level: i32,
    last_analysis_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnimalRow> for Animal {
    fn from(row: AnimalRow) -> Self {
        Animal {
            id: row.id,
            farm_id: row.farm_id,
            ear_tag: row.ear_tag,
            name: row.name,
            infestation_level: row.infestation_level,
            last_analysis_at: row.last_analysis_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PhotoRow {
    id: Uuid,
    animal_id: Uuid,
    position: String,
    shift: String,
    taken_on: NaiveDate,
    url: String,
    storage_path: String,
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<PhotoRow> for AnimalPhoto {
    type Error = AppError;

    fn try_from(row: PhotoRow) -> Result<Self, Self::Error> {
        let position = PhotoPosition::parse(&row.position)
            .ok_or_else(|| AppError::Internal(format!("Unknown photo position {}", row.position)))?;
        let shift = Shift::parse(&row.shift)
            .ok_or_else(|| AppError::Internal(format!("Unknown shift {}", row.shift)))?;

        Ok(AnimalPhoto {
            id: row.id,
            animal_id: row.animal_id,
            position,
            shift,
            taken_on: row.taken_on,
            url: row.url,
            storage_path: row.storage_path,
            uploaded_at: row.uploaded_at,
        })
    }
}

/// Input for registering an animal
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnimalInput {
    #[validate(length(min = 1, max = 32))]
    pub ear_tag: String,
    #[validate(length(max = 80))]
    pub name: Option<String>,
}

/// Input for recording an uploaded photo
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddPhotoInput {
    pub position: PhotoPosition,
    pub shift: Shift,
    /// Defaults to today
    pub taken_on: Option<NaiveDate>,
    #[validate(url)]
    pub url: String,
}

const ANIMAL_COLUMNS: &str =
    "id, farm_id, ear_tag, name, infestation_level, last_analysis_at, created_at, updated_at";

const PHOTO_COLUMNS: &str = "id, animal_id, position, shift, taken_on, url, storage_path, uploaded_at";

impl AnimalService {
    /// Create a new AnimalService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register an animal on a farm
    pub async fn create_animal(&self, farm_id: Uuid, input: CreateAnimalInput) -> AppResult<Animal> {
        input.validate()?;
        let ear_tag = input.ear_tag.trim().to_string();
        validate_ear_tag(&ear_tag)
            .map_err(|e| AppError::invalid("ear_tag", e, "Brinco inválido"))?;

        ensure_farm_exists(&self.db, farm_id).await?;

        let row = sqlx::query_as::<_, AnimalRow>(&format!(
            r#"
            INSERT INTO animals (farm_id, ear_tag, name)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            ANIMAL_COLUMNS
        ))
        .bind(farm_id)
        .bind(&ear_tag)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEntry("ear tag".to_string())
            }
            other => AppError::DatabaseError(other),
        })?;

        FarmService::new(self.db.clone())
            .refresh_animal_count(farm_id)
            .await?;

        tracing::info!("Registered animal {} on farm {}", ear_tag, farm_id);
        Ok(row.into())
    }

    /// Animals on a farm ordered by ear tag
    pub async fn list_animals(&self, farm_id: Uuid) -> AppResult<Vec<Animal>> {
        ensure_farm_exists(&self.db, farm_id).await?;

        let rows = sqlx::query_as::<_, AnimalRow>(&format!(
            "SELECT {} FROM animals WHERE farm_id = $1 ORDER BY ear_tag ASC",
            ANIMAL_COLUMNS
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Animal::from).collect())
    }

    /// Get an animal by ID, scoped to its farm
    pub async fn get_animal(&self, farm_id: Uuid, animal_id: Uuid) -> AppResult<Animal> {
        let row = sqlx::query_as::<_, AnimalRow>(&format!(
            "SELECT {} FROM animals WHERE id = $1 AND farm_id = $2",
            ANIMAL_COLUMNS
        ))
        .bind(animal_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Animal".to_string()))?;

        Ok(row.into())
    }

    /// Record a photo, at most three per animal per shift per day
    pub async fn add_photo(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
        input: AddPhotoInput,
    ) -> AppResult<AnimalPhoto> {
        input.validate()?;
        self.get_animal(farm_id, animal_id).await?;

        let now = Utc::now();
        let taken_on = input.taken_on.unwrap_or_else(|| now.date_naive());

        let existing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM animal_photos
            WHERE animal_id = $1 AND shift = $2 AND taken_on = $3
            "#,
        )
        .bind(animal_id)
        .bind(input.shift.as_str())
        .bind(taken_on)
        .fetch_one(&self.db)
        .await?;

        validate_photo_slot(existing.max(0) as usize)
            .map_err(|e| AppError::PhotoLimitReached(e.to_string()))?;

        let storage_path =
            photo_storage_path(farm_id, animal_id, input.position, now.timestamp_millis());

        let row = sqlx::query_as::<_, PhotoRow>(&format!(
            r#"
            INSERT INTO animal_photos (animal_id, position, shift, taken_on, url, storage_path)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PHOTO_COLUMNS
        ))
        .bind(animal_id)
        .bind(input.position.as_str())
        .bind(input.shift.as_str())
        .bind(taken_on)
        .bind(&input.url)
        .bind(&storage_path)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!("Stored photo {} for animal {}", storage_path, animal_id);
        row.try_into()
    }

    /// Photos of an animal, optionally limited to one shift on one day
    pub async fn list_photos(
        &self,
        animal_id: Uuid,
        shift: Option<Shift>,
        taken_on: Option<NaiveDate>,
    ) -> AppResult<Vec<AnimalPhoto>> {
        let rows = sqlx::query_as::<_, PhotoRow>(&format!(
            r#"
            SELECT {} FROM animal_photos
            WHERE animal_id = $1
              AND ($2::text IS NULL OR shift = $2)
              AND ($3::date IS NULL OR taken_on = $3)
            ORDER BY uploaded_at DESC
            "#,
            PHOTO_COLUMNS
        ))
        .bind(animal_id)
        .bind(shift.map(|s| s.as_str()))
        .bind(taken_on)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(AnimalPhoto::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_row(position: &str, shift: &str) -> PhotoRow {
        PhotoRow {
            id: Uuid::new_v4(),
            animal_id: Uuid::new_v4(),
            position: position.to_string(),
            shift: shift.to_string(),
            taken_on: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            url: "https://storage.example/p.jpg".to_string(),
            storage_path: "farms/f/animals/a/a_left_1.jpg".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_photo_row_conversion() {
        let photo = AnimalPhoto::try_from(photo_row("between_legs", "afternoon")).unwrap();
        assert_eq!(photo.position, PhotoPosition::BetweenLegs);
        assert_eq!(photo.shift, Shift::Afternoon);
    }

    #[test]
    fn test_photo_row_with_unknown_position() {
        let result = AnimalPhoto::try_from(photo_row("front", "morning"));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_add_photo_input_parsing() {
        let input: AddPhotoInput = serde_json::from_str(
            r#"{"position": "right", "shift": "morning", "url": "https://storage.example/r.jpg"}"#,
        )
        .unwrap();
        assert_eq!(input.position, PhotoPosition::Right);
        assert!(input.taken_on.is_none());
        assert!(input.validate().is_ok());
    }
}
