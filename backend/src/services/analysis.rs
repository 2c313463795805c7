//! Infestation analysis service
//!
//! Runs the configured [`AnalysisProvider`] over an animal's photos, appends
//! the sample, updates the animal and recomputes the farm score.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{BlendStrategy, InfestationSample, Shift, TickCounts};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{AnalysisProvider, AnalysisRequest};
use crate::repositories::PgRiskRepository;
use crate::services::animal::AnimalService;
use crate::services::risk::{RiskRecomputation, RiskService};

/// Analysis service
pub struct AnalysisService<P> {
    db: PgPool,
    provider: Arc<P>,
    blend: BlendStrategy,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SampleRow {
    id: Uuid,
    farm_id: Uuid,
    animal_id: Uuid,
    level: i32,
    larvae: i32,
    nymphs: i32,
    adults: i32,
    shift: String,
    sample_date: NaiveDate,
    provider: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<SampleRow> for InfestationSample {
    type Error = AppError;

    fn try_from(row: SampleRow) -> Result<Self, Self::Error> {
        let shift = Shift::parse(&row.shift)
            .ok_or_else(|| AppError::Internal(format!("Unknown shift {}", row.shift)))?;

        Ok(InfestationSample {
            id: row.id,
            farm_id: row.farm_id,
            animal_id: row.animal_id,
            level: row.level,
            counts: TickCounts {
                larvae: row.larvae,
                nymphs: row.nymphs,
                adults: row.adults,
            },
            shift,
            sample_date: row.sample_date,
            provider: row.provider,
            recorded_at: row.recorded_at,
        })
    }
}

/// Input for analysing an animal
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeAnimalInput {
    pub shift: Shift,
    /// Defaults to today
    pub sample_date: Option<NaiveDate>,
    /// Photos to analyse; when absent the stored photos for the shift are used
    pub image_urls: Option<Vec<String>>,
}

/// Recorded sample together with the recomputed farm score
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub sample: InfestationSample,
    pub farm_risk: RiskRecomputation,
}

const SAMPLE_COLUMNS: &str = "id, farm_id, animal_id, level, larvae, nymphs, adults, shift, \
     sample_date, provider, recorded_at";

/// Whether a sample taken on `sample_date` becomes the animal's current level
pub fn supersedes_latest(sample_date: NaiveDate, latest: Option<NaiveDate>) -> bool {
    latest.map_or(true, |latest| sample_date >= latest)
}

impl<P: AnalysisProvider> AnalysisService<P> {
    pub fn new(db: PgPool, provider: Arc<P>, blend: BlendStrategy) -> Self {
        Self {
            db,
            provider,
            blend,
        }
    }

    /// Analyse one animal and fold the result into the farm score
    pub async fn analyze_animal(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
        input: AnalyzeAnimalInput,
    ) -> AppResult<AnalysisOutcome> {
        let animals = AnimalService::new(self.db.clone());
        animals.get_animal(farm_id, animal_id).await?;

        let now = Utc::now();
        let sample_date = input.sample_date.unwrap_or_else(|| now.date_naive());

        let image_urls = match input.image_urls {
            Some(urls) => urls,
            None => animals
                .list_photos(animal_id, Some(input.shift), Some(sample_date))
                .await?
                .into_iter()
                .map(|photo| photo.url)
                .collect(),
        };

        if image_urls.is_empty() {
            return Err(AppError::invalid(
                "image_urls",
                "At least one photo is required for analysis",
                "Envie pelo menos uma foto para análise",
            ));
        }

        let request = AnalysisRequest {
            farm_id,
            animal_id,
            shift: input.shift,
            image_urls,
        };
        let counts = self.provider.analyze(&request).await?;
        let level = counts.infestation_level();

        let mut tx = self.db.begin().await?;

        let latest = sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT MAX(sample_date) FROM infestation_samples WHERE animal_id = $1",
        )
        .bind(animal_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, SampleRow>(&format!(
            r#"
            INSERT INTO infestation_samples
                (farm_id, animal_id, level, larvae, nymphs, adults, shift, sample_date, provider)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            SAMPLE_COLUMNS
        ))
        .bind(farm_id)
        .bind(animal_id)
        .bind(level)
        .bind(counts.larvae)
        .bind(counts.nymphs)
        .bind(counts.adults)
        .bind(input.shift.as_str())
        .bind(sample_date)
        .bind(self.provider.name())
        .fetch_one(&mut *tx)
        .await?;

        if supersedes_latest(sample_date, latest) {
            sqlx::query(
                r#"
                UPDATE animals
                SET infestation_level = $1, last_analysis_at = $2, updated_at = NOW()
                WHERE id = $3
                "#,
            )
            .bind(level)
            .bind(row.recorded_at)
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
        } else {
            tracing::debug!(
                "Sample for animal {} dated {} is older than {:?}, current level kept",
                animal_id,
                sample_date,
                latest
            );
        }

        tx.commit().await?;

        tracing::info!(
            "Animal {} analysed by {}: {} ticks, level {}",
            animal_id,
            self.provider.name(),
            counts.total(),
            level
        );

        let farm_risk = RiskService::new(PgRiskRepository::new(self.db.clone()), self.blend)
            .recompute(farm_id, now.date_naive())
            .await?;

        Ok(AnalysisOutcome {
            sample: row.try_into()?,
            farm_risk,
        })
    }

    /// Samples recorded for an animal, most recent first
    pub async fn list_samples(&self, farm_id: Uuid, animal_id: Uuid) -> AppResult<Vec<InfestationSample>> {
        let rows = sqlx::query_as::<_, SampleRow>(&format!(
            r#"
            SELECT {} FROM infestation_samples
            WHERE farm_id = $1 AND animal_id = $2
            ORDER BY recorded_at DESC
            "#,
            SAMPLE_COLUMNS
        ))
        .bind(farm_id)
        .bind(animal_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(InfestationSample::try_from).collect()
    }
}
