//! PostgreSQL implementation of the risk repository

use chrono::{DateTime, NaiveDate, Utc};
use shared::{FarmRisk, RiskScore, DEFAULT_HISTORY_MULTIPLIER};
use sqlx::PgPool;
use uuid::Uuid;

use super::RiskRepository;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgRiskRepository {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct FarmRiskRow {
    id: Uuid,
    risk: Option<i16>,
    history_multiplier: Option<f64>,
    updated_at: DateTime<Utc>,
}

impl From<FarmRiskRow> for FarmRisk {
    fn from(row: FarmRiskRow) -> Self {
        FarmRisk::new(
            row.id,
            row.risk
                .map(|r| RiskScore::from_f64(f64::from(r)))
                .unwrap_or_default(),
            row.history_multiplier.unwrap_or(DEFAULT_HISTORY_MULTIPLIER),
            row.updated_at,
        )
    }
}

impl PgRiskRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl RiskRepository for PgRiskRepository {
    async fn get_samples(&self, farm_id: Uuid) -> AppResult<Vec<f64>> {
        let samples = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT infestation_level::float8
            FROM animals
            WHERE farm_id = $1 AND last_analysis_at IS NOT NULL
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(samples)
    }

    async fn get_contamination_days(&self, farm_id: Uuid) -> AppResult<Vec<NaiveDate>> {
        let days = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT day
            FROM contamination_days
            WHERE farm_id = $1
            ORDER BY day DESC
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(days)
    }

    async fn get_risk(&self, farm_id: Uuid) -> AppResult<Option<FarmRisk>> {
        let row = sqlx::query_as::<_, FarmRiskRow>(
            r#"
            SELECT id, risk, history_multiplier, updated_at
            FROM farms
            WHERE id = $1
            "#,
        )
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(FarmRisk::from))
    }

    async fn put_score(&self, farm_id: Uuid, score: RiskScore) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE farms
            SET risk = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(farm_id)
        .bind(i16::from(score.value()))
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farm".to_string()));
        }
        Ok(())
    }

    async fn put_multiplier(&self, farm_id: Uuid, multiplier: f64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE farms
            SET history_multiplier = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(farm_id)
        .bind(multiplier)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farm".to_string()));
        }
        Ok(())
    }
}
