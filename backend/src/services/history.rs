//! Contamination history service
//!
//! Days on which contamination was observed on a farm. They feed the recency
//! multiplier, so every change to the marked days recomputes the farm score.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{
    is_distant_day, validate_contamination_day, BlendStrategy, ContaminationCalendar, DateRange,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repositories::{PgRiskRepository, RiskRepository};
use crate::services::farm::ensure_farm_exists;
use crate::services::risk::{RiskRecomputation, RiskService};

/// Contamination history service
#[derive(Clone)]
pub struct HistoryService {
    db: PgPool,
    blend: BlendStrategy,
}

/// Input for replacing the marked days
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceDaysInput {
    pub days: Vec<NaiveDate>,
}

/// New state of a toggled day
#[derive(Debug, Clone, Serialize)]
pub struct DayToggle {
    pub day: NaiveDate,
    pub marked: bool,
    pub is_distant: bool,
    pub farm_risk: RiskRecomputation,
}

/// Saved calendar together with the recomputed farm score
#[derive(Debug, Clone, Serialize)]
pub struct CalendarUpdate {
    #[serde(flatten)]
    pub calendar: ContaminationCalendar,
    pub farm_risk: RiskRecomputation,
}

/// Number of marked days in a period
#[derive(Debug, Clone, Serialize)]
pub struct PeriodCount {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: i64,
}

fn day_error(message: &'static str) -> AppError {
    AppError::invalid("day", message, "A data não pode estar no futuro")
}

/// Deduplicated days, most recent first
pub fn normalize_days(days: &[NaiveDate]) -> Vec<NaiveDate> {
    let unique: BTreeSet<NaiveDate> = days.iter().copied().collect();
    unique.into_iter().rev().collect()
}

impl HistoryService {
    pub fn new(db: PgPool, blend: BlendStrategy) -> Self {
        Self { db, blend }
    }

    async fn recompute_risk(&self, farm_id: Uuid, today: NaiveDate) -> AppResult<RiskRecomputation> {
        RiskService::new(PgRiskRepository::new(self.db.clone()), self.blend)
            .recompute(farm_id, today)
            .await
    }

    /// Marked days, most recent first
    pub async fn list_days(&self, farm_id: Uuid, today: NaiveDate) -> AppResult<ContaminationCalendar> {
        ensure_farm_exists(&self.db, farm_id).await?;
        let days = PgRiskRepository::new(self.db.clone())
            .get_contamination_days(farm_id)
            .await?;

        Ok(ContaminationCalendar {
            farm_id,
            has_distant_days: days.iter().any(|day| is_distant_day(*day, today)),
            days,
        })
    }

    /// Mark the day if unmarked, unmark it otherwise
    pub async fn toggle_day(&self, farm_id: Uuid, day: NaiveDate, today: NaiveDate) -> AppResult<DayToggle> {
        validate_contamination_day(day, today).map_err(day_error)?;
        ensure_farm_exists(&self.db, farm_id).await?;

        let removed = sqlx::query("DELETE FROM contamination_days WHERE farm_id = $1 AND day = $2")
            .bind(farm_id)
            .bind(day)
            .execute(&self.db)
            .await?
            .rows_affected();

        let marked = removed == 0;
        if marked {
            sqlx::query(
                r#"
                INSERT INTO contamination_days (farm_id, day)
                VALUES ($1, $2)
                ON CONFLICT (farm_id, day) DO NOTHING
                "#,
            )
            .bind(farm_id)
            .bind(day)
            .execute(&self.db)
            .await?;
        }

        tracing::debug!("Contamination day {} on farm {} marked={}", day, farm_id, marked);

        let farm_risk = self.recompute_risk(farm_id, today).await?;

        Ok(DayToggle {
            day,
            marked,
            is_distant: is_distant_day(day, today),
            farm_risk,
        })
    }

    /// Replace all marked days with the given set
    pub async fn replace_days(
        &self,
        farm_id: Uuid,
        days: &[NaiveDate],
        today: NaiveDate,
    ) -> AppResult<CalendarUpdate> {
        for day in days {
            validate_contamination_day(*day, today).map_err(day_error)?;
        }
        ensure_farm_exists(&self.db, farm_id).await?;

        let days = normalize_days(days);

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM contamination_days WHERE farm_id = $1")
            .bind(farm_id)
            .execute(&mut *tx)
            .await?;

        for day in &days {
            sqlx::query("INSERT INTO contamination_days (farm_id, day) VALUES ($1, $2)")
                .bind(farm_id)
                .bind(day)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("Saved {} contamination days for farm {}", days.len(), farm_id);

        let farm_risk = self.recompute_risk(farm_id, today).await?;

        Ok(CalendarUpdate {
            calendar: ContaminationCalendar {
                farm_id,
                has_distant_days: days.iter().any(|day| is_distant_day(*day, today)),
                days,
            },
            farm_risk,
        })
    }

    /// Count marked days within a period, both ends inclusive
    pub async fn count_in_period(&self, farm_id: Uuid, range: DateRange) -> AppResult<PeriodCount> {
        if range.start > range.end {
            return Err(AppError::invalid(
                "start",
                "Period start must not be after its end",
                "O início do período deve ser anterior ao fim",
            ));
        }
        ensure_farm_exists(&self.db, farm_id).await?;

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM contamination_days
            WHERE farm_id = $1 AND day BETWEEN $2 AND $3
            "#,
        )
        .bind(farm_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.db)
        .await?;

        Ok(PeriodCount {
            start: range.start,
            end: range.end,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_days_dedupes_and_sorts_descending() {
        let days = normalize_days(&[date(2024, 6, 1), date(2024, 6, 10), date(2024, 6, 1)]);
        assert_eq!(days, vec![date(2024, 6, 10), date(2024, 6, 1)]);
    }

    #[test]
    fn test_normalize_days_empty() {
        assert!(normalize_days(&[]).is_empty());
    }

    #[test]
    fn test_calendar_update_carries_recomputed_risk() {
        let farm_id = Uuid::new_v4();
        let update = CalendarUpdate {
            calendar: ContaminationCalendar {
                farm_id,
                days: vec![date(2024, 6, 15)],
                has_distant_days: false,
            },
            farm_risk: RiskRecomputation {
                farm_id,
                risk: shared::RiskScore::from_f64(52.0),
                classification: shared::RiskClassification::Medium,
                sample_count: 1,
                base_mean: 40.0,
                history_multiplier: 1.0,
                recency_multiplier: 1.3,
                applied_multiplier: 1.3,
                computed_at: chrono::Utc::now(),
            },
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["days"][0], "2024-06-15");
        assert_eq!(json["has_distant_days"], false);
        assert_eq!(json["farm_risk"]["risk"], 52);
    }
}
