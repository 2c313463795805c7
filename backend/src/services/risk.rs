//! Farm risk service
//!
//! Feeds stored samples, history and contamination days into the scoring
//! functions in `shared::risk` and writes the results back through a
//! [`RiskRepository`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use shared::{
    aggregate_risk, apply_multiplier, history_multiplier, import_risk, mean_percent,
    recency_multiplier, validate_history_selection, validate_percentage, BlendStrategy,
    ClimateReading, ClimateRisk, FarmRisk, RiskClassification, RiskScore,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repositories::RiskRepository;

/// Outcome of recomputing a farm score from its samples
#[derive(Debug, Clone, Serialize)]
pub struct RiskRecomputation {
    pub farm_id: Uuid,
    pub risk: RiskScore,
    pub classification: RiskClassification,
    pub sample_count: usize,
    /// Mean infestation before any multiplier
    pub base_mean: f64,
    pub history_multiplier: f64,
    pub recency_multiplier: f64,
    /// Larger of the history and recency multipliers
    pub applied_multiplier: f64,
    pub computed_at: DateTime<Utc>,
}

/// Outcome of blending a neighbour's score into a farm
#[derive(Debug, Clone, Serialize)]
pub struct RiskImport {
    pub farm_id: Uuid,
    pub source_farm_id: Uuid,
    pub previous: RiskScore,
    pub incoming: RiskScore,
    pub risk: RiskScore,
    pub classification: RiskClassification,
    pub strategy: BlendStrategy,
}

/// Farm score adjusted for current climate, never persisted
#[derive(Debug, Clone, Serialize)]
pub struct ClimateAdjustedRisk {
    pub farm_id: Uuid,
    pub base_risk: RiskScore,
    pub adjusted_risk: RiskScore,
    pub classification: RiskClassification,
    pub climate: ClimateRisk,
    pub reading: ClimateReading,
}

/// Risk scoring over any [`RiskRepository`]
pub struct RiskService<R> {
    repository: R,
    blend: BlendStrategy,
}

impl<R: RiskRepository> RiskService<R> {
    pub fn new(repository: R, blend: BlendStrategy) -> Self {
        Self { repository, blend }
    }

    /// Stored risk snapshot
    pub async fn current(&self, farm_id: Uuid) -> AppResult<FarmRisk> {
        self.repository
            .get_risk(farm_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Farm".to_string()))
    }

    /// Recompute the farm score from its analysed animals and persist it
    pub async fn recompute(&self, farm_id: Uuid, today: NaiveDate) -> AppResult<RiskRecomputation> {
        let stored = self.current(farm_id).await?;
        let samples = self.repository.get_samples(farm_id).await?;
        let days = self.repository.get_contamination_days(farm_id).await?;

        let recency = recency_multiplier(&days, today);
        let applied = stored.history_multiplier.max(recency);
        let risk = aggregate_risk(&samples, applied);

        self.repository.put_score(farm_id, risk).await?;

        tracing::info!(
            "Recomputed risk for farm {}: {} from {} samples (x{:.2})",
            farm_id,
            risk,
            samples.len(),
            applied
        );

        Ok(RiskRecomputation {
            farm_id,
            risk,
            classification: risk.classification(),
            sample_count: samples.len(),
            base_mean: mean_percent(&samples),
            history_multiplier: stored.history_multiplier,
            recency_multiplier: recency,
            applied_multiplier: applied,
            computed_at: Utc::now(),
        })
    }

    /// Derive the history multiplier from up to three past infestation
    /// values, store it and recompute the score
    pub async fn apply_history_selection(
        &self,
        farm_id: Uuid,
        values: &[f64],
        today: NaiveDate,
    ) -> AppResult<RiskRecomputation> {
        validate_history_selection(values.len()).map_err(|e| {
            AppError::invalid("values", e, "Selecione no máximo 3 históricos")
        })?;
        for value in values {
            validate_percentage(*value).map_err(|e| {
                AppError::invalid("values", e, "Valor deve estar entre 0 e 100")
            })?;
        }

        self.current(farm_id).await?;

        let multiplier = history_multiplier(values);
        self.repository.put_multiplier(farm_id, multiplier).await?;
        tracing::debug!(
            "History multiplier for farm {} set to {:.1} from {} values",
            farm_id,
            multiplier,
            values.len()
        );

        self.recompute(farm_id, today).await
    }

    /// Blend a neighbouring farm's score into this farm's score
    pub async fn import_from(&self, farm_id: Uuid, source_farm_id: Uuid) -> AppResult<RiskImport> {
        if farm_id == source_farm_id {
            return Err(AppError::invalid(
                "source_farm_id",
                "A farm cannot import its own risk",
                "Uma fazenda não pode importar o próprio risco",
            ));
        }

        let current = self.current(farm_id).await?;
        let source = self.current(source_farm_id).await?;

        let risk = import_risk(current.risk.as_f64(), source.risk.as_f64(), self.blend);
        self.repository.put_score(farm_id, risk).await?;

        tracing::info!(
            "Imported risk {} from farm {} into farm {}: {} -> {}",
            source.risk,
            source_farm_id,
            farm_id,
            current.risk,
            risk
        );

        Ok(RiskImport {
            farm_id,
            source_farm_id,
            previous: current.risk,
            incoming: source.risk,
            risk,
            classification: risk.classification(),
            strategy: self.blend,
        })
    }

    /// Stored score scaled by the climate multiplier of a reading
    pub async fn climate_adjusted(
        &self,
        farm_id: Uuid,
        reading: ClimateReading,
    ) -> AppResult<ClimateAdjustedRisk> {
        let current = self.current(farm_id).await?;
        let climate = reading.risk();
        let adjusted = apply_multiplier(current.risk.as_f64(), climate.multiplier);

        Ok(ClimateAdjustedRisk {
            farm_id,
            base_risk: current.risk,
            adjusted_risk: adjusted,
            classification: adjusted.classification(),
            climate,
            reading,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRiskRepository;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn service_with_farm() -> (RiskService<InMemoryRiskRepository>, Uuid) {
        let repository = InMemoryRiskRepository::new();
        let farm_id = Uuid::new_v4();
        repository.add_farm(farm_id);
        (RiskService::new(repository, BlendStrategy::Mean), farm_id)
    }

    fn reading(temperature_c: f64, humidity_pct: f64) -> ClimateReading {
        ClimateReading {
            temperature_c,
            humidity_pct,
            condition: "Clouds".to_string(),
            wind_kmh: 10.0,
            rain_1h_mm: None,
            recorded_at: Utc::now(),
            source: "simulated".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_farm_is_not_found() {
        let (service, _) = service_with_farm();
        let result = service.current(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_new_farm_defaults() {
        let (service, farm_id) = service_with_farm();
        let risk = service.current(farm_id).await.unwrap();
        assert_eq!(risk.risk, RiskScore::ZERO);
        assert_eq!(risk.history_multiplier, 1.0);
        assert_eq!(risk.classification, RiskClassification::Low);
    }

    #[tokio::test]
    async fn test_recompute_without_samples_is_zero() {
        let (service, farm_id) = service_with_farm();
        let result = service.recompute(farm_id, today()).await.unwrap();
        assert_eq!(result.risk, RiskScore::ZERO);
        assert_eq!(result.sample_count, 0);
    }

    #[tokio::test]
    async fn test_recompute_persists_mean_of_samples() {
        let (service, farm_id) = service_with_farm();
        service.repository.set_samples(farm_id, vec![20.0, 40.0, 60.0]);

        let result = service.recompute(farm_id, today()).await.unwrap();
        assert_eq!(result.risk.value(), 40);
        assert_eq!(result.classification, RiskClassification::Medium);
        assert_eq!(service.current(farm_id).await.unwrap().risk.value(), 40);
    }

    #[tokio::test]
    async fn test_history_selection_scales_score() {
        let (service, farm_id) = service_with_farm();
        service.repository.set_samples(farm_id, vec![40.0]);

        let result = service
            .apply_history_selection(farm_id, &[85.0, 72.0, 65.0], today())
            .await
            .unwrap();

        assert_eq!(result.history_multiplier, 2.0);
        assert_eq!(result.risk.value(), 80);
        assert_eq!(result.classification, RiskClassification::Critical);
        assert_eq!(service.current(farm_id).await.unwrap().history_multiplier, 2.0);
    }

    #[tokio::test]
    async fn test_history_selection_rejects_four_values() {
        let (service, farm_id) = service_with_farm();
        let result = service
            .apply_history_selection(farm_id, &[10.0, 20.0, 30.0, 40.0], today())
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(service.current(farm_id).await.unwrap().history_multiplier, 1.0);
    }

    #[tokio::test]
    async fn test_empty_history_selection_resets_multiplier() {
        let (service, farm_id) = service_with_farm();
        service
            .apply_history_selection(farm_id, &[90.0], today())
            .await
            .unwrap();
        let result = service
            .apply_history_selection(farm_id, &[], today())
            .await
            .unwrap();
        assert_eq!(result.history_multiplier, 1.0);
    }

    #[tokio::test]
    async fn test_recency_and_history_are_not_compounded() {
        let (service, farm_id) = service_with_farm();
        service.repository.set_samples(farm_id, vec![50.0]);
        service.repository.set_days(
            farm_id,
            (0..10).map(|d| today() - Duration::days(d)).collect(),
        );

        // history 1.4, recency 1.3
        let result = service
            .apply_history_selection(farm_id, &[40.0], today())
            .await
            .unwrap();
        assert!((result.recency_multiplier - 1.3).abs() < 1e-9);
        assert_eq!(result.applied_multiplier, 1.4);
        assert_eq!(result.risk.value(), 70);
    }

    #[tokio::test]
    async fn test_recency_applies_without_history() {
        let (service, farm_id) = service_with_farm();
        service.repository.set_samples(farm_id, vec![40.0]);
        service.repository.set_days(
            farm_id,
            (0..10).map(|d| today() - Duration::days(d)).collect(),
        );

        let result = service.recompute(farm_id, today()).await.unwrap();
        assert!((result.applied_multiplier - 1.3).abs() < 1e-9);
        assert_eq!(result.risk.value(), 52);
    }

    #[tokio::test]
    async fn test_marking_days_changes_stored_score() {
        let (service, farm_id) = service_with_farm();
        service.repository.set_samples(farm_id, vec![40.0]);
        service.recompute(farm_id, today()).await.unwrap();
        assert_eq!(service.current(farm_id).await.unwrap().risk.value(), 40);

        service.repository.set_days(
            farm_id,
            (0..10).map(|d| today() - Duration::days(d)).collect(),
        );
        service.recompute(farm_id, today()).await.unwrap();
        assert_eq!(service.current(farm_id).await.unwrap().risk.value(), 52);

        // clearing the calendar drops the score back
        service.repository.set_days(farm_id, Vec::new());
        service.recompute(farm_id, today()).await.unwrap();
        assert_eq!(service.current(farm_id).await.unwrap().risk.value(), 40);
    }

    #[tokio::test]
    async fn test_import_uses_mean_blend() {
        let repository = InMemoryRiskRepository::new();
        let farm_id = Uuid::new_v4();
        let source_id = Uuid::new_v4();
        repository.add_farm(farm_id);
        repository.add_farm(source_id);
        repository.set_samples(farm_id, vec![40.0]);
        repository.set_samples(source_id, vec![80.0]);
        let service = RiskService::new(repository, BlendStrategy::Mean);
        service.recompute(farm_id, today()).await.unwrap();
        service.recompute(source_id, today()).await.unwrap();

        let import = service.import_from(farm_id, source_id).await.unwrap();
        assert_eq!(import.previous.value(), 40);
        assert_eq!(import.incoming.value(), 80);
        assert_eq!(import.risk.value(), 60);
        assert_eq!(service.current(farm_id).await.unwrap().risk.value(), 60);
        // source farm is untouched
        assert_eq!(service.current(source_id).await.unwrap().risk.value(), 80);
    }

    #[tokio::test]
    async fn test_import_weighted_blend() {
        let repository = InMemoryRiskRepository::new();
        let farm_id = Uuid::new_v4();
        let source_id = Uuid::new_v4();
        repository.add_farm(farm_id);
        repository.add_farm(source_id);
        repository.set_samples(farm_id, vec![40.0]);
        repository.set_samples(source_id, vec![80.0]);
        let service = RiskService::new(repository, BlendStrategy::Weighted(0.15));
        service.recompute(farm_id, today()).await.unwrap();
        service.recompute(source_id, today()).await.unwrap();

        let import = service.import_from(farm_id, source_id).await.unwrap();
        assert_eq!(import.risk.value(), 52);
    }

    #[tokio::test]
    async fn test_import_from_self_rejected() {
        let (service, farm_id) = service_with_farm();
        let result = service.import_from(farm_id, farm_id).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_import_from_unknown_farm() {
        let (service, farm_id) = service_with_farm();
        let result = service.import_from(farm_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_climate_adjustment_is_not_persisted() {
        let (service, farm_id) = service_with_farm();
        service.repository.set_samples(farm_id, vec![40.0]);
        service.recompute(farm_id, today()).await.unwrap();

        let adjusted = service
            .climate_adjusted(farm_id, reading(28.0, 85.0))
            .await
            .unwrap();

        assert_eq!(adjusted.climate.multiplier, 1.5);
        assert_eq!(adjusted.adjusted_risk.value(), 60);
        assert_eq!(adjusted.classification, RiskClassification::High);
        assert_eq!(service.current(farm_id).await.unwrap().risk.value(), 40);
    }

    #[tokio::test]
    async fn test_climate_adjustment_clamps_at_max() {
        let (service, farm_id) = service_with_farm();
        service.repository.set_samples(farm_id, vec![90.0]);
        service.recompute(farm_id, today()).await.unwrap();

        let adjusted = service
            .climate_adjusted(farm_id, reading(32.0, 85.0))
            .await
            .unwrap();
        assert_eq!(adjusted.adjusted_risk, RiskScore::MAX);
        assert_eq!(adjusted.classification, RiskClassification::Critical);
    }
}
