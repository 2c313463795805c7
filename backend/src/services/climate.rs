//! Climate service: current readings and their tick-favourability assessment

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{climate_factor, validate_coordinates, ClimateReading, ClimateRisk};

use crate::error::{AppError, AppResult};
use crate::external::ClimateSource;

/// Climate service
#[derive(Clone)]
pub struct ClimateService {
    source: Arc<ClimateSource>,
}

/// Reading together with its assessment
#[derive(Debug, Clone, Serialize)]
pub struct ClimateReport {
    pub reading: ClimateReading,
    pub risk: ClimateRisk,
}

/// Manual temperature and humidity, as typed into the climate screen
#[derive(Debug, Clone, Deserialize)]
pub struct AssessClimateInput {
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

impl ClimateService {
    pub fn new(source: Arc<ClimateSource>) -> Self {
        Self { source }
    }

    /// Current reading at a location
    pub async fn current_reading(&self, latitude: Decimal, longitude: Decimal) -> AppResult<ClimateReading> {
        validate_coordinates(latitude, longitude)
            .map_err(|e| AppError::invalid("coordinates", e, "Coordenadas inválidas"))?;
        self.source.current(latitude, longitude).await
    }

    /// Current reading at a location, assessed
    pub async fn current(&self, latitude: Decimal, longitude: Decimal) -> AppResult<ClimateReport> {
        let reading = self.current_reading(latitude, longitude).await?;
        let risk = reading.risk();
        tracing::debug!(
            "Climate at {},{}: {:.1}C {:.0}% -> {}",
            latitude,
            longitude,
            reading.temperature_c,
            reading.humidity_pct,
            risk.classification
        );
        Ok(ClimateReport { reading, risk })
    }

    /// Assess manually entered conditions
    pub fn assess(input: &AssessClimateInput) -> AppResult<ClimateRisk> {
        if !input.temperature_c.is_finite() {
            return Err(AppError::invalid(
                "temperature_c",
                "Temperature must be a number",
                "Temperatura deve ser um número",
            ));
        }
        if !input.humidity_pct.is_finite() || !(0.0..=100.0).contains(&input.humidity_pct) {
            return Err(AppError::invalid(
                "humidity_pct",
                "Humidity must be between 0 and 100",
                "Umidade deve estar entre 0 e 100",
            ));
        }
        Ok(climate_factor(input.temperature_c, input.humidity_pct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::weather::SimulatedClimate;
    use shared::RiskClassification;

    #[test]
    fn test_assess_warm_humid_day() {
        let risk = ClimateService::assess(&AssessClimateInput {
            temperature_c: 28.0,
            humidity_pct: 85.0,
        })
        .unwrap();
        assert_eq!(risk.classification, RiskClassification::Medium);
        assert_eq!(risk.multiplier, 1.5);
    }

    #[test]
    fn test_assess_rejects_humidity_out_of_range() {
        let result = ClimateService::assess(&AssessClimateInput {
            temperature_c: 28.0,
            humidity_pct: 120.0,
        });
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_simulated_report() {
        let service = ClimateService::new(Arc::new(ClimateSource::Simulated(SimulatedClimate::new(
            Some(11),
        ))));
        let report = service
            .current(Decimal::new(-21244, 3), Decimal::new(-45147, 3))
            .await
            .unwrap();
        assert_eq!(report.reading.source, "simulated");
        assert!(report.risk.multiplier >= 1.0);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_rejected() {
        let service = ClimateService::new(Arc::new(ClimateSource::Simulated(SimulatedClimate::new(
            None,
        ))));
        let result = service.current(Decimal::from(91), Decimal::ZERO).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
