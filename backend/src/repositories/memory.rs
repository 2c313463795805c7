//! In-memory risk repository for service tests

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use shared::{FarmRisk, RiskScore};
use uuid::Uuid;

use super::RiskRepository;
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryRiskRepository {
    farms: Mutex<HashMap<Uuid, FarmRisk>>,
    samples: Mutex<HashMap<Uuid, Vec<f64>>>,
    days: Mutex<HashMap<Uuid, Vec<NaiveDate>>>,
}

impl InMemoryRiskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_farm(&self, farm_id: Uuid) {
        self.farms
            .lock()
            .unwrap()
            .insert(farm_id, FarmRisk::unscored(farm_id, Utc::now()));
    }

    pub fn set_samples(&self, farm_id: Uuid, samples: Vec<f64>) {
        self.samples.lock().unwrap().insert(farm_id, samples);
    }

    pub fn set_days(&self, farm_id: Uuid, mut days: Vec<NaiveDate>) {
        days.sort_unstable_by(|a, b| b.cmp(a));
        self.days.lock().unwrap().insert(farm_id, days);
    }

    fn update<F: FnOnce(&mut FarmRisk)>(&self, farm_id: Uuid, apply: F) -> AppResult<()> {
        let mut farms = self.farms.lock().unwrap();
        let risk = farms
            .get_mut(&farm_id)
            .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;
        apply(risk);
        risk.classification = risk.risk.classification();
        risk.updated_at = Utc::now();
        Ok(())
    }
}

impl RiskRepository for InMemoryRiskRepository {
    async fn get_samples(&self, farm_id: Uuid) -> AppResult<Vec<f64>> {
        Ok(self
            .samples
            .lock()
            .unwrap()
            .get(&farm_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_contamination_days(&self, farm_id: Uuid) -> AppResult<Vec<NaiveDate>> {
        Ok(self
            .days
            .lock()
            .unwrap()
            .get(&farm_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_risk(&self, farm_id: Uuid) -> AppResult<Option<FarmRisk>> {
        Ok(self.farms.lock().unwrap().get(&farm_id).cloned())
    }

    async fn put_score(&self, farm_id: Uuid, score: RiskScore) -> AppResult<()> {
        self.update(farm_id, |risk| risk.risk = score)
    }

    async fn put_multiplier(&self, farm_id: Uuid, multiplier: f64) -> AppResult<()> {
        self.update(farm_id, |risk| risk.history_multiplier = multiplier)
    }
}
