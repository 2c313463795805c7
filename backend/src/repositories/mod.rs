//! Persistence boundary for risk scoring
//!
//! Services that feed the calculator read and write farm risk through
//! [`RiskRepository`] only, so scoring can be exercised without a database.

use std::future::Future;

use chrono::NaiveDate;
use shared::{FarmRisk, RiskScore};
use uuid::Uuid;

use crate::error::AppResult;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::InMemoryRiskRepository;
pub use postgres::PgRiskRepository;

/// Narrow read/write interface over stored farm risk
pub trait RiskRepository: Send + Sync {
    /// Current infestation level of every analysed animal on the farm
    fn get_samples(&self, farm_id: Uuid) -> impl Future<Output = AppResult<Vec<f64>>> + Send;

    /// Days marked as "contamination observed", most recent first
    fn get_contamination_days(
        &self,
        farm_id: Uuid,
    ) -> impl Future<Output = AppResult<Vec<NaiveDate>>> + Send;

    /// Stored risk for the farm; `None` when the farm does not exist
    fn get_risk(&self, farm_id: Uuid) -> impl Future<Output = AppResult<Option<FarmRisk>>> + Send;

    /// Overwrite the farm risk score
    fn put_score(
        &self,
        farm_id: Uuid,
        score: RiskScore,
    ) -> impl Future<Output = AppResult<()>> + Send;

    /// Overwrite the farm history multiplier
    fn put_multiplier(
        &self,
        farm_id: Uuid,
        multiplier: f64,
    ) -> impl Future<Output = AppResult<()>> + Send;
}
