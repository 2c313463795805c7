//! Farm models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::risk::{RiskClassification, RiskScore};
use crate::types::GpsCoordinates;

/// Risk reported for a farm that has never been scored
pub const DEFAULT_RISK: RiskScore = RiskScore::ZERO;
/// History multiplier reported for a farm without a calendar selection
pub const DEFAULT_HISTORY_MULTIPLIER: f64 = 1.0;

/// A cattle farm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farm {
    pub id: Uuid,
    pub name: String,
    pub owner: Option<String>,
    pub risk: RiskScore,
    pub history_multiplier: f64,
    pub coordinates: GpsCoordinates,
    pub total_animals: i32,
    pub area_hectares: Option<Decimal>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Farm {
    pub fn classification(&self) -> RiskClassification {
        self.risk.classification()
    }
}

/// Current risk state of a farm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmRisk {
    pub farm_id: Uuid,
    pub risk: RiskScore,
    pub history_multiplier: f64,
    pub classification: RiskClassification,
    pub updated_at: DateTime<Utc>,
}

impl FarmRisk {
    pub fn new(
        farm_id: Uuid,
        risk: RiskScore,
        history_multiplier: f64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            farm_id,
            risk,
            history_multiplier,
            classification: risk.classification(),
            updated_at,
        }
    }

    /// Snapshot with the documented defaults, for farms never scored
    pub fn unscored(farm_id: Uuid, updated_at: DateTime<Utc>) -> Self {
        Self::new(farm_id, DEFAULT_RISK, DEFAULT_HISTORY_MULTIPLIER, updated_at)
    }
}

/// A neighbouring farm shown on the dashboard map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyFarm {
    pub id: Uuid,
    pub name: String,
    pub risk: RiskScore,
    pub classification: RiskClassification,
    pub coordinates: GpsCoordinates,
    pub distance_km: f64,
    pub total_animals: i32,
    pub area_hectares: Option<Decimal>,
    pub contact: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl NearbyFarm {
    pub fn from_farm(farm: &Farm, origin: &GpsCoordinates) -> Self {
        Self {
            id: farm.id,
            name: farm.name.clone(),
            risk: farm.risk,
            classification: farm.classification(),
            coordinates: farm.coordinates.clone(),
            distance_km: origin.distance_km(&farm.coordinates),
            total_animals: farm.total_animals,
            area_hectares: farm.area_hectares,
            contact: farm.contact.clone(),
            updated_at: farm.updated_at,
        }
    }
}
