//! Climate reading models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk::{climate_factor, ClimateRisk};

/// A weather observation relevant to tick proliferation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub condition: String,
    pub wind_kmh: f64,
    /// Rainfall over the last hour, when reported
    pub rain_1h_mm: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    /// "openweathermap" or "simulated"
    pub source: String,
}

impl ClimateReading {
    pub fn risk(&self) -> ClimateRisk {
        climate_factor(self.temperature_c, self.humidity_pct)
    }
}
