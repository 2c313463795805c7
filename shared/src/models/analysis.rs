//! Infestation analysis models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Shift;
use crate::risk::clamp_percent;

/// Infestation points per adult tick detected
pub const LEVEL_PER_ADULT_TICK: f64 = 1.5;

/// Largest count accepted for a single tick stage
pub const MAX_TICKS_PER_STAGE: i32 = 100_000;

/// Tick counts produced by an analysis provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickCounts {
    pub larvae: i32,
    pub nymphs: i32,
    pub adults: i32,
}

impl TickCounts {
    /// Counts clamped to `0..=MAX_TICKS_PER_STAGE`
    pub fn bounded(larvae: i32, nymphs: i32, adults: i32) -> Self {
        let clamp = |count: i32| count.clamp(0, MAX_TICKS_PER_STAGE);
        TickCounts {
            larvae: clamp(larvae),
            nymphs: clamp(nymphs),
            adults: clamp(adults),
        }
    }

    pub fn total(&self) -> i32 {
        self.larvae
            .saturating_add(self.nymphs)
            .saturating_add(self.adults)
    }

    /// Infestation level (0-100) derived from the adult tick count
    pub fn infestation_level(&self) -> i32 {
        clamp_percent(f64::from(self.adults) * LEVEL_PER_ADULT_TICK).round() as i32
    }
}

/// One recorded infestation reading for one animal. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfestationSample {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub animal_id: Uuid,
    pub level: i32,
    pub counts: TickCounts,
    pub shift: Shift,
    pub sample_date: NaiveDate,
    /// Name of the analysis provider that produced the reading
    pub provider: String,
    pub recorded_at: DateTime<Utc>,
}

impl InfestationSample {
    pub fn value(&self) -> f64 {
        f64::from(self.level)
    }
}
