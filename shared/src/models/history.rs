//! Contamination history models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A calendar day on which contamination was observed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContaminationDay {
    pub farm_id: Uuid,
    pub day: NaiveDate,
    pub marked_at: DateTime<Utc>,
}

/// Result of saving a contamination calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminationCalendar {
    pub farm_id: Uuid,
    /// Marked days, most recent first
    pub days: Vec<NaiveDate>,
    /// Set when a marked day is more than six months old
    pub has_distant_days: bool,
}
