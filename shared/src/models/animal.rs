//! Animal and photo models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::risk::{classify, RiskClassification};

/// An animal registered on a farm, identified by its ear tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub ear_tag: String,
    pub name: Option<String>,
    /// Latest infestation level (0-100), 0 until first analysed
    pub infestation_level: i32,
    pub last_analysis_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Animal {
    pub fn classification(&self) -> RiskClassification {
        classify(f64::from(self.infestation_level))
    }
}

/// Milking shift in which photos were taken
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Morning,
    Afternoon,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "morning" => Some(Shift::Morning),
            "afternoon" => Some(Shift::Afternoon),
            _ => None,
        }
    }
}

/// Body region a photo was taken of
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhotoPosition {
    Left,
    Right,
    BetweenLegs,
}

impl PhotoPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoPosition::Left => "left",
            PhotoPosition::Right => "right",
            PhotoPosition::BetweenLegs => "between_legs",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(PhotoPosition::Left),
            "right" => Some(PhotoPosition::Right),
            "between_legs" => Some(PhotoPosition::BetweenLegs),
            _ => None,
        }
    }
}

/// A stored photo of an animal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalPhoto {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub position: PhotoPosition,
    pub shift: Shift,
    pub taken_on: NaiveDate,
    pub url: String,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
}
