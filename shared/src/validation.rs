//! Validation utilities for the TickWatch platform
//!
//! Calendar and photo rules enforced by the mobile client are repeated here so
//! the API rejects the same inputs.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::PhotoPosition;

/// Most history values a farmer may select for the history multiplier
pub const MAX_HISTORY_SELECTION: usize = 3;

/// Most photos per animal per shift per day
pub const MAX_PHOTOS_PER_SHIFT: usize = 3;

/// Marked days older than this many months raise a warning
pub const DISTANT_DAY_MONTHS: u32 = 6;

// ============================================================================
// Animal Validations
// ============================================================================

/// Validate ear tag format (1-32 alphanumeric characters or '-')
pub fn validate_ear_tag(ear_tag: &str) -> Result<(), &'static str> {
    let ear_tag = ear_tag.trim();
    if ear_tag.is_empty() {
        return Err("Ear tag is required");
    }
    if ear_tag.len() > 32 {
        return Err("Ear tag must be at most 32 characters");
    }
    if !ear_tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("Ear tag must be alphanumeric");
    }
    Ok(())
}

/// Validate that another photo fits in the shift
pub fn validate_photo_slot(existing_photos: usize) -> Result<(), &'static str> {
    if existing_photos >= MAX_PHOTOS_PER_SHIFT {
        return Err("Photo limit reached for this shift");
    }
    Ok(())
}

/// Object storage path for an animal photo
pub fn photo_storage_path(
    farm_id: Uuid,
    animal_id: Uuid,
    position: PhotoPosition,
    timestamp_ms: i64,
) -> String {
    format!(
        "farms/{}/animals/{}/{}_{}_{}.jpg",
        farm_id,
        animal_id,
        animal_id,
        position.as_str(),
        timestamp_ms
    )
}

// ============================================================================
// History Validations
// ============================================================================

/// Validate a contamination day; future days are rejected
pub fn validate_contamination_day(day: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if day > today {
        return Err("Contamination day cannot be in the future");
    }
    Ok(())
}

/// Check whether a marked day is old enough to carry less weight
pub fn is_distant_day(day: NaiveDate, today: NaiveDate) -> bool {
    match today.checked_sub_months(Months::new(DISTANT_DAY_MONTHS)) {
        Some(limit) => day < limit,
        None => false,
    }
}

/// Validate the number of history values selected
pub fn validate_history_selection(len: usize) -> Result<(), &'static str> {
    if len > MAX_HISTORY_SELECTION {
        return Err("At most 3 history values may be selected");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate GPS coordinates are within world bounds
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a percentage reading supplied by a client
pub fn validate_percentage(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        return Err("Percentage must be a finite number");
    }
    if !(0.0..=100.0).contains(&value) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_validate_ear_tag() {
        assert!(validate_ear_tag("BR-0042").is_ok());
        assert!(validate_ear_tag("  17 ").is_ok());
        assert!(validate_ear_tag("").is_err());
        assert!(validate_ear_tag("tag 42").is_err());
        assert!(validate_ear_tag(&"9".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_photo_slot() {
        assert!(validate_photo_slot(0).is_ok());
        assert!(validate_photo_slot(2).is_ok());
        assert!(validate_photo_slot(3).is_err());
    }

    #[test]
    fn test_photo_storage_path() {
        let farm = Uuid::nil();
        let animal = Uuid::from_u128(7);
        let path = photo_storage_path(farm, animal, PhotoPosition::BetweenLegs, 1_700_000_000_000);
        assert_eq!(
            path,
            format!(
                "farms/{}/animals/{}/{}_between_legs_1700000000000.jpg",
                farm, animal, animal
            )
        );
    }

    #[test]
    fn test_validate_contamination_day() {
        let today = day("2024-06-15");
        assert!(validate_contamination_day(today, today).is_ok());
        assert!(validate_contamination_day(day("2024-01-01"), today).is_ok());
        assert!(validate_contamination_day(day("2024-06-16"), today).is_err());
    }

    #[test]
    fn test_is_distant_day() {
        let today = day("2024-06-15");
        assert!(!is_distant_day(day("2024-01-15"), today));
        assert!(!is_distant_day(day("2023-12-15"), today));
        assert!(is_distant_day(day("2023-12-14"), today));
    }

    #[test]
    fn test_validate_history_selection() {
        assert!(validate_history_selection(0).is_ok());
        assert!(validate_history_selection(3).is_ok());
        assert!(validate_history_selection(4).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(Decimal::new(-21244, 3), Decimal::new(-45147, 3)).is_ok());
        assert!(validate_coordinates(Decimal::from(91), Decimal::ZERO).is_err());
        assert!(validate_coordinates(Decimal::ZERO, Decimal::from(-181)).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(100.5).is_err());
        assert!(validate_percentage(f64::NAN).is_err());
    }
}
