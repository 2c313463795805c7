//! Common types used across the platform

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for farm distances
const EARTH_RADIUS_KM: f64 = 6371.0;

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &GpsCoordinates) -> f64 {
        let lat1 = self.latitude.to_f64().unwrap_or_default().to_radians();
        let lat2 = other.latitude.to_f64().unwrap_or_default().to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude.to_f64().unwrap_or_default()
            - self.longitude.to_f64().unwrap_or_default())
        .to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Inclusive date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let point = GpsCoordinates::new(dec("-21.244"), dec("-45.147"));
        assert!(point.distance_km(&point).abs() < 1e-9);
    }

    #[test]
    fn test_distance_between_neighbouring_farms() {
        // Boa Vista to Sitio Esperanca, roughly 1.5 km apart
        let boa_vista = GpsCoordinates::new(dec("-21.24"), dec("-45.15"));
        let esperanca = GpsCoordinates::new(dec("-21.25"), dec("-45.16"));
        let distance = boa_vista.distance_km(&esperanca);
        assert!(distance > 1.0 && distance < 2.0, "got {}", distance);
        assert!((distance - esperanca.distance_km(&boa_vista)).abs() < 1e-9);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        };
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }
}
