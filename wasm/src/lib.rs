//! WebAssembly module for TickWatch
//!
//! Provides client-side computation for:
//! - Farm risk classification and scoring
//! - Climate favourability assessment
//! - Offline data validation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::risk::{self, BlendStrategy};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("TickWatch scoring module loaded"));
}

fn parse_day(value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date {}: {}", value, e)))
}

/// Classify a farm risk score ("Low", "Medium", "High", "Critical")
#[wasm_bindgen]
pub fn classify_risk(score: f64) -> String {
    risk::classify(score).to_string()
}

/// Portuguese label for a farm risk score
#[wasm_bindgen]
pub fn classify_risk_pt(score: f64) -> String {
    risk::classify(score).label_pt().to_string()
}

/// Climate assessment as JSON
#[wasm_bindgen]
pub fn climate_risk(temperature_c: f64, humidity_pct: f64) -> Result<String, JsValue> {
    let assessment = risk::climate_factor(temperature_c, humidity_pct);
    serde_json::to_string(&assessment)
        .map_err(|e| JsValue::from_str(&format!("Failed to encode climate risk: {}", e)))
}

/// Multiplier from up to three selected history values
#[wasm_bindgen]
pub fn history_multiplier(values: &[f64]) -> f64 {
    risk::history_multiplier(values)
}

/// Multiplier from contamination days, given as a JSON array of ISO dates
#[wasm_bindgen]
pub fn recency_multiplier(days_json: &str, today: &str) -> Result<f64, JsValue> {
    let days: Vec<String> = serde_json::from_str(days_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid days JSON: {}", e)))?;
    let days = days
        .iter()
        .map(|day| parse_day(day))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(risk::recency_multiplier(&days, parse_day(today)?))
}

/// Farm score from animal infestation levels and a multiplier
#[wasm_bindgen]
pub fn farm_risk(samples: &[f64], multiplier: f64) -> u8 {
    risk::aggregate_risk(samples, multiplier).value()
}

/// Farm score scaled by a multiplier, for climate previews
#[wasm_bindgen]
pub fn adjusted_risk(score: f64, multiplier: f64) -> u8 {
    risk::apply_multiplier(score, multiplier).value()
}

/// Neighbour import as the mean of both scores
#[wasm_bindgen]
pub fn import_risk_mean(current: f64, incoming: f64) -> u8 {
    risk::import_risk(current, incoming, BlendStrategy::Mean).value()
}

/// Neighbour import as `current + incoming * weight`
#[wasm_bindgen]
pub fn import_risk_weighted(current: f64, incoming: f64, weight: f64) -> u8 {
    risk::import_risk(current, incoming, BlendStrategy::Weighted(weight)).value()
}

/// Infestation level of one animal from its adult tick count
#[wasm_bindgen]
pub fn infestation_level(larvae: i32, nymphs: i32, adults: i32) -> i32 {
    TickCounts::bounded(larvae, nymphs, adults).infestation_level()
}

/// Check an ear tag before it is sent to the server
#[wasm_bindgen]
pub fn check_ear_tag(ear_tag: &str) -> bool {
    validate_ear_tag(ear_tag.trim()).is_ok()
}

/// Check that a history selection has at most three values
#[wasm_bindgen]
pub fn check_history_selection(len: usize) -> bool {
    validate_history_selection(len).is_ok()
}

/// Check GPS coordinates entered on the farm form
#[wasm_bindgen]
pub fn check_coordinates(latitude: f64, longitude: f64) -> bool {
    match (Decimal::try_from(latitude), Decimal::try_from(longitude)) {
        (Ok(latitude), Ok(longitude)) => validate_coordinates(latitude, longitude).is_ok(),
        _ => false,
    }
}

/// Whether a contamination day should carry the distant-day warning
#[wasm_bindgen]
pub fn is_distant_contamination_day(day: &str, today: &str) -> Result<bool, JsValue> {
    Ok(is_distant_day(parse_day(day)?, parse_day(today)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_risk() {
        assert_eq!(classify_risk(10.0), "Low");
        assert_eq!(classify_risk(30.0), "Medium");
        assert_eq!(classify_risk(60.0), "High");
        assert_eq!(classify_risk(80.0), "Critical");
        assert_eq!(classify_risk_pt(92.0), "Crítico");
    }

    #[test]
    fn test_climate_risk_json() {
        let json = climate_risk(28.0, 85.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["classification"], "medium");
        assert_eq!(value["multiplier"], 1.5);
    }

    #[test]
    fn test_farm_risk() {
        assert_eq!(farm_risk(&[20.0, 40.0, 60.0], 1.0), 40);
        assert_eq!(farm_risk(&[], 2.0), 0);
        assert_eq!(farm_risk(&[90.0], 2.0), 100);
    }

    #[test]
    fn test_import_blends() {
        assert_eq!(import_risk_mean(40.0, 80.0), 60);
        assert_eq!(import_risk_weighted(40.0, 80.0, 0.15), 52);
    }

    #[test]
    fn test_recency_multiplier_from_json() {
        let m = recency_multiplier(r#"["2024-06-15", "2024-06-14", "2024-01-01"]"#, "2024-06-15")
            .unwrap();
        assert!((m - 1.06).abs() < 1e-9);
    }

    #[test]
    fn test_infestation_level() {
        assert_eq!(infestation_level(30, 10, 20), 30);
        assert_eq!(infestation_level(0, 0, 80), 100);
        assert_eq!(infestation_level(i32::MAX, i32::MAX, i32::MAX), 100);
        assert_eq!(infestation_level(0, 0, -5), 0);
    }

    #[test]
    fn test_offline_validation() {
        assert!(check_ear_tag("BR-0042"));
        assert!(!check_ear_tag(""));
        assert!(check_history_selection(3));
        assert!(!check_history_selection(4));
        assert!(check_coordinates(-21.244, -45.147));
        assert!(!check_coordinates(f64::NAN, 0.0));
        assert!(is_distant_contamination_day("2023-11-01", "2024-06-15").unwrap());
        assert!(!is_distant_contamination_day("2024-06-01", "2024-06-15").unwrap());
    }
}
