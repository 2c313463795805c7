//! Risk scoring calculator
//!
//! Converts infestation samples, climate readings and contamination history
//! into a bounded farm-level risk score. Every function in this module is
//! pure and total: non-finite inputs read as 0 and every output is clamped
//! into its valid range.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scores below this are Low
pub const LOW_UPPER_BOUND: f64 = 30.0;
/// Scores below this (and not Low) are Medium
pub const MEDIUM_UPPER_BOUND: f64 = 60.0;
/// Scores below this (and not Medium) are High
pub const HIGH_UPPER_BOUND: f64 = 80.0;

/// Days counted by the recency multiplier
pub const RECENCY_WINDOW_DAYS: i64 = 30;
/// Multiplier increment per recently marked contamination day
pub const RECENCY_STEP: f64 = 0.03;
/// Upper bound for any history-derived multiplier
pub const MAX_HISTORY_MULTIPLIER: f64 = 2.0;

/// Weight the dashboard used when importing a neighbour's risk
pub const DEFAULT_IMPORT_WEIGHT: f64 = 0.15;

/// Discrete severity bucket for a risk score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskClassification {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskClassification {
    /// Portuguese label shown on the farm badge
    pub fn label_pt(&self) -> &'static str {
        match self {
            RiskClassification::Low => "Baixo",
            RiskClassification::Medium => "Médio",
            RiskClassification::High => "Alto",
            RiskClassification::Critical => "Crítico",
        }
    }
}

impl std::fmt::Display for RiskClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskClassification::Low => write!(f, "Low"),
            RiskClassification::Medium => write!(f, "Medium"),
            RiskClassification::High => write!(f, "High"),
            RiskClassification::Critical => write!(f, "Critical"),
        }
    }
}

/// Aggregate farm-level risk, always an integer in 0..=100
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "f64", into = "u8")]
pub struct RiskScore(u8);

impl RiskScore {
    pub const ZERO: RiskScore = RiskScore(0);
    pub const MAX: RiskScore = RiskScore(100);

    /// Sanitise, clamp to [0, 100] and round to the nearest integer
    pub fn from_f64(value: f64) -> Self {
        Self(clamp_percent(value).round() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn classification(self) -> RiskClassification {
        classify(self.as_f64())
    }
}

impl From<f64> for RiskScore {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<RiskScore> for u8 {
    fn from(score: RiskScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for RiskScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Read non-finite values as 0
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamp a percentage-like quantity into [0, 100]
pub fn clamp_percent(value: f64) -> f64 {
    sanitize(value).clamp(0.0, 100.0)
}

/// Classify a score with the fixed 30/60/80 thresholds
pub fn classify(score: f64) -> RiskClassification {
    let score = clamp_percent(score);
    if score < LOW_UPPER_BOUND {
        RiskClassification::Low
    } else if score < MEDIUM_UPPER_BOUND {
        RiskClassification::Medium
    } else if score < HIGH_UPPER_BOUND {
        RiskClassification::High
    } else {
        RiskClassification::Critical
    }
}

// ============================================================================
// Climate
// ============================================================================

/// Banded temperature coefficient, peaking at 30-35°C
pub fn temperature_coefficient(temperature_c: f64) -> f64 {
    let t = sanitize(temperature_c);
    if t < 15.0 {
        0.2
    } else if t < 20.0 {
        0.4
    } else if t < 25.0 {
        0.7
    } else if t < 30.0 {
        1.0
    } else if t < 35.0 {
        1.2
    } else {
        1.0
    }
}

/// Banded humidity coefficient, monotonically increasing
pub fn humidity_coefficient(humidity_pct: f64) -> f64 {
    let h = sanitize(humidity_pct);
    if h < 40.0 {
        0.3
    } else if h < 60.0 {
        0.6
    } else if h < 70.0 {
        0.8
    } else if h < 80.0 {
        1.0
    } else {
        1.1
    }
}

/// Climate favourability for tick proliferation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateRisk {
    /// Product of the temperature and humidity coefficients
    pub factor: f64,
    pub classification: RiskClassification,
    /// Discrete multiplier applied to the farm score, never below 1.0
    pub multiplier: f64,
    pub message: String,
    pub message_pt: String,
}

/// Combine temperature and humidity into a climate factor and advisory
pub fn climate_factor(temperature_c: f64, humidity_pct: f64) -> ClimateRisk {
    let temperature = sanitize(temperature_c);
    let humidity = sanitize(humidity_pct);
    let factor = temperature_coefficient(temperature) * humidity_coefficient(humidity);

    let (classification, multiplier) = if factor > 1.5 {
        (RiskClassification::Critical, 3.5)
    } else if factor > 1.2 {
        (RiskClassification::High, 2.5)
    } else if factor > 0.9 {
        (RiskClassification::Medium, 1.5)
    } else {
        (RiskClassification::Low, 1.0)
    };

    let (message, message_pt) = climate_message(classification, temperature, humidity);

    ClimateRisk {
        factor,
        classification,
        multiplier,
        message,
        message_pt,
    }
}

fn climate_message(
    classification: RiskClassification,
    temperature: f64,
    humidity: f64,
) -> (String, String) {
    match classification {
        RiskClassification::Critical => (
            format!(
                "Maximum alert! Heat ({}°C) and humidity ({}%) create ideal conditions for tick proliferation",
                temperature, humidity
            ),
            format!(
                "Alerta máximo! Calor ({}°C) e umidade ({}%) criam ambiente ideal para proliferação",
                temperature, humidity
            ),
        ),
        RiskClassification::High => (
            "Attention! Climate conditions favour tick reproduction".to_string(),
            "Atenção! Condições climáticas favorecem reprodução dos carrapatos".to_string(),
        ),
        RiskClassification::Medium => (
            "Moderate risk. Keep monitoring your pastures".to_string(),
            "Risco moderado. Monitore suas pastagens".to_string(),
        ),
        RiskClassification::Low => (
            "Conditions under control. Keep up regular monitoring".to_string(),
            "Condições controladas. Mantenha o monitoramento".to_string(),
        ),
    }
}

// ============================================================================
// History
// ============================================================================

/// Multiplier from the infestation values selected on the history calendar
///
/// Callers cap the selection size; this function accepts any length.
pub fn history_multiplier(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 1.0;
    }

    let mean = mean_percent(samples);
    if mean > 70.0 {
        2.0
    } else if mean > 50.0 {
        1.7
    } else if mean > 30.0 {
        1.4
    } else if mean > 15.0 {
        1.2
    } else {
        1.0
    }
}

/// Multiplier from the number of contamination days marked in the last 30 days
///
/// Duplicate and future days are ignored. Capped at [`MAX_HISTORY_MULTIPLIER`].
pub fn recency_multiplier(days: &[NaiveDate], today: NaiveDate) -> f64 {
    let recent: BTreeSet<NaiveDate> = days
        .iter()
        .copied()
        .filter(|day| *day <= today && (today - *day).num_days() <= RECENCY_WINDOW_DAYS)
        .collect();

    (1.0 + recent.len() as f64 * RECENCY_STEP).min(MAX_HISTORY_MULTIPLIER)
}

// ============================================================================
// Aggregation
// ============================================================================

/// Mean of the clamped values, 0 when empty
pub fn mean_percent(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: f64 = values.iter().copied().map(clamp_percent).sum();
    total / values.len() as f64
}

/// Scale a score by a multiplier and clamp the result
///
/// Negative or non-finite multipliers read as 0.
pub fn apply_multiplier(score: f64, multiplier: f64) -> RiskScore {
    RiskScore::from_f64(clamp_percent(score) * sanitize(multiplier).max(0.0))
}

/// Farm risk from per-animal infestation values and a multiplier
pub fn aggregate_risk(samples: &[f64], multiplier: f64) -> RiskScore {
    apply_multiplier(mean_percent(samples), multiplier)
}

/// How an imported neighbour score is blended into the current one
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendStrategy {
    /// `(current + incoming) / 2`
    #[default]
    Mean,
    /// `current + incoming * weight`
    Weighted(f64),
}

/// Blend an incoming score into the current one
pub fn import_risk(current: f64, incoming: f64, strategy: BlendStrategy) -> RiskScore {
    let current = clamp_percent(current);
    let incoming = clamp_percent(incoming);

    let blended = match strategy {
        BlendStrategy::Mean => (current + incoming) / 2.0,
        BlendStrategy::Weighted(weight) => current + incoming * sanitize(weight).max(0.0),
    };

    RiskScore::from_f64(blended)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(-5.0), RiskClassification::Low);
        assert_eq!(classify(29.0), RiskClassification::Low);
        assert_eq!(classify(30.0), RiskClassification::Medium);
        assert_eq!(classify(59.0), RiskClassification::Medium);
        assert_eq!(classify(60.0), RiskClassification::High);
        assert_eq!(classify(79.0), RiskClassification::High);
        assert_eq!(classify(80.0), RiskClassification::Critical);
        assert_eq!(classify(150.0), RiskClassification::Critical);
    }

    #[test]
    fn test_classify_non_finite_is_low() {
        assert_eq!(classify(f64::NAN), RiskClassification::Low);
        assert_eq!(classify(f64::INFINITY), RiskClassification::Low);
        assert_eq!(classify(f64::NEG_INFINITY), RiskClassification::Low);
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(RiskClassification::Critical.to_string(), "Critical");
        assert_eq!(RiskClassification::Medium.label_pt(), "Médio");
        assert!(RiskClassification::Low < RiskClassification::Critical);
    }

    #[test]
    fn test_risk_score_rounds_and_clamps() {
        assert_eq!(RiskScore::from_f64(42.5).value(), 43);
        assert_eq!(RiskScore::from_f64(42.4).value(), 42);
        assert_eq!(RiskScore::from_f64(-3.0), RiskScore::ZERO);
        assert_eq!(RiskScore::from_f64(250.0), RiskScore::MAX);
        assert_eq!(RiskScore::from_f64(f64::NAN), RiskScore::ZERO);
        assert_eq!(RiskScore::from_f64(85.0).to_string(), "85%");
    }

    #[test]
    fn test_risk_score_serde_clamps_on_read() {
        let score: RiskScore = serde_json::from_str("140").unwrap();
        assert_eq!(score, RiskScore::MAX);
        assert_eq!(serde_json::to_string(&RiskScore::from_f64(61.2)).unwrap(), "61");
    }

    #[test]
    fn test_temperature_bands() {
        assert_eq!(temperature_coefficient(10.0), 0.2);
        assert_eq!(temperature_coefficient(15.0), 0.4);
        assert_eq!(temperature_coefficient(24.9), 0.7);
        assert_eq!(temperature_coefficient(25.0), 1.0);
        assert_eq!(temperature_coefficient(32.0), 1.2);
        assert_eq!(temperature_coefficient(40.0), 1.0);
    }

    #[test]
    fn test_humidity_bands() {
        assert_eq!(humidity_coefficient(20.0), 0.3);
        assert_eq!(humidity_coefficient(45.0), 0.6);
        assert_eq!(humidity_coefficient(65.0), 0.8);
        assert_eq!(humidity_coefficient(75.0), 1.0);
        assert_eq!(humidity_coefficient(85.0), 1.1);
    }

    #[test]
    fn test_climate_factor_warm_and_humid() {
        let climate = climate_factor(28.0, 85.0);
        assert!(climate.factor > 0.9);
        assert_eq!(climate.classification, RiskClassification::Medium);
        assert!(climate.multiplier >= 1.5);
    }

    #[test]
    fn test_climate_factor_peak_band_is_high() {
        // 1.2 * 1.1 = 1.32
        let climate = climate_factor(32.0, 90.0);
        assert_eq!(climate.classification, RiskClassification::High);
        assert_eq!(climate.multiplier, 2.5);
    }

    #[test]
    fn test_climate_factor_cold_and_dry() {
        let climate = climate_factor(5.0, 20.0);
        assert_eq!(climate.classification, RiskClassification::Low);
        assert_eq!(climate.multiplier, 1.0);
        assert!(climate.message_pt.contains("controladas"));
    }

    #[test]
    fn test_climate_factor_nan_inputs() {
        let climate = climate_factor(f64::NAN, f64::NAN);
        assert!(climate.factor.is_finite());
        assert_eq!(climate.multiplier, 1.0);
    }

    #[test]
    fn test_history_multiplier_ladder() {
        assert_eq!(history_multiplier(&[]), 1.0);
        assert_eq!(history_multiplier(&[85.0]), 2.0);
        assert_eq!(history_multiplier(&[60.0, 60.0]), 1.7);
        assert_eq!(history_multiplier(&[40.0]), 1.4);
        assert_eq!(history_multiplier(&[20.0]), 1.2);
        assert_eq!(history_multiplier(&[15.0]), 1.0);
    }

    #[test]
    fn test_history_multiplier_uses_arithmetic_mean() {
        // mean 67.3 sits in the >50 band
        assert_eq!(history_multiplier(&[85.0, 72.0, 45.0]), 1.7);
        assert_eq!(history_multiplier(&[85.0, 72.0, 65.0]), 2.0);
    }

    #[test]
    fn test_recency_multiplier() {
        let today = day("2024-03-31");
        assert_eq!(recency_multiplier(&[], today), 1.0);

        let days = [day("2024-03-30"), day("2024-03-15"), day("2024-01-01")];
        assert!((recency_multiplier(&days, today) - 1.06).abs() < 1e-9);

        // duplicates and future days do not count
        let days = [day("2024-03-30"), day("2024-03-30"), day("2024-04-02")];
        assert!((recency_multiplier(&days, today) - 1.03).abs() < 1e-9);
    }

    #[test]
    fn test_recency_multiplier_full_window() {
        let today = day("2024-03-31");
        let days: Vec<NaiveDate> = (0..60)
            .map(|offset| today - chrono::Duration::days(offset))
            .collect();
        let multiplier = recency_multiplier(&days, today);
        // 31 days fall inside the window (today included)
        assert!((multiplier - 1.93).abs() < 1e-9);
        assert!(multiplier <= MAX_HISTORY_MULTIPLIER);
    }

    #[test]
    fn test_aggregate_risk() {
        assert_eq!(aggregate_risk(&[], 3.5), RiskScore::ZERO);
        assert_eq!(aggregate_risk(&[80.0, 80.0], 1.5), RiskScore::MAX);
        assert_eq!(aggregate_risk(&[20.0, 40.0], 1.0).value(), 30);
        assert_eq!(aggregate_risk(&[20.0, 40.0], f64::NAN), RiskScore::ZERO);
        assert_eq!(aggregate_risk(&[20.0, 40.0], -2.0), RiskScore::ZERO);
    }

    #[test]
    fn test_import_risk_strategies() {
        assert_eq!(import_risk(40.0, 80.0, BlendStrategy::Mean).value(), 60);
        assert_eq!(
            import_risk(40.0, 80.0, BlendStrategy::Weighted(DEFAULT_IMPORT_WEIGHT)).value(),
            52
        );
        assert_eq!(
            import_risk(95.0, 100.0, BlendStrategy::Weighted(1.0)),
            RiskScore::MAX
        );
        assert_eq!(BlendStrategy::default(), BlendStrategy::Mean);
    }
}
