//! Weather API client for fetching climate readings
//!
//! Integrates with OpenWeatherMap for current conditions. When no API key is
//! configured, readings come from a simulated source instead.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::ClimateReading;

use crate::error::{AppError, AppResult};

/// Metres per second to kilometres per hour
const MPS_TO_KMH: f64 = 3.6;

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    weather: Vec<OWMWeather>,
    main: OWMMain,
    wind: OWMWind,
    rain: Option<OWMRain>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Fetch current conditions by GPS coordinates
    pub async fn get_current_climate(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<ClimateReading> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, latitude, longitude, self.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Weather API request failed: {}", e);
            AppError::WeatherServiceUnavailable
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        let data: OWMCurrentResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse weather response: {}", e))
        })?;

        Ok(convert_current_response(data))
    }
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> ClimateReading {
    ClimateReading {
        temperature_c: data.main.temp,
        humidity_pct: data.main.humidity,
        condition: data
            .weather
            .first()
            .map(|w| w.main.clone())
            .unwrap_or_default(),
        wind_kmh: data.wind.speed * MPS_TO_KMH,
        rain_1h_mm: data.rain.and_then(|r| r.one_hour),
        recorded_at: DateTime::from_timestamp(data.dt, 0).unwrap_or_else(Utc::now),
        source: "openweathermap".to_string(),
    }
}

/// Simulated readings in the warm, humid ranges typical of the pasture season
pub struct SimulatedClimate {
    rng: Mutex<StdRng>,
}

const SIMULATED_CONDITIONS: &[&str] = &["Clear", "Partly Cloudy", "Clouds", "Light Rain"];

impl SimulatedClimate {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn reading(&self) -> AppResult<ClimateReading> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("Simulated climate RNG poisoned".to_string()))?;

        let condition = SIMULATED_CONDITIONS
            .choose(&mut *rng)
            .copied()
            .unwrap_or("Clear");
        let rain_1h_mm = (condition == "Light Rain").then(|| rng.gen_range(0.5..4.0));

        Ok(ClimateReading {
            temperature_c: f64::from(rng.gen_range(25..35)),
            humidity_pct: f64::from(rng.gen_range(60..90)),
            condition: condition.to_string(),
            wind_kmh: f64::from(rng.gen_range(5..20)),
            rain_1h_mm,
            recorded_at: Utc::now(),
            source: "simulated".to_string(),
        })
    }
}

/// Where current climate readings come from
pub enum ClimateSource {
    Live(WeatherClient),
    Simulated(SimulatedClimate),
}

impl ClimateSource {
    /// Live readings when an API key is configured, simulated otherwise
    pub fn from_config(config: &crate::config::WeatherConfig) -> Self {
        if config.api_key.is_empty() {
            tracing::warn!("No weather API key configured, climate readings are simulated");
            ClimateSource::Simulated(SimulatedClimate::new(None))
        } else {
            ClimateSource::Live(WeatherClient::new(
                config.api_key.clone(),
                config.api_endpoint.clone(),
            ))
        }
    }

    pub async fn current(&self, latitude: Decimal, longitude: Decimal) -> AppResult<ClimateReading> {
        match self {
            ClimateSource::Live(client) => client.get_current_climate(latitude, longitude).await,
            ClimateSource::Simulated(simulated) => simulated.reading(),
        }
    }
}
