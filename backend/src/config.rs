//! Configuration management for the TickWatch platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TICKWATCH__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{BlendStrategy, DEFAULT_IMPORT_WEIGHT};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Infestation analysis provider configuration
    pub analysis: AnalysisConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Risk scoring policy
    pub risk: RiskConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// Which analysis provider produces infestation samples
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisProviderKind {
    Simulated,
    Remote,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub provider: AnalysisProviderKind,

    /// Tick detection API endpoint (remote provider)
    #[serde(default)]
    pub endpoint: String,

    /// Tick detection API key (remote provider)
    #[serde(default)]
    pub api_key: String,

    /// Seed for the simulated provider; random when absent
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key; readings are simulated when empty
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RiskConfig {
    /// "mean" or "weighted"
    pub import_blend: String,

    /// Weight used by the weighted import blend
    pub import_weight: f64,
}

impl RiskConfig {
    pub fn blend_strategy(&self) -> BlendStrategy {
        match self.import_blend.as_str() {
            "weighted" => BlendStrategy::Weighted(self.import_weight),
            _ => BlendStrategy::Mean,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("TICKWATCH_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("analysis.provider", "simulated")?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("risk.import_blend", "mean")?
            .set_default("risk.import_weight", DEFAULT_IMPORT_WEIGHT)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TICKWATCH_ prefix)
            .add_source(
                Environment::with_prefix("TICKWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_strategy_from_config() {
        let mut risk = RiskConfig {
            import_blend: "mean".to_string(),
            import_weight: 0.15,
        };
        assert_eq!(risk.blend_strategy(), BlendStrategy::Mean);

        risk.import_blend = "weighted".to_string();
        assert_eq!(risk.blend_strategy(), BlendStrategy::Weighted(0.15));

        risk.import_blend = "unknown".to_string();
        assert_eq!(risk.blend_strategy(), BlendStrategy::Mean);
    }
}
