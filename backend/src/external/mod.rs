//! External API integrations

pub mod analysis;
pub mod tick_detection;
pub mod weather;

pub use analysis::{AnalysisEngine, AnalysisProvider, AnalysisRequest};
pub use tick_detection::TickDetectionClient;
pub use weather::{ClimateSource, WeatherClient};
