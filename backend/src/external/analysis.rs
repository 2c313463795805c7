//! Infestation analysis providers
//!
//! An [`AnalysisProvider`] turns the photos of one animal into tick counts.
//! The simulated provider stands in until a trained model is deployed behind
//! the remote tick detection endpoint; scoring does not depend on which one
//! is configured.

use std::future::Future;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use shared::{Shift, TickCounts};
use uuid::Uuid;

use crate::config::{AnalysisConfig, AnalysisProviderKind};
use crate::error::{AppError, AppResult};
use crate::external::tick_detection::TickDetectionClient;

/// Photos of one animal submitted for analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub farm_id: Uuid,
    pub animal_id: Uuid,
    pub shift: Shift,
    pub image_urls: Vec<String>,
}

/// Capability that estimates tick load from imagery
pub trait AnalysisProvider: Send + Sync {
    /// Recorded on every sample the provider produces
    fn name(&self) -> &'static str;

    fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = AppResult<TickCounts>> + Send;
}

/// Random tick counts in the ranges observed during field trials
pub struct SimulatedAnalysisProvider {
    rng: Mutex<StdRng>,
}

impl SimulatedAnalysisProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn sample(&self) -> AppResult<TickCounts> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("Simulated analysis RNG poisoned".to_string()))?;

        Ok(TickCounts {
            larvae: rng.gen_range(10..40),
            nymphs: rng.gen_range(5..25),
            adults: rng.gen_range(10..50),
        })
    }
}

impl AnalysisProvider for SimulatedAnalysisProvider {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<TickCounts> {
        let counts = self.sample()?;
        tracing::debug!(
            "Simulated analysis for animal {} ({} photos): {:?}",
            request.animal_id,
            request.image_urls.len(),
            counts
        );
        Ok(counts)
    }
}

/// Provider selected at start-up
pub enum AnalysisEngine {
    Simulated(SimulatedAnalysisProvider),
    Remote(TickDetectionClient),
}

impl AnalysisEngine {
    pub fn from_config(config: &AnalysisConfig) -> AppResult<Self> {
        match config.provider {
            AnalysisProviderKind::Simulated => Ok(AnalysisEngine::Simulated(
                SimulatedAnalysisProvider::new(config.seed),
            )),
            AnalysisProviderKind::Remote => {
                if config.endpoint.is_empty() || config.api_key.is_empty() {
                    return Err(AppError::Configuration(
                        "analysis.endpoint and analysis.api_key are required for the remote provider"
                            .to_string(),
                    ));
                }
                Ok(AnalysisEngine::Remote(TickDetectionClient::new(
                    config.endpoint.clone(),
                    config.api_key.clone(),
                )?))
            }
        }
    }
}

impl AnalysisProvider for AnalysisEngine {
    fn name(&self) -> &'static str {
        match self {
            AnalysisEngine::Simulated(provider) => provider.name(),
            AnalysisEngine::Remote(client) => client.name(),
        }
    }

    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<TickCounts> {
        match self {
            AnalysisEngine::Simulated(provider) => provider.analyze(request).await,
            AnalysisEngine::Remote(client) => client.analyze(request).await,
        }
    }
}
