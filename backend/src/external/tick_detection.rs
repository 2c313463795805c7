//! Tick Detection Client
//!
//! Client for the hosted tick detection model.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{Shift, TickCounts};

use super::analysis::{AnalysisProvider, AnalysisRequest};
use crate::error::{AppError, AppResult};

/// Client for the tick detection microservice
#[derive(Clone)]
pub struct TickDetectionClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Request to detect ticks in a set of photos
#[derive(Debug, Serialize)]
pub struct DetectTicksRequest<'a> {
    pub farm_id: String,
    pub animal_id: String,
    pub shift: Shift,
    pub image_urls: &'a [String],
}

/// Response from the tick detection API
#[derive(Debug, Deserialize)]
pub struct DetectTicksResponse {
    pub request_id: String,
    pub detection: TickDetectionResult,
}

/// Detection result from the API
#[derive(Debug, Deserialize)]
pub struct TickDetectionResult {
    pub larvae: i32,
    pub nymphs: i32,
    pub adults: i32,
    pub confidence_score: f32,
    pub processing_time_ms: i32,
}

impl From<TickDetectionResult> for TickCounts {
    fn from(r: TickDetectionResult) -> Self {
        TickCounts::bounded(r.larvae, r.nymphs, r.adults)
    }
}

impl TickDetectionClient {
    /// Create a new tick detection client
    pub fn new(api_endpoint: String, api_key: String) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_endpoint,
            api_key,
            http_client,
        })
    }

    /// Send photos for tick detection
    pub async fn detect_ticks(
        &self,
        request: &DetectTicksRequest<'_>,
    ) -> AppResult<DetectTicksResponse> {
        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::AnalysisProviderError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::AnalysisProviderError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: DetectTicksResponse = response.json().await.map_err(|e| {
            AppError::AnalysisProviderError(format!("Failed to parse response: {}", e))
        })?;

        Ok(result)
    }
}

impl AnalysisProvider for TickDetectionClient {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<TickCounts> {
        let response = self
            .detect_ticks(&DetectTicksRequest {
                farm_id: request.farm_id.to_string(),
                animal_id: request.animal_id.to_string(),
                shift: request.shift,
                image_urls: &request.image_urls,
            })
            .await?;

        tracing::info!(
            "Tick detection {} for animal {}: confidence {:.2}, {} ms",
            response.request_id,
            request.animal_id,
            response.detection.confidence_score,
            response.detection.processing_time_ms
        );

        Ok(response.detection.into())
    }
}
