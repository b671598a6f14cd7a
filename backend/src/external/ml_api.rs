//! External ML prediction service client
//!
//! Talks to the model server's `POST {base}/predict` endpoint. Any failure
//! is reported as an error so the caller can fall through to the next tier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{clamp_yield, round_one_decimal, ModelAccuracy, PredictionEstimate, PredictionQuery};

use crate::error::{AppError, AppResult};
use crate::services::prediction::ExternalPredictor;

/// Client for the ML prediction microservice
#[derive(Clone)]
pub struct MlApiClient {
    http_client: Client,
    base_url: String,
}

/// Request body sent to the model server
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    crop: &'a str,
    soil_type: &'a str,
    region: &'a str,
    season: &'a str,
    rainfall: f64,
    temperature: f64,
    humidity: f64,
}

/// Response from the model server
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub predicted_yield: f64,
    pub confidence: f64,
    pub model_accuracy: AccuracyResponse,
}

#[derive(Debug, Deserialize)]
pub struct AccuracyResponse {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
}

impl MlApiClient {
    /// Create a client with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build ML client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a prediction from the model server
    pub async fn request_prediction(&self, query: &PredictionQuery) -> AppResult<PredictionEstimate> {
        let url = format!("{}/predict", self.base_url);
        let body = PredictRequest {
            crop: &query.crop,
            soil_type: &query.soil_type,
            region: &query.region,
            season: &query.season,
            rainfall: query.rainfall,
            temperature: query.temperature,
            humidity: query.humidity,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::MlService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MlService(format!("{} - {}", status, body)));
        }

        let data: PredictResponse = response
            .json()
            .await
            .map_err(|e| AppError::MlService(format!("Failed to parse response: {}", e)))?;

        into_estimate(data)
    }
}

/// Validate a model server response and bring it into the public ranges
pub fn into_estimate(data: PredictResponse) -> AppResult<PredictionEstimate> {
    let PredictResponse {
        predicted_yield,
        confidence,
        model_accuracy,
    } = data;

    let all_finite = [
        predicted_yield,
        confidence,
        model_accuracy.r2_score,
        model_accuracy.mae,
        model_accuracy.rmse,
    ]
    .iter()
    .all(|v| v.is_finite());

    if !all_finite || predicted_yield <= 0.0 {
        return Err(AppError::MlService("Malformed prediction payload".to_string()));
    }

    Ok(PredictionEstimate {
        predicted_yield: clamp_yield(predicted_yield),
        confidence: round_one_decimal(confidence.clamp(0.0, 100.0)),
        model_accuracy: ModelAccuracy {
            r2_score: model_accuracy.r2_score.clamp(0.0, 1.0),
            mae: model_accuracy.mae.max(0.0),
            rmse: model_accuracy.rmse.max(0.0),
        },
        local_data_used: false,
        similar_records_count: 0,
    })
}

#[async_trait]
impl ExternalPredictor for MlApiClient {
    async fn predict(&self, query: &PredictionQuery) -> AppResult<PredictionEstimate> {
        self.request_prediction(query).await
    }
}
