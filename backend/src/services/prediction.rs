//! Yield prediction service
//!
//! The engine walks the prediction tiers in order (local history, external
//! ML service, agronomic heuristic) and always produces an estimate. The
//! service persists the result against the requesting user.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::prediction::{heuristic, local_estimate, PredictorParams};
use shared::validation::{coerce_measurement, validate_required};
use shared::{
    HistoricalRecord, ModelAccuracy, PaginatedResponse, Pagination, PaginationMeta,
    PredictionEstimate, PredictionQuery, PredictionSummary, DEFAULT_HUMIDITY_PERCENT,
    DEFAULT_RAINFALL_MM, DEFAULT_TEMPERATURE_C,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult};

// ============================================================================
// Tier Seams
// ============================================================================

/// Source of historical yield observations
#[async_trait]
pub trait HistoricalRecordStore: Send + Sync {
    /// Records that may match `crop`. Extra rows are fine; the crop filter
    /// runs again in memory.
    async fn fetch_records(&self, crop: &str) -> AppResult<Vec<HistoricalRecord>>;
}

/// Remote model that can produce a prediction
#[async_trait]
pub trait ExternalPredictor: Send + Sync {
    async fn predict(&self, query: &PredictionQuery) -> AppResult<PredictionEstimate>;
}

// ============================================================================
// Engine
// ============================================================================

/// Which tier produced a prediction
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Local(PredictionEstimate),
    External(PredictionEstimate),
    Heuristic(PredictionEstimate),
}

impl PredictionOutcome {
    pub fn tier(&self) -> &'static str {
        match self {
            PredictionOutcome::Local(_) => "local",
            PredictionOutcome::External(_) => "external",
            PredictionOutcome::Heuristic(_) => "heuristic",
        }
    }

    pub fn estimate(&self) -> &PredictionEstimate {
        match self {
            PredictionOutcome::Local(e)
            | PredictionOutcome::External(e)
            | PredictionOutcome::Heuristic(e) => e,
        }
    }
}

/// Fallback chain over the three prediction tiers
#[derive(Clone)]
pub struct PredictionEngine {
    store: Arc<dyn HistoricalRecordStore>,
    external: Option<Arc<dyn ExternalPredictor>>,
    params: PredictorParams,
}

impl PredictionEngine {
    pub fn new(
        store: Arc<dyn HistoricalRecordStore>,
        external: Option<Arc<dyn ExternalPredictor>>,
        params: PredictorParams,
    ) -> Self {
        Self {
            store,
            external,
            params,
        }
    }

    /// Predict the yield for `query`. Never fails: every tier failure falls
    /// through to the next one and the heuristic always answers.
    pub async fn predict(&self, query: &PredictionQuery) -> PredictionOutcome {
        if let Some(estimate) = self.local_tier(query).await {
            tracing::info!(
                crop = %query.crop,
                similar_records = estimate.similar_records_count,
                "Prediction from local history"
            );
            return PredictionOutcome::Local(estimate);
        }

        if let Some(estimate) = self.external_tier(query).await {
            tracing::info!(crop = %query.crop, "Prediction from ML service");
            return PredictionOutcome::External(estimate);
        }

        tracing::info!(crop = %query.crop, "Prediction from heuristic model");
        PredictionOutcome::Heuristic(heuristic::estimate(query, &mut rand::thread_rng()))
    }

    async fn local_tier(&self, query: &PredictionQuery) -> Option<PredictionEstimate> {
        let records = match self.store.fetch_records(&query.crop).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Historical data unavailable, continuing without it: {}", e);
                Vec::new()
            }
        };

        tracing::debug!(crop = %query.crop, fetched = records.len(), "Loaded historical records");
        local_estimate(&records, query, &self.params)
    }

    async fn external_tier(&self, query: &PredictionQuery) -> Option<PredictionEstimate> {
        let external = self.external.as_ref()?;
        match external.predict(query).await {
            Ok(estimate) => Some(estimate),
            Err(e) => {
                tracing::warn!("ML service prediction failed, using heuristic: {}", e);
                None
            }
        }
    }
}

// ============================================================================
// Request Input
// ============================================================================

/// Prediction request body. Measurements are loosely typed: numbers and
/// numeric strings are accepted and anything else takes the default.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreatePredictionInput {
    #[validate(length(max = 100))]
    pub crop: Option<String>,
    #[validate(length(max = 100))]
    pub soil_type: Option<String>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
    #[validate(length(max = 50))]
    pub season: Option<String>,
    pub rainfall: Option<serde_json::Value>,
    pub temperature: Option<serde_json::Value>,
    pub humidity: Option<serde_json::Value>,
}

impl CreatePredictionInput {
    /// Validate required fields and fill in measurement defaults
    pub fn into_query(self) -> AppResult<PredictionQuery> {
        self.validate().map_err(length_error)?;

        let crop = required("crop", self.crop.as_deref())?;
        let soil_type = required("soil_type", self.soil_type.as_deref())?;
        let region = required("region", self.region.as_deref())?;
        let season = required("season", self.season.as_deref())?;

        Ok(PredictionQuery {
            crop,
            soil_type,
            region,
            state: optional_text(self.state),
            district: optional_text(self.district),
            season,
            rainfall: coerce_measurement(self.rainfall.as_ref(), DEFAULT_RAINFALL_MM),
            temperature: coerce_measurement(self.temperature.as_ref(), DEFAULT_TEMPERATURE_C),
            humidity: coerce_measurement(self.humidity.as_ref(), DEFAULT_HUMIDITY_PERCENT),
        })
    }
}

fn required(field: &str, value: Option<&str>) -> AppResult<String> {
    validate_required(value)
        .map(str::to_string)
        .map_err(|e| AppError::Validation {
            field: field.to_string(),
            message: format!("{}: {}", field, e),
        })
}

fn length_error(errors: ValidationErrors) -> AppError {
    match errors.field_errors().keys().min() {
        Some(field) => AppError::Validation {
            field: field.to_string(),
            message: format!("{}: value is too long", field),
        },
        None => AppError::ValidationError(errors.to_string()),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Persistence
// ============================================================================

/// Stored prediction row
#[derive(Debug, Clone, sqlx::FromRow)]
struct PredictionRow {
    id: Uuid,
    crop: String,
    soil_type: String,
    region: String,
    state: Option<String>,
    district: Option<String>,
    season: String,
    rainfall: f64,
    temperature: f64,
    humidity: f64,
    predicted_yield: i64,
    confidence: f64,
    r2_score: f64,
    mae: f64,
    rmse: f64,
    local_data_used: bool,
    similar_records_count: i32,
    created_at: DateTime<Utc>,
}

/// One entry of a user's prediction history
#[derive(Debug, Clone, Serialize)]
pub struct PredictionHistoryEntry {
    pub id: Uuid,
    pub crop: String,
    pub soil_type: String,
    pub region: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub season: String,
    pub rainfall: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub predicted_yield: i64,
    pub confidence: f64,
    pub model_accuracy: ModelAccuracy,
    pub local_data_used: bool,
    pub similar_records_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<PredictionRow> for PredictionHistoryEntry {
    fn from(row: PredictionRow) -> Self {
        Self {
            id: row.id,
            crop: row.crop,
            soil_type: row.soil_type,
            region: row.region,
            state: row.state,
            district: row.district,
            season: row.season,
            rainfall: row.rainfall,
            temperature: row.temperature,
            humidity: row.humidity,
            predicted_yield: row.predicted_yield,
            confidence: row.confidence,
            model_accuracy: ModelAccuracy {
                r2_score: row.r2_score,
                mae: row.mae,
                rmse: row.rmse,
            },
            local_data_used: row.local_data_used,
            similar_records_count: row.similar_records_count.max(0) as usize,
            created_at: row.created_at,
        }
    }
}

/// Prediction persistence and history
#[derive(Clone)]
pub struct PredictionService {
    db: PgPool,
}

impl PredictionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Store a prediction for `user_id`. The database assigns id and timestamp.
    pub async fn save_prediction(
        &self,
        user_id: Uuid,
        query: &PredictionQuery,
        estimate: &PredictionEstimate,
    ) -> AppResult<PredictionSummary> {
        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO predictions (
                user_id, crop, soil_type, region, state, district, season,
                rainfall, temperature, humidity, predicted_yield, confidence,
                r2_score, mae, rmse, local_data_used, similar_records_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id, created_at
            "#,
        )
        .bind(user_id)
        .bind(&query.crop)
        .bind(&query.soil_type)
        .bind(&query.region)
        .bind(&query.state)
        .bind(&query.district)
        .bind(&query.season)
        .bind(query.rainfall)
        .bind(query.temperature)
        .bind(query.humidity)
        .bind(estimate.predicted_yield)
        .bind(estimate.confidence)
        .bind(estimate.model_accuracy.r2_score)
        .bind(estimate.model_accuracy.mae)
        .bind(estimate.model_accuracy.rmse)
        .bind(estimate.local_data_used)
        .bind(estimate.similar_records_count as i32)
        .fetch_one(&self.db)
        .await?;

        Ok(PredictionSummary {
            id,
            predicted_yield: estimate.predicted_yield,
            confidence: estimate.confidence,
            model_accuracy: estimate.model_accuracy,
            local_data_used: estimate.local_data_used,
            similar_records_count: estimate.similar_records_count,
            crop: query.crop.clone(),
            created_at,
        })
    }

    /// A user's predictions, newest first
    pub async fn list_predictions(
        &self,
        user_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<PredictionHistoryEntry>> {
        let (limit, offset) = pagination.limit_offset();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, PredictionRow>(
            r#"
            SELECT id, crop, soil_type, region, state, district, season,
                   rainfall, temperature, humidity, predicted_yield, confidence,
                   r2_score, mae, rmse, local_data_used, similar_records_count,
                   created_at
            FROM predictions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(PredictionHistoryEntry::from).collect(),
            pagination: PaginationMeta::new(pagination, total.max(0) as u64),
        })
    }
}
