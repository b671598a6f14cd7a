//! Yield prediction request and result models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rainfall assumed when the caller omits it (mm)
pub const DEFAULT_RAINFALL_MM: f64 = 150.0;
/// Temperature assumed when the caller omits it (°C)
pub const DEFAULT_TEMPERATURE_C: f64 = 28.0;
/// Humidity assumed when the caller omits it (%)
pub const DEFAULT_HUMIDITY_PERCENT: f64 = 65.0;

/// Lowest yield ever reported to a caller (kg/ha)
pub const MIN_PLAUSIBLE_YIELD: f64 = 100.0;
/// Highest yield ever reported to a caller (kg/ha)
pub const MAX_PLAUSIBLE_YIELD: f64 = 80_000.0;

/// Farm conditions for a single prediction request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionQuery {
    pub crop: String,
    pub soil_type: String,
    pub region: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub season: String,
    /// Rainfall in mm
    pub rainfall: f64,
    /// Temperature in °C
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
}

/// Accuracy indicators reported alongside a prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelAccuracy {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
}

/// Output of the prediction pipeline, independent of which tier produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionEstimate {
    /// Predicted yield in kg/ha
    pub predicted_yield: i64,
    /// Confidence percentage with one decimal
    pub confidence: f64,
    pub model_accuracy: ModelAccuracy,
    pub local_data_used: bool,
    pub similar_records_count: usize,
}

/// Persisted prediction as returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub id: Uuid,
    pub predicted_yield: i64,
    pub confidence: f64,
    pub model_accuracy: ModelAccuracy,
    pub local_data_used: bool,
    pub similar_records_count: usize,
    pub crop: String,
    pub created_at: DateTime<Utc>,
}

/// Clamp any yield figure into the plausible agronomic range and round it.
///
/// Positive infinity maps to the maximum; NaN and negative infinity to the
/// minimum.
pub fn clamp_yield(yield_kg_per_ha: f64) -> i64 {
    if yield_kg_per_ha.is_nan() {
        return MIN_PLAUSIBLE_YIELD as i64;
    }
    yield_kg_per_ha
        .clamp(MIN_PLAUSIBLE_YIELD, MAX_PLAUSIBLE_YIELD)
        .round() as i64
}

/// Round to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
