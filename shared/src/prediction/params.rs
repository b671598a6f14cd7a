//! Tuning constants for the local prediction pipeline

use serde::{Deserialize, Serialize};

/// Thresholds and cut-offs used by the ensemble and confidence estimator.
///
/// Loaded from the `predictor` configuration section so they can be tuned
/// without a rebuild.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictorParams {
    /// Minimum similarity score for a record to qualify
    pub min_score: f64,
    /// Number of top records averaged by the ensemble
    pub ensemble_size: usize,
    /// Pool size used when no record reaches `min_score`
    pub fallback_pool_size: usize,
    /// Qualifying record count at which the evidence term saturates
    pub confidence_record_target: usize,
    /// Score normalizer for the data quality term
    pub max_plausible_score: f64,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            min_score: 15.0,
            ensemble_size: 10,
            fallback_pool_size: 20,
            confidence_record_target: 50,
            max_plausible_score: 80.0,
        }
    }
}
