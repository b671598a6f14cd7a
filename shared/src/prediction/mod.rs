//! Local-area weighted yield prediction
//!
//! Pipeline: crop candidate filter -> similarity scoring -> weighted
//! ensemble -> confidence estimation. The heuristic tier lives here too
//! because it is pure; orchestration with the external ML tier happens in
//! the backend.

pub mod confidence;
pub mod ensemble;
pub mod heuristic;
pub mod normalize;
pub mod params;
pub mod similarity;

pub use confidence::ConfidenceEstimate;
pub use ensemble::Ensemble;
pub use params::PredictorParams;
pub use similarity::{score, score_candidates, ScoredRecord};

use crate::models::{HistoricalRecord, PredictionEstimate, PredictionQuery};

/// Predict from historical records alone.
///
/// Returns `None` when no record matches the query crop, which is the
/// signal to try the next tier.
pub fn local_estimate(
    records: &[HistoricalRecord],
    query: &PredictionQuery,
    params: &PredictorParams,
) -> Option<PredictionEstimate> {
    let scored = score_candidates(records, query);
    let ensemble = ensemble::predict(&scored, query, params)?;
    let ConfidenceEstimate {
        confidence,
        accuracy,
    } = confidence::estimate(&ensemble.top, ensemble.qualified_count, params);

    Some(PredictionEstimate {
        predicted_yield: ensemble.predicted_yield,
        confidence,
        model_accuracy: accuracy,
        local_data_used: true,
        similar_records_count: ensemble.pool_size,
    })
}
