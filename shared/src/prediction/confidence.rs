//! Confidence and accuracy indicators for local predictions
//!
//! The accuracy figures describe the spread of the retrieved comparison
//! records, not the error of a validated model. They are kept in this form
//! because they are shown to users as-is.

use crate::models::{round_one_decimal, ModelAccuracy};

use super::params::PredictorParams;
use super::similarity::ScoredRecord;

/// Local confidence never claims more than this
pub const MAX_CONFIDENCE: f64 = 95.0;

const QUALITY_WEIGHT: f64 = 0.6;
const EVIDENCE_WEIGHT: f64 = 40.0;

const R2_FLOOR: f64 = 0.80;
const R2_CEILING: f64 = 0.96;
const MAE_FLOOR: f64 = 50.0;
const RMSE_FLOOR: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceEstimate {
    pub confidence: f64,
    pub accuracy: ModelAccuracy,
}

/// Confidence from match quality and corroborating record count
pub fn confidence(top: &[ScoredRecord<'_>], qualified_count: usize, params: &PredictorParams) -> f64 {
    let mean_score = mean(top.iter().map(|s| s.score)).unwrap_or(0.0);
    let data_quality = if params.max_plausible_score > 0.0 {
        (mean_score / params.max_plausible_score * 100.0).min(100.0)
    } else {
        0.0
    };

    let record_factor = if params.confidence_record_target > 0 {
        (qualified_count as f64 / params.confidence_record_target as f64).min(1.0)
    } else {
        1.0
    };

    let raw = data_quality * QUALITY_WEIGHT + record_factor * EVIDENCE_WEIGHT;
    round_one_decimal(raw.clamp(0.0, MAX_CONFIDENCE))
}

/// Synthetic accuracy metrics from the dispersion of top-record yields
pub fn accuracy(top: &[ScoredRecord<'_>]) -> ModelAccuracy {
    let yields: Vec<f64> = top.iter().map(|s| s.record.yield_kg_per_ha).collect();
    let mean_yield = mean(yields.iter().copied()).unwrap_or(0.0);
    let std_dev = std_dev(&yields, mean_yield);

    ModelAccuracy {
        r2_score: (1.0 - std_dev / (mean_yield + 1.0)).clamp(R2_FLOOR, R2_CEILING),
        mae: MAE_FLOOR.max(std_dev * 0.6),
        rmse: RMSE_FLOOR.max(std_dev * 0.8),
    }
}

pub fn estimate(
    top: &[ScoredRecord<'_>],
    qualified_count: usize,
    params: &PredictorParams,
) -> ConfidenceEstimate {
    ConfidenceEstimate {
        confidence: confidence(top, qualified_count, params),
        accuracy: accuracy(top),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Population standard deviation
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoricalRecord;

    fn records(yields: &[f64]) -> Vec<HistoricalRecord> {
        yields
            .iter()
            .map(|y| HistoricalRecord {
                crop: "wheat".to_string(),
                yield_kg_per_ha: *y,
                ..Default::default()
            })
            .collect()
    }

    fn scored<'a>(records: &'a [HistoricalRecord], score: f64) -> Vec<ScoredRecord<'a>> {
        records.iter().map(|record| ScoredRecord { record, score }).collect()
    }

    #[test]
    fn test_confidence_formula() {
        let recs = records(&[4500.0, 4700.0, 4900.0]);
        let top = scored(&recs, 40.0);
        // quality 50 * 0.6 + (3 / 50) * 40
        assert_eq!(confidence(&top, 3, &PredictorParams::default()), 32.4);
    }

    #[test]
    fn test_confidence_capped() {
        let recs = records(&[4500.0; 10]);
        let top = scored(&recs, 100.0);
        assert_eq!(confidence(&top, 500, &PredictorParams::default()), MAX_CONFIDENCE);
    }

    #[test]
    fn test_accuracy_floors_for_tight_cluster() {
        let recs = records(&[4700.0, 4700.0]);
        let acc = accuracy(&scored(&recs, 50.0));
        assert_eq!(acc.r2_score, R2_CEILING);
        assert_eq!(acc.mae, MAE_FLOOR);
        assert_eq!(acc.rmse, RMSE_FLOOR);
    }

    #[test]
    fn test_accuracy_wide_spread() {
        let recs = records(&[1000.0, 5000.0]);
        let acc = accuracy(&scored(&recs, 50.0));
        // std dev 2000, mean 3000
        assert_eq!(acc.r2_score, R2_FLOOR);
        assert!((acc.mae - 1200.0).abs() < 1e-9);
        assert!((acc.rmse - 1600.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_top() {
        let est = estimate(&[], 0, &PredictorParams::default());
        assert_eq!(est.confidence, 0.0);
        assert_eq!(est.accuracy.r2_score, R2_CEILING);
    }
}
