//! Prediction pipeline property-based tests
//!
//! Covers:
//! - Scoring determinism and non-negativity
//! - Threshold pool membership
//! - Weighted average of identical yields
//! - Yield clamping and confidence bounds
//! - Tons/ha unit correction

use proptest::prelude::*;
use shared::prediction::{
    confidence, ensemble, local_estimate, score, score_candidates, PredictorParams, ScoredRecord,
};
use shared::{HistoricalRecord, PredictionQuery, MAX_PLAUSIBLE_YIELD, MIN_PLAUSIBLE_YIELD};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn crop_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["wheat", "Rice", "paddy", "corn", "Maize", "cotton(lint)", "gram", "quinoa"])
        .prop_map(str::to_string)
}

fn season_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["kharif", "Rabi", "winter", "Summer", "autumn", "Whole Year", "zaid", "unknown"])
        .prop_map(str::to_string)
}

fn location_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::sample::select(vec!["Punjab", "PUNJAB", "Bihar", "Kerala", "Ludhiana", "Patna"])
            .prop_map(str::to_string),
    )
}

fn region_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["north-india", "south-india", "east-india"]).prop_map(str::to_string)
}

fn record_strategy() -> impl Strategy<Value = HistoricalRecord> {
    (
        crop_strategy(),
        location_strategy(),
        location_strategy(),
        prop::option::of(region_strategy()),
        prop::option::of(season_strategy()),
        prop::option::of(0.0..3000.0f64),
        1.0..120_000.0f64,
    )
        .prop_map(|(crop, state, district, region, season, rainfall, yield_kg_per_ha)| {
            HistoricalRecord {
                crop,
                state,
                district,
                region,
                season,
                rainfall,
                yield_kg_per_ha,
                ..Default::default()
            }
        })
}

fn query_strategy() -> impl Strategy<Value = PredictionQuery> {
    (
        crop_strategy(),
        region_strategy(),
        location_strategy(),
        location_strategy(),
        season_strategy(),
        0.0..3000.0f64,
        -5.0..50.0f64,
        0.0..100.0f64,
    )
        .prop_map(
            |(crop, region, state, district, season, rainfall, temperature, humidity)| {
                PredictionQuery {
                    crop,
                    soil_type: "loamy".to_string(),
                    region,
                    state,
                    district,
                    season,
                    rainfall,
                    temperature,
                    humidity,
                }
            },
        )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Scoring is a pure function and never negative
    #[test]
    fn prop_score_deterministic(record in record_strategy(), query in query_strategy()) {
        let first = score(&record, &query);
        let second = score(&record, &query);
        prop_assert_eq!(first, second);
        prop_assert!(first >= 0.0);
    }

    /// Records at or above the threshold form the pool whenever any exist
    #[test]
    fn prop_threshold_pool_is_subset(
        records in prop::collection::vec(record_strategy(), 0..40),
        query in query_strategy(),
    ) {
        let params = PredictorParams::default();
        let scored = score_candidates(&records, &query);
        let pool = ensemble::candidate_pool(&scored, &params);

        prop_assert!(pool.len() <= scored.len());
        let qualifying = scored.iter().filter(|s| s.score >= params.min_score).count();
        if qualifying > 0 {
            prop_assert_eq!(pool.len(), qualifying);
            prop_assert!(pool.iter().all(|s| s.score >= params.min_score));
        } else {
            prop_assert_eq!(pool.len(), scored.len().min(params.fallback_pool_size));
        }
        prop_assert!(pool.windows(2).all(|w| w[0].score >= w[1].score));
    }

    /// Identical yields average to exactly that yield whatever the scores
    #[test]
    fn prop_identical_yields_average_exactly(
        yield_value in 100.0..80_000.0f64,
        scores in prop::collection::vec(0.0..100.0f64, 1..10),
    ) {
        let records: Vec<HistoricalRecord> = scores
            .iter()
            .map(|_| HistoricalRecord {
                crop: "wheat".to_string(),
                yield_kg_per_ha: yield_value,
                ..Default::default()
            })
            .collect();
        let top: Vec<ScoredRecord> = records
            .iter()
            .zip(&scores)
            .map(|(record, score)| ScoredRecord { record, score: *score })
            .collect();

        let weighted = ensemble::weighted_yield(&top).unwrap();
        prop_assert!((weighted - yield_value).abs() <= yield_value * 1e-12);
    }

    /// Final yields always land in the plausible range
    #[test]
    fn prop_yield_clamped(
        records in prop::collection::vec(record_strategy(), 0..30),
        query in query_strategy(),
    ) {
        if let Some(est) = local_estimate(&records, &query, &PredictorParams::default()) {
            prop_assert!(est.predicted_yield >= MIN_PLAUSIBLE_YIELD as i64);
            prop_assert!(est.predicted_yield <= MAX_PLAUSIBLE_YIELD as i64);
            prop_assert!(est.confidence >= 0.0 && est.confidence <= confidence::MAX_CONFIDENCE);
            prop_assert!(est.model_accuracy.r2_score >= 0.0 && est.model_accuracy.r2_score <= 1.0);
            prop_assert!(est.model_accuracy.mae >= 0.0);
            prop_assert!(est.model_accuracy.rmse >= 0.0);
        }
    }

    /// Tons/ha histories are scaled to kg/ha before clamping
    #[test]
    fn prop_tons_scaled(yields in prop::collection::vec(1.0..9.0f64, 1..10)) {
        let records: Vec<HistoricalRecord> = yields
            .iter()
            .map(|y| HistoricalRecord {
                crop: "quinoa".to_string(),
                season: Some("rabi".to_string()),
                yield_kg_per_ha: *y,
                ..Default::default()
            })
            .collect();
        let query = PredictionQuery {
            crop: "quinoa".to_string(),
            soil_type: "sandy".to_string(),
            region: "north-india".to_string(),
            state: None,
            district: None,
            season: "rabi".to_string(),
            rainfall: 150.0,
            temperature: 20.0,
            humidity: 50.0,
        };

        let est = local_estimate(&records, &query, &PredictorParams::default()).unwrap();
        let mean = yields.iter().sum::<f64>() / yields.len() as f64;
        prop_assert!((est.predicted_yield as f64 - mean * 1000.0).abs() <= 1.0);
    }
}

#[test]
fn test_pool_non_empty_with_state_match() {
    let records = vec![HistoricalRecord {
        crop: "rice".to_string(),
        state: Some("kerala".to_string()),
        yield_kg_per_ha: 2800.0,
        ..Default::default()
    }];
    let query = PredictionQuery {
        crop: "Paddy".to_string(),
        soil_type: "clay".to_string(),
        region: "south-india".to_string(),
        state: Some("Kerala".to_string()),
        district: None,
        season: "kharif".to_string(),
        rainfall: 150.0,
        temperature: 28.0,
        humidity: 65.0,
    };
    let scored = score_candidates(&records, &query);
    let params = PredictorParams::default();
    let qualifying: Vec<_> = scored.iter().filter(|s| s.score >= params.min_score).collect();
    assert_eq!(qualifying.len(), 1);
}
