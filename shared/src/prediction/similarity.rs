//! Similarity scoring of historical records against a prediction query
//!
//! Additive weighted feature matching. District outweighs state, which
//! outweighs the coarse region bucket; season dominates the rainfall delta.

use crate::models::{HistoricalRecord, PredictionQuery};

use super::normalize::{crops_match, CanonicalQuery, CanonicalRecord};

pub const DISTRICT_WEIGHT: f64 = 35.0;
pub const STATE_WEIGHT: f64 = 30.0;
pub const SEASON_WEIGHT: f64 = 20.0;
pub const REGION_WEIGHT: f64 = 10.0;
pub const RAINFALL_WEIGHT: f64 = 5.0;

/// Relative rainfall difference beyond which no credit is given
const RAINFALL_TOLERANCE: f64 = 0.5;

/// A historical record annotated with its similarity to one query
#[derive(Debug, Clone, Copy)]
pub struct ScoredRecord<'a> {
    pub record: &'a HistoricalRecord,
    pub score: f64,
}

/// Score one record against one query. Pure and non-negative.
pub fn score(record: &HistoricalRecord, query: &PredictionQuery) -> f64 {
    score_canonical(
        &CanonicalRecord::from_record(record),
        &CanonicalQuery::from_query(query),
    )
}

/// Score already-canonicalized values
pub fn score_canonical(record: &CanonicalRecord, query: &CanonicalQuery) -> f64 {
    let mut total = 0.0;

    if let (Some(rd), Some(qd)) = (&record.district, &query.district) {
        if rd == qd || rd.contains(qd.as_str()) || qd.contains(rd.as_str()) {
            total += DISTRICT_WEIGHT;
        }
    }

    if matches!((&record.state, &query.state), (Some(rs), Some(qs)) if rs == qs) {
        total += STATE_WEIGHT;
    }

    if matches!((record.season, query.season), (Some(rs), Some(qs)) if rs == qs) {
        total += SEASON_WEIGHT;
    }

    if matches!((&record.region, &query.region), (Some(rr), Some(qr)) if rr == qr) {
        total += REGION_WEIGHT;
    }

    total += rainfall_credit(record.rainfall, query.rainfall);

    total
}

/// Partial credit for rainfall within tolerance of the query
fn rainfall_credit(record_rainfall: Option<f64>, query_rainfall: f64) -> f64 {
    let Some(rainfall) = record_rainfall else {
        return 0.0;
    };
    if !(query_rainfall > 0.0) || !query_rainfall.is_finite() {
        return 0.0;
    }

    let rel_diff = (rainfall - query_rainfall).abs() / query_rainfall;
    if rel_diff < RAINFALL_TOLERANCE {
        RAINFALL_WEIGHT * (1.0 - rel_diff)
    } else {
        0.0
    }
}

/// Filter records to crop candidates and score each one.
///
/// Output preserves input order; the ensemble does its own ranking.
pub fn score_candidates<'a>(
    records: &'a [HistoricalRecord],
    query: &PredictionQuery,
) -> Vec<ScoredRecord<'a>> {
    let canonical_query = CanonicalQuery::from_query(query);

    records
        .iter()
        .filter_map(|record| {
            let canonical = CanonicalRecord::from_record(record);
            if !crops_match(&canonical.crop, &canonical_query.crop) {
                return None;
            }
            Some(ScoredRecord {
                record,
                score: score_canonical(&canonical, &canonical_query),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> PredictionQuery {
        PredictionQuery {
            crop: "wheat".to_string(),
            soil_type: "Loamy".to_string(),
            region: "north-india".to_string(),
            state: Some("Punjab".to_string()),
            district: Some("Ludhiana".to_string()),
            season: "rabi".to_string(),
            rainfall: 600.0,
            temperature: 20.0,
            humidity: 55.0,
        }
    }

    fn record() -> HistoricalRecord {
        HistoricalRecord {
            crop: "Wheat".to_string(),
            region: Some("north-india".to_string()),
            state: Some("PUNJAB".to_string()),
            district: Some("LUDHIANA".to_string()),
            season: Some("Rabi".to_string()),
            yield_kg_per_ha: 4500.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_location_match() {
        assert_eq!(score(&record(), &query()), 95.0);
    }

    #[test]
    fn test_district_substring_match() {
        let mut r = record();
        r.district = Some("Ludhiana East".to_string());
        r.state = None;
        r.region = None;
        r.season = None;
        assert_eq!(score(&r, &query()), DISTRICT_WEIGHT);
    }

    #[test]
    fn test_season_synonym_match() {
        let r = HistoricalRecord {
            crop: "wheat".to_string(),
            season: Some("Winter".to_string()),
            ..Default::default()
        };
        assert_eq!(score(&r, &query()), SEASON_WEIGHT);
    }

    #[test]
    fn test_rainfall_partial_credit() {
        let r = HistoricalRecord {
            crop: "wheat".to_string(),
            rainfall: Some(450.0),
            ..Default::default()
        };
        // rel diff 0.25 -> 5 * 0.75
        assert!((score(&r, &query()) - 3.75).abs() < 1e-9);
    }

    #[test]
    fn test_rainfall_outside_tolerance() {
        let r = HistoricalRecord {
            crop: "wheat".to_string(),
            annual_rainfall: Some(1200.0),
            ..Default::default()
        };
        assert_eq!(score(&r, &query()), 0.0);
    }

    #[test]
    fn test_missing_query_location() {
        let mut q = query();
        q.state = None;
        q.district = None;
        assert_eq!(score(&record(), &q), SEASON_WEIGHT + REGION_WEIGHT);
    }

    #[test]
    fn test_score_candidates_filters_crops() {
        let records = vec![
            record(),
            HistoricalRecord {
                crop: "Rice".to_string(),
                ..Default::default()
            },
        ];
        let scored = score_candidates(&records, &query());
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].record.crop, "Wheat");
    }
}
