//! Weighted ensemble over the best-matching historical records

use crate::models::{clamp_yield, PredictionQuery};

use super::normalize::{canonical_crop, crop_is};
use super::params::PredictorParams;
use super::similarity::ScoredRecord;

/// Crops that suffer in dry seasons and benefit from heavy rain
const WATER_INTENSIVE: &[&str] = &["rice", "sugarcane", "jute", "banana"];

/// Crops that lose yield when waterlogged
const DROUGHT_TOLERANT: &[&str] = &["bajra", "jowar", "gram", "mustard", "groundnut", "cotton"];

/// Optimal growing temperature range (°C) per crop
const OPTIMAL_TEMPERATURE: &[(&str, f64, f64)] = &[
    ("wheat", 15.0, 25.0),
    ("rice", 20.0, 35.0),
    ("maize", 18.0, 32.0),
    ("cotton", 21.0, 35.0),
    ("sugarcane", 20.0, 35.0),
    ("bajra", 25.0, 35.0),
    ("jowar", 25.0, 32.0),
    ("gram", 15.0, 30.0),
    ("groundnut", 22.0, 30.0),
];

const LOW_RAINFALL_MM: f64 = 800.0;
const HIGH_RAINFALL_MM: f64 = 1500.0;
/// Degrees outside the optimal range before the severe penalty applies
const TEMPERATURE_MARGIN: f64 = 5.0;
/// Below this a yield is taken to be in tons/ha
const TONS_PER_HA_CEILING: f64 = 100.0;

/// Result of the ensemble step
#[derive(Debug, Clone)]
pub struct Ensemble<'a> {
    /// Score-weighted mean yield before any adjustment
    pub weighted_yield: f64,
    /// Yield after adjustments, unit correction and clamping (kg/ha)
    pub predicted_yield: i64,
    /// Records that took part in the weighted average, best first
    pub top: Vec<ScoredRecord<'a>>,
    /// Size of the candidate pool the top records were drawn from
    pub pool_size: usize,
    /// Records scoring at least `min_score`; zero when the pool degraded
    pub qualified_count: usize,
}

/// Records that qualify for the ensemble, sorted best first.
///
/// When nothing reaches `min_score`, the best `fallback_pool_size`
/// records are used instead.
pub fn candidate_pool<'a>(
    scored: &[ScoredRecord<'a>],
    params: &PredictorParams,
) -> Vec<ScoredRecord<'a>> {
    let mut pool: Vec<ScoredRecord<'a>> = scored
        .iter()
        .filter(|s| s.score >= params.min_score)
        .copied()
        .collect();

    if pool.is_empty() {
        pool = scored.to_vec();
        sort_by_score(&mut pool);
        pool.truncate(params.fallback_pool_size);
    } else {
        sort_by_score(&mut pool);
    }

    pool
}

fn sort_by_score(records: &mut [ScoredRecord<'_>]) {
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Score-weighted mean yield with a weight floor of 1
pub fn weighted_yield(top: &[ScoredRecord<'_>]) -> Option<f64> {
    if top.is_empty() {
        return None;
    }

    let (weighted_sum, weight_total) = top.iter().fold((0.0, 0.0), |(sum, total), s| {
        let weight = s.score.max(1.0);
        (sum + s.record.yield_kg_per_ha * weight, total + weight)
    });

    Some(weighted_sum / weight_total)
}

/// Multiplier for the crop's sensitivity to rainfall
pub fn water_factor(crop: &str, rainfall: f64) -> f64 {
    if WATER_INTENSIVE.iter().any(|c| crop_is(crop, c)) {
        if rainfall < LOW_RAINFALL_MM {
            return 0.90;
        }
        if rainfall > HIGH_RAINFALL_MM {
            return 1.05;
        }
    } else if DROUGHT_TOLERANT.iter().any(|c| crop_is(crop, c)) && rainfall > HIGH_RAINFALL_MM {
        return 0.95;
    }
    1.0
}

/// Optimal temperature range for a canonical crop name, if known
pub fn optimal_temperature(crop: &str) -> Option<(f64, f64)> {
    OPTIMAL_TEMPERATURE
        .iter()
        .find(|(name, _, _)| crop_is(crop, name))
        .map(|(_, min, max)| (*min, *max))
}

/// Multiplier for temperature stress outside the crop's optimal range
pub fn temperature_factor(crop: &str, temperature: f64) -> f64 {
    let Some((min, max)) = optimal_temperature(crop) else {
        return 1.0;
    };

    if temperature < min - TEMPERATURE_MARGIN || temperature > max + TEMPERATURE_MARGIN {
        0.85
    } else if temperature < min || temperature > max {
        0.95
    } else {
        1.0
    }
}

/// Treat implausibly small yields as tons/ha
pub fn correct_units(yield_value: f64) -> f64 {
    if yield_value < TONS_PER_HA_CEILING {
        yield_value * 1000.0
    } else {
        yield_value
    }
}

/// Run the ensemble over scored candidates. `None` when there are none.
pub fn predict<'a>(
    scored: &[ScoredRecord<'a>],
    query: &PredictionQuery,
    params: &PredictorParams,
) -> Option<Ensemble<'a>> {
    let qualified_count = scored.iter().filter(|s| s.score >= params.min_score).count();
    let pool = candidate_pool(scored, params);
    let pool_size = pool.len();
    let top: Vec<ScoredRecord<'a>> = pool.into_iter().take(params.ensemble_size).collect();

    let weighted = weighted_yield(&top)?;

    let crop = canonical_crop(&query.crop);
    let adjusted = weighted
        * water_factor(&crop, query.rainfall)
        * temperature_factor(&crop, query.temperature);

    Some(Ensemble {
        weighted_yield: weighted,
        predicted_yield: clamp_yield(correct_units(adjusted)),
        top,
        pool_size,
        qualified_count,
    })
}
