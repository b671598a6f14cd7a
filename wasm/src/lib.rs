//! WebAssembly module for the Crop Yield Advisor
//!
//! Provides client-side computation for:
//! - Offline heuristic yield estimates
//! - Local predictions over records cached in the browser
//! - Season and crop name normalization for form inputs

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::prediction::{heuristic, local_estimate, normalize, PredictorParams};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    web_sys::console::debug_1(&JsValue::from_str("crop yield advisor wasm loaded"));
}

fn parse_query(query_json: &str) -> Result<PredictionQuery, JsValue> {
    serde_json::from_str(query_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid query JSON: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize result: {}", e)))
}

fn heuristic_estimate_json(query_json: &str, seed: u64) -> Result<String, JsValue> {
    let query = parse_query(query_json)?;
    let mut rng = StdRng::seed_from_u64(seed);
    to_json(&heuristic::estimate(&query, &mut rng))
}

/// Heuristic estimate for when the device is offline
#[wasm_bindgen]
pub fn estimate_yield_offline(query_json: &str) -> Result<String, JsValue> {
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    heuristic_estimate_json(query_json, seed)
}

/// Deterministic heuristic yield in kg/ha, before clamping
#[wasm_bindgen]
pub fn heuristic_yield(
    crop: &str,
    season: &str,
    rainfall: f64,
    temperature: f64,
    humidity: f64,
) -> f64 {
    let query = PredictionQuery {
        crop: crop.to_string(),
        soil_type: String::new(),
        region: String::new(),
        state: None,
        district: None,
        season: season.to_string(),
        rainfall,
        temperature,
        humidity,
    };
    heuristic::heuristic_yield(&query)
}

/// Predict from a JSON array of historical records.
/// Returns `null` when none of the records match the crop.
#[wasm_bindgen]
pub fn predict_from_records(records_json: &str, query_json: &str) -> Result<String, JsValue> {
    let records: Vec<HistoricalRecord> = serde_json::from_str(records_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid records JSON: {}", e)))?;
    let query = parse_query(query_json)?;

    to_json(&local_estimate(&records, &query, &PredictorParams::default()))
}

/// Canonical season for a free-text label, or `undefined`
#[wasm_bindgen]
pub fn normalize_season(label: &str) -> Option<String> {
    Season::normalize(label).map(|s| s.to_string())
}

/// Canonical crop name used by the historical dataset
#[wasm_bindgen]
pub fn canonical_crop_name(name: &str) -> String {
    normalize::canonical_crop(name)
}

/// Convert a tons/ha yield to kg/ha
#[wasm_bindgen]
pub fn tons_to_kg_per_ha(tons_per_ha: f64) -> f64 {
    convert_yield_to_kg_per_ha(tons_per_ha)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUINOA: &str = r#"{
        "crop": "quinoa", "soil_type": "sandy", "region": "west-india",
        "state": null, "district": null, "season": "rabi",
        "rainfall": 600, "temperature": 20, "humidity": 55
    }"#;

    #[test]
    fn test_heuristic_yield() {
        assert!((heuristic_yield("wheat", "rabi", 150.0, 28.0, 65.0) - 4950.0).abs() < 1e-9);
        assert!((heuristic_yield("quinoa", "zaid", 150.0, 28.0, 65.0) - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_offline_estimate_json() {
        let json = heuristic_estimate_json(QUINOA, 42).unwrap();
        let est: PredictionEstimate = serde_json::from_str(&json).unwrap();
        assert_eq!(est.predicted_yield, 4400);
        assert!(!est.local_data_used);
    }

    #[test]
    fn test_predict_from_records() {
        let records = r#"[
            {"crop": "Wheat", "state": "Punjab", "season": "Rabi", "yield": 4200},
            {"crop": "Rice", "state": "Punjab", "season": "Kharif", "yield": 3900}
        ]"#;
        let query = QUINOA.replace("quinoa", "wheat");
        let json = predict_from_records(records, &query).unwrap();
        let est: Option<PredictionEstimate> = serde_json::from_str(&json).unwrap();
        let est = est.unwrap();
        assert_eq!(est.predicted_yield, 4200);
        assert_eq!(est.similar_records_count, 1);
    }

    #[test]
    fn test_overflowing_yield_clamped_to_maximum() {
        let records = r#"[{"crop": "wheat", "season": "rabi", "yield": 1e308}]"#;
        let query = QUINOA.replace("quinoa", "wheat");
        let json = predict_from_records(records, &query).unwrap();
        let est: Option<PredictionEstimate> = serde_json::from_str(&json).unwrap();
        assert_eq!(est.unwrap().predicted_yield, 80_000);
    }

    #[test]
    fn test_normalization_helpers() {
        assert_eq!(normalize_season("Winter"), Some("rabi".to_string()));
        assert_eq!(normalize_season("monsoon"), None);
        assert_eq!(canonical_crop_name("Corn"), "maize");
        assert_eq!(tons_to_kg_per_ha(2.5), 2500.0);
    }
}
