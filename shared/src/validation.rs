//! Input coercion and import normalization
//!
//! Includes the Indian state-to-region mapping used when importing the
//! public crop production dataset.

use serde_json::Value;
use thiserror::Error;

use crate::models::{HistoricalRecord, RawCropRow, Season};

/// Highest yield accepted from an import (kg/ha); larger values are capped
pub const MAX_IMPORT_YIELD_KG_PER_HA: f64 = 100_000.0;

/// Region assigned when a state is missing or unknown
pub const DEFAULT_REGION: &str = "central-india";

const REGION_STATES: &[(&str, &[&str])] = &[
    (
        "north-india",
        &[
            "JAMMU AND KASHMIR",
            "HIMACHAL PRADESH",
            "PUNJAB",
            "HARYANA",
            "UTTARAKHAND",
            "UTTAR PRADESH",
            "DELHI",
        ],
    ),
    (
        "south-india",
        &[
            "ANDHRA PRADESH",
            "TELANGANA",
            "KARNATAKA",
            "TAMIL NADU",
            "KERALA",
            "PUDUCHERRY",
        ],
    ),
    (
        "east-india",
        &[
            "BIHAR",
            "JHARKHAND",
            "WEST BENGAL",
            "ODISHA",
            "ASSAM",
            "SIKKIM",
            "ARUNACHAL PRADESH",
            "NAGALAND",
            "MANIPUR",
            "MIZORAM",
            "TRIPURA",
            "MEGHALAYA",
        ],
    ),
    ("west-india", &["RAJASTHAN", "GUJARAT", "MAHARASHTRA", "GOA"]),
    ("central-india", &["MADHYA PRADESH", "CHHATTISGARH"]),
];

// ============================================================================
// Request Coercion
// ============================================================================

/// Read a loosely-typed measurement, falling back to `default` when the
/// value is absent or not numeric. Numeric strings are accepted.
pub fn coerce_measurement(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Rejection reasons for request fields
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field is required")]
    Missing,
    #[error("field must not be blank")]
    Blank,
}

/// Required text field check: present and not blank. Returns the trimmed value.
pub fn validate_required(value: Option<&str>) -> Result<&str, FieldError> {
    match value.map(str::trim) {
        None => Err(FieldError::Missing),
        Some("") => Err(FieldError::Blank),
        Some(v) => Ok(v),
    }
}

// ============================================================================
// Import Normalization
// ============================================================================

/// Convert a tons/ha yield to kg/ha, capping corrupt outliers
pub fn convert_yield_to_kg_per_ha(tons_per_ha: f64) -> f64 {
    (tons_per_ha * 1000.0).min(MAX_IMPORT_YIELD_KG_PER_HA)
}

/// Season label as stored: canonical when recognised, else lowercased
pub fn map_season_label(raw: &str) -> String {
    Season::normalize(raw)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| raw.trim().to_lowercase())
}

/// Map an Indian state name onto one of the five region buckets
pub fn map_state_to_region(state: Option<&str>) -> &'static str {
    let Some(state) = state.map(|s| s.trim().to_uppercase()).filter(|s| !s.is_empty()) else {
        return DEFAULT_REGION;
    };

    REGION_STATES
        .iter()
        .find(|(_, states)| {
            states
                .iter()
                .any(|s| state.contains(s) || s.contains(state.as_str()))
        })
        .map(|(region, _)| *region)
        .unwrap_or(DEFAULT_REGION)
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Turn a raw dataset row into a storable record.
///
/// Rows without a crop name or a positive yield are rejected.
pub fn normalize_raw_row(row: &RawCropRow) -> Option<HistoricalRecord> {
    let crop = non_blank(row.crop.as_deref())?.to_lowercase();
    let tons = parse_number(row.yield_tons_per_ha.as_deref()).filter(|y| *y > 0.0)?;

    let state = non_blank(row.state.as_deref());
    let annual_rainfall = parse_number(row.annual_rainfall.as_deref());

    Some(HistoricalRecord {
        crop,
        soil_type: None,
        region: Some(map_state_to_region(state.as_deref()).to_string()),
        district: non_blank(row.district.as_deref()),
        season: row.season.as_deref().map(map_season_label).filter(|s| !s.is_empty()),
        rainfall: annual_rainfall,
        annual_rainfall,
        temperature: None,
        humidity: None,
        yield_kg_per_ha: convert_yield_to_kg_per_ha(tons),
        year: row.year.as_deref().and_then(|y| y.trim().parse::<i32>().ok()),
        area_hectares: parse_number(row.area.as_deref()),
        production: parse_number(row.production.as_deref()),
        fertilizer_used: non_blank(row.fertilizer.as_deref()),
        pesticide: parse_number(row.pesticide.as_deref()),
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_measurement_number() {
        assert_eq!(coerce_measurement(Some(&json!(600)), 150.0), 600.0);
        assert_eq!(coerce_measurement(Some(&json!(0)), 150.0), 0.0);
    }

    #[test]
    fn test_coerce_measurement_numeric_string() {
        assert_eq!(coerce_measurement(Some(&json!(" 22.5 ")), 28.0), 22.5);
    }

    #[test]
    fn test_coerce_measurement_defaults() {
        assert_eq!(coerce_measurement(None, 150.0), 150.0);
        assert_eq!(coerce_measurement(Some(&json!(null)), 28.0), 28.0);
        assert_eq!(coerce_measurement(Some(&json!("heavy")), 65.0), 65.0);
        assert_eq!(coerce_measurement(Some(&json!(true)), 65.0), 65.0);
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required(Some(" wheat ")), Ok("wheat"));
        assert_eq!(validate_required(Some("   ")), Err(FieldError::Blank));
        assert_eq!(validate_required(None), Err(FieldError::Missing));
    }

    #[test]
    fn test_yield_conversion() {
        assert_eq!(convert_yield_to_kg_per_ha(3.5), 3500.0);
        assert_eq!(convert_yield_to_kg_per_ha(250.0), MAX_IMPORT_YIELD_KG_PER_HA);
    }

    #[test]
    fn test_map_season_label() {
        assert_eq!(map_season_label("Whole Year "), "kharif");
        assert_eq!(map_season_label("Winter"), "rabi");
        assert_eq!(map_season_label("Summer"), "zaid");
        assert_eq!(map_season_label("Monsoon"), "monsoon");
    }

    #[test]
    fn test_map_state_to_region() {
        assert_eq!(map_state_to_region(Some("Punjab")), "north-india");
        assert_eq!(map_state_to_region(Some("tamil nadu ")), "south-india");
        assert_eq!(map_state_to_region(Some("Odisha")), "east-india");
        assert_eq!(map_state_to_region(Some("Gujarat")), "west-india");
        assert_eq!(map_state_to_region(Some("Atlantis")), DEFAULT_REGION);
        assert_eq!(map_state_to_region(Some("")), DEFAULT_REGION);
        assert_eq!(map_state_to_region(None), DEFAULT_REGION);
    }

    #[test]
    fn test_normalize_raw_row() {
        let row = RawCropRow {
            crop: Some("Wheat".to_string()),
            year: Some("2019".to_string()),
            season: Some("Rabi       ".to_string()),
            state: Some("Punjab".to_string()),
            district: Some("LUDHIANA".to_string()),
            area: Some("255000".to_string()),
            production: Some("1300000".to_string()),
            annual_rainfall: Some("650.4".to_string()),
            fertilizer: Some("24302610.0".to_string()),
            pesticide: Some("79050".to_string()),
            yield_tons_per_ha: Some("5.1".to_string()),
        };
        let record = normalize_raw_row(&row).unwrap();
        assert_eq!(record.crop, "wheat");
        assert_eq!(record.season.as_deref(), Some("rabi"));
        assert_eq!(record.region.as_deref(), Some("north-india"));
        assert_eq!(record.year, Some(2019));
        assert_eq!(record.rainfall, Some(650.4));
        assert!((record.yield_kg_per_ha - 5100.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_rejects_incomplete_rows() {
        let no_crop = RawCropRow {
            yield_tons_per_ha: Some("2.0".to_string()),
            ..Default::default()
        };
        assert!(normalize_raw_row(&no_crop).is_none());

        let no_yield = RawCropRow {
            crop: Some("Rice".to_string()),
            yield_tons_per_ha: Some("n/a".to_string()),
            ..Default::default()
        };
        assert!(normalize_raw_row(&no_yield).is_none());
    }
}
