//! Historical crop yield observations

use serde::{Deserialize, Serialize};

/// One observed crop-yield data point from the historical dataset.
///
/// `yield_kg_per_ha` is always kilograms per hectare; conversion from the
/// raw tons-per-hectare import format happens before storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistoricalRecord {
    pub crop: String,
    pub soil_type: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    /// Stored as free text; normalized when scoring
    pub season: Option<String>,
    pub rainfall: Option<f64>,
    pub annual_rainfall: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    #[serde(rename = "yield")]
    pub yield_kg_per_ha: f64,
    pub year: Option<i32>,
    pub area_hectares: Option<f64>,
    pub production: Option<f64>,
    pub fertilizer_used: Option<String>,
    pub pesticide: Option<f64>,
}

impl HistoricalRecord {
    /// Rainfall figure used for similarity, preferring the season value
    pub fn effective_rainfall(&self) -> Option<f64> {
        self.rainfall.or(self.annual_rainfall)
    }
}

/// A raw row from the public crop production CSV, before unit conversion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCropRow {
    #[serde(alias = "Crop")]
    pub crop: Option<String>,
    #[serde(alias = "Crop_Year", alias = "crop_year")]
    pub year: Option<String>,
    #[serde(alias = "Season")]
    pub season: Option<String>,
    #[serde(alias = "State", alias = "state_name")]
    pub state: Option<String>,
    #[serde(alias = "District", alias = "district_name")]
    pub district: Option<String>,
    #[serde(alias = "Area")]
    pub area: Option<String>,
    #[serde(alias = "Production")]
    pub production: Option<String>,
    #[serde(alias = "Annual_Rainfall")]
    pub annual_rainfall: Option<String>,
    #[serde(alias = "Fertilizer")]
    pub fertilizer: Option<String>,
    #[serde(alias = "Pesticide")]
    pub pesticide: Option<String>,
    /// Tons per hectare
    #[serde(rename = "yield", alias = "Yield")]
    pub yield_tons_per_ha: Option<String>,
}
