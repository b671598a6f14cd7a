//! Business logic services for the Crop Yield Advisor

pub mod crop_data;
pub mod prediction;
pub mod stats;

pub use crop_data::CropDataService;
pub use prediction::{PredictionEngine, PredictionService};
pub use stats::StatsService;
