//! HTTP handlers

pub mod crop_data;
pub mod health;
pub mod prediction;
pub mod stats;

pub use crop_data::{clear_crop_data, get_dataset_stats, import_crop_data};
pub use health::health_check;
pub use prediction::{create_prediction, list_predictions};
pub use stats::get_model_stats;
