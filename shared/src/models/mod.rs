//! Domain models for the Crop Yield Advisor

mod crop_record;
mod prediction;
mod season;
mod stats;

pub use crop_record::*;
pub use prediction::*;
pub use season::*;
pub use stats::*;
