//! Shared types and prediction logic for the Crop Yield Advisor
//!
//! This crate contains the domain models and the pure prediction pipeline
//! used by the backend, the frontend (via WASM) and the data import tools.

pub mod models;
pub mod prediction;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
