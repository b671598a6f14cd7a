//! External API integrations

pub mod ml_api;

pub use ml_api::MlApiClient;
