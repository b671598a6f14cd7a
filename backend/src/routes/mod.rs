//! Route definitions for the Crop Yield Advisor

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Model statistics (public)
        .route("/model-stats", get(handlers::get_model_stats))
        // Protected routes - predictions
        .nest("/predictions", prediction_routes(state.clone()))
        // Protected routes - historical dataset
        .nest("/crop-data", crop_data_routes(state))
}

/// Prediction routes (protected)
fn prediction_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::create_prediction).get(handlers::list_predictions),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Historical dataset routes (protected)
fn crop_data_routes(state: AppState) -> Router<AppState> {
    let import_limit = DefaultBodyLimit::max(state.config.import.max_body_bytes);

    Router::new()
        .route("/", delete(handlers::clear_crop_data))
        .route(
            "/import",
            post(handlers::import_crop_data).layer(import_limit),
        )
        .route("/stats", get(handlers::get_dataset_stats))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
