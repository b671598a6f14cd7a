//! Model statistics HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::services::StatsService;
use crate::AppState;

/// Active model description and prediction usage
pub async fn get_model_stats(State(state): State<AppState>) -> impl IntoResponse {
    let service = StatsService::new(state.db.clone());

    match service.report().await {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "stats": report })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
