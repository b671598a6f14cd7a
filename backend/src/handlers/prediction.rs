//! Yield prediction HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::Pagination;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::prediction::{CreatePredictionInput, PredictionService};
use crate::AppState;

/// Predict the yield for the submitted farm conditions and store the result
pub async fn create_prediction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreatePredictionInput>, JsonRejection>,
) -> impl IntoResponse {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return AppError::ValidationError(rejection.body_text()).into_response(),
    };

    let query = match input.into_query() {
        Ok(query) => query,
        Err(e) => return e.into_response(),
    };

    let outcome = state.engine.predict(&query).await;
    tracing::debug!(user_id = %user.user_id, tier = outcome.tier(), "Prediction computed");

    let service = PredictionService::new(state.db.clone());
    match service
        .save_prediction(user.user_id, &query, outcome.estimate())
        .await
    {
        Ok(summary) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "prediction": summary })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the caller's predictions, newest first
pub async fn list_predictions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> impl IntoResponse {
    let service = PredictionService::new(state.db.clone());

    match service.list_predictions(user.user_id, &pagination).await {
        Ok(page) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "predictions": page.data,
                "pagination": page.pagination,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
