//! Historical dataset HTTP handlers

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::CropDataService;
use crate::AppState;

/// Import a crop production CSV sent as the request body
pub async fn import_crop_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Bytes,
) -> impl IntoResponse {
    if body.is_empty() {
        return AppError::ValidationError("CSV body is empty".to_string()).into_response();
    }

    tracing::info!(user_id = %user.user_id, bytes = body.len(), "Crop data import requested");
    let service = CropDataService::new(state.db.clone());

    match service.import_csv(&body).await {
        Ok(summary) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "import": summary })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete the whole historical dataset
pub async fn clear_crop_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    tracing::info!(user_id = %user.user_id, "Crop data clear requested");
    let service = CropDataService::new(state.db.clone());

    match service.clear().await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "deleted": deleted })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Dataset size summary
pub async fn get_dataset_stats(State(state): State<AppState>) -> impl IntoResponse {
    let service = CropDataService::new(state.db.clone());

    match service.dataset_stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "stats": stats })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
