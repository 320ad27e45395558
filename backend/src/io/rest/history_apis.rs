//! # REST API for the Activity History

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::io::rest::AccountQuery;
use crate::AppState;

/// List an account's activity history newest-first
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> impl IntoResponse {
    info!("GET /api/history - account: {}", query.account_id);

    match state.activity_service.list_for(query.account_id).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            error!("Failed to list history: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing history").into_response()
        }
    }
}
