//! # REST API for Manual and Emergency Requests

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::AppState;
use shared::RecordRequestRequest;

/// Record a manual request from the dashboard; a help request also alerts
/// the caregiver
pub async fn record_request(
    State(state): State<AppState>,
    Json(request): Json<RecordRequestRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/request - account: {}, kind: {}",
        request.account_id, request.kind
    );

    match state.emergency_service.record_request(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to record request: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error recording request").into_response()
        }
    }
}
