//! # REST API for Initial Setup

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::AppState;
use shared::SetupRequest;

/// Replace an account's entire patient/medication roster
pub async fn setup_roster(
    State(state): State<AppState>,
    Json(request): Json<SetupRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/setup - account: {}, {} patients",
        request.account_id,
        request.patients.len()
    );

    match state.medication_service.replace_roster(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to set up roster: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}
