//! # REST API for Medication Tasks
//!
//! Endpoints for adding and deleting medication reminders and for the
//! take/undo dose toggle.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::domain::DoseError;
use crate::AppState;
use shared::{AddMedicationRequest, DeleteMedicationRequest, ToggleDoseRequest};

/// Create a medication reminder
pub async fn add_task(
    State(state): State<AppState>,
    Json(request): Json<AddMedicationRequest>,
) -> impl IntoResponse {
    info!("POST /api/task/add - request: {:?}", request);

    match state.medication_service.add_medication(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to add medication: {}", e);
            let status = if e.to_string().contains("not found") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Delete a medication reminder
pub async fn delete_task(
    State(state): State<AppState>,
    Json(request): Json<DeleteMedicationRequest>,
) -> impl IntoResponse {
    info!("POST /api/task/delete - id: {}", request.id);

    match state.medication_service.delete_medication(request.id).await {
        Ok(()) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => {
            error!("Failed to delete medication: {}", e);
            let status = if e.to_string().contains("not found") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// Toggle a dose between untaken-today and taken-today
pub async fn toggle_task(
    State(state): State<AppState>,
    Json(request): Json<ToggleDoseRequest>,
) -> impl IntoResponse {
    info!("POST /api/task/toggle - id: {}", request.id);

    match state.dose_service.toggle_dose(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e @ DoseError::NotFound) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
        Err(e @ DoseError::OutOfStock(_)) => {
            (StatusCode::CONFLICT, format!("Error: {}!", e)).into_response()
        }
        Err(DoseError::Storage(e)) => {
            error!("Failed to toggle dose: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error toggling dose").into_response()
        }
    }
}
