//! # REST API for the Due-Today Schedule

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::io::rest::AccountQuery;
use crate::AppState;

/// Get the due-today schedule for an account
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> impl IntoResponse {
    info!("GET /api/schedule - account: {}", query.account_id);

    match state.schedule_service.get_due_today(query.account_id).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            error!("Failed to compute schedule: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error computing schedule").into_response()
        }
    }
}
