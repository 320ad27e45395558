//! # REST API for Adherence Stats

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::io::rest::AccountQuery;
use crate::AppState;

/// Get today's adherence stats for an account
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> impl IntoResponse {
    info!("GET /api/stats - account: {}", query.account_id);

    match state.stats_service.get_stats(query.account_id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!("Failed to compute stats: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error computing stats").into_response()
        }
    }
}
