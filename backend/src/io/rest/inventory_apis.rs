//! # REST API for Inventory Health

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::io::rest::AccountQuery;
use crate::AppState;

/// Get the inventory view for an account
pub async fn get_inventory(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> impl IntoResponse {
    info!("GET /api/inventory - account: {}", query.account_id);

    match state.inventory_service.get_inventory(query.account_id).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            error!("Failed to build inventory: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error building inventory").into_response()
        }
    }
}
