//! # REST API Interface Layer
//!
//! Thin HTTP endpoints over the domain services. This layer handles
//! request/response serialization, translation of domain errors to HTTP
//! status codes, and request logging. No business logic lives here.

use serde::Deserialize;

pub mod history_apis;
pub mod inventory_apis;
pub mod request_apis;
pub mod schedule_apis;
pub mod setup_apis;
pub mod stats_apis;
pub mod task_apis;

/// Query parameters for account-scoped read endpoints
#[derive(Deserialize, Debug)]
pub struct AccountQuery {
    pub account_id: i64,
}
