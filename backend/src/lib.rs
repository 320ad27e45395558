//! # Backend for the medibot medication tracker
//!
//! Brings together the three layers of the application:
//! - **Domain**: scheduling and stock-ledger rules
//! - **Storage**: SQLite persistence behind repository traits
//! - **IO**: the REST interface exposed to the dashboard
//!
//! The backend is UI-agnostic; the dashboard talks to it over the REST
//! routes configured in [`create_router`].

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::domain::{
    ActivityService, AlertEmailConfig, Clock, DoseService, EmergencyService, InventoryService,
    MedicationService, NoopNotifier, Notifier, ScheduleService, SmtpNotifier, StatsService,
    SystemClock,
};
use crate::storage::{ActivityRepository, DbConnection, MedicationRepository, PatientRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub schedule_service: ScheduleService,
    pub dose_service: DoseService,
    pub inventory_service: InventoryService,
    pub stats_service: StatsService,
    pub activity_service: ActivityService,
    pub medication_service: MedicationService,
    pub emergency_service: EmergencyService,
}

/// Initialize the backend with all required services
pub async fn initialize_backend() -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::init().await?;

    let notifier: Arc<dyn Notifier> = match AlertEmailConfig::from_env() {
        Some(config) => Arc::new(SmtpNotifier::new(config)?),
        None => {
            info!("No alert email configuration found, alerts will not be delivered");
            Arc::new(NoopNotifier)
        }
    };

    Ok(initialize_backend_with(db, notifier))
}

/// Wire the services over an existing connection and notifier
pub fn initialize_backend_with(db: DbConnection, notifier: Arc<dyn Notifier>) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let medications = MedicationRepository::new(db.clone());
    let patients = PatientRepository::new(db.clone());
    let activity_service = ActivityService::new(ActivityRepository::new(db));

    AppState {
        schedule_service: ScheduleService::new(medications.clone(), clock.clone()),
        dose_service: DoseService::new(medications.clone(), clock.clone()),
        inventory_service: InventoryService::new(medications.clone()),
        stats_service: StatsService::new(medications.clone(), clock),
        activity_service: activity_service.clone(),
        medication_service: MedicationService::new(medications, patients),
        emergency_service: EmergencyService::new(activity_service, notifier),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow the dashboard to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/schedule", get(io::rest::schedule_apis::get_schedule))
        .route("/inventory", get(io::rest::inventory_apis::get_inventory))
        .route("/stats", get(io::rest::stats_apis::get_stats))
        .route("/history", get(io::rest::history_apis::get_history))
        .route("/task/add", post(io::rest::task_apis::add_task))
        .route("/task/delete", post(io::rest::task_apis::delete_task))
        .route("/task/toggle", post(io::rest::task_apis::toggle_task))
        .route("/request", post(io::rest::request_apis::record_request))
        .route("/setup", post(io::rest::setup_apis::setup_roster));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
