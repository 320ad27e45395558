//! # Domain Module
//!
//! Contains all business logic for the medication tracker.
//!
//! This module encapsulates the scheduling and ledger rules that decide which
//! doses are due, how stock moves on take/undo, and what gets audited. It
//! operates independently of the HTTP layer and of the storage
//! implementation.
//!
//! ## Module Organization
//!
//! - **schedule_service**: Computes the due-today view from recurrence rules
//! - **dose_service**: The take/undo stock ledger, the only writer of stock
//! - **inventory_service**: Derives inventory health from remaining stock
//! - **stats_service**: Rolls up today's taken/missed counts into a score
//! - **activity_service**: The append-only audit trail
//! - **medication_service**: Medication/patient CRUD and initial setup
//! - **emergency_service**: Manual and emergency request recording
//! - **clock / notifier**: Injected collaborators for time and alerting

pub mod activity_service;
pub mod clock;
pub mod dose_service;
pub mod emergency_service;
pub mod inventory_service;
pub mod medication_service;
pub mod notifier;
pub mod schedule_service;
pub mod stats_service;

pub use activity_service::ActivityService;
pub use clock::{Clock, SystemClock};
pub use dose_service::{DoseError, DoseService};
pub use emergency_service::EmergencyService;
pub use inventory_service::InventoryService;
pub use medication_service::MedicationService;
pub use notifier::{AlertEmailConfig, NoopNotifier, Notifier, SmtpNotifier};
pub use schedule_service::ScheduleService;
pub use stats_service::StatsService;

/// Stock level below which inventory health reports "low"
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Standard bottle size used for single-added reminders and as the display
/// total for legacy rows without a fill level
pub const DEFAULT_MAX_STOCK: i64 = 30;
