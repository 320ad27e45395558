//! # Storage Module
//!
//! Handles all data persistence operations for the medication tracker.
//!
//! This module abstracts away the specific storage implementation details and
//! provides a consistent interface for persisting and retrieving data. The
//! domain layer works against the traits in [`traits`]; the SQLite
//! repositories in [`sqlite`] are the current implementation.

pub mod connection;
pub mod sqlite;
pub mod traits;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use sqlite::{ActivityRepository, MedicationRepository, PatientRepository};
pub use traits::{ActivityStorage, MedicationStorage, PatientStorage};
