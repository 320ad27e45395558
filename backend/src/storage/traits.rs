//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use shared::{ActivityEntry, Medication, MedicationWithPatient, NewActivityEntry, NewMedication, Patient};

/// Trait defining the interface for medication storage operations
#[async_trait]
pub trait MedicationStorage: Send + Sync {
    /// Store a new medication and return it with its assigned ID
    async fn store_medication(&self, medication: &NewMedication) -> Result<Medication>;

    /// Retrieve a specific medication by ID
    async fn get_medication(&self, medication_id: i64) -> Result<Option<Medication>>;

    /// List all medications belonging to one patient, ordered by scheduled time
    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<Medication>>;

    /// List all medications across an account's patients, joined with the
    /// owning patient's name
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<MedicationWithPatient>>;

    /// Update an existing medication's mutable fields (stock, last_taken)
    async fn update_medication(&self, medication: &Medication) -> Result<()>;

    /// Delete a medication by ID
    /// Returns true if the medication was found and deleted, false otherwise
    async fn delete_medication(&self, medication_id: i64) -> Result<bool>;

    /// Persist a dose transition and its audit entry atomically
    ///
    /// The medication update and the log insert commit together or not at
    /// all, so the ledger never leaves a mutation without its audit entry.
    async fn commit_dose_transition(
        &self,
        medication: &Medication,
        entry: &NewActivityEntry,
    ) -> Result<()>;
}

/// Trait defining the interface for patient storage operations
#[async_trait]
pub trait PatientStorage: Send + Sync {
    /// Store a new patient and return it with its assigned ID
    async fn store_patient(&self, account_id: i64, name: &str) -> Result<Patient>;

    /// Retrieve a specific patient by ID
    async fn get_patient(&self, patient_id: i64) -> Result<Option<Patient>>;

    /// List all patients belonging to an account, in creation order
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<Patient>>;

    /// Delete all of an account's patients, cascading to their medications
    /// Returns the number of patients deleted
    async fn delete_for_account(&self, account_id: i64) -> Result<u64>;
}

/// Trait defining the interface for the append-only activity log
///
/// Entries are never updated or deleted; no such operations are exposed.
#[async_trait]
pub trait ActivityStorage: Send + Sync {
    /// Append a new entry and return it with its assigned ID
    async fn append(&self, entry: &NewActivityEntry) -> Result<ActivityEntry>;

    /// List an account's entries ordered by timestamp descending
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<ActivityEntry>>;
}
