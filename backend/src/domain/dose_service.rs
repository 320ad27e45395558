//! The take/undo stock ledger.
//!
//! This service is the single authority for whether a dose can be marked
//! taken. Every transition mutates stock and `last_taken` together with its
//! audit entry in one storage transaction, and transitions for the same
//! medication are serialized through a keyed lock so concurrent toggles can
//! never drive stock negative or past the fill level.

use anyhow::Result;
use chrono::Utc;
use shared::{NewActivityEntry, ToggleDoseRequest, ToggleDoseResponse};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::storage::{MedicationRepository, MedicationStorage};

/// Errors surfaced by the dose ledger. Persisted state is unchanged on every
/// error path.
#[derive(Debug, thiserror::Error)]
pub enum DoseError {
    #[error("Medication not found")]
    NotFound,
    #[error("{0} is Out of Stock")]
    OutOfStock(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Service implementing the reversible take/undo contract
#[derive(Clone)]
pub struct DoseService {
    medications: MedicationRepository,
    clock: Arc<dyn Clock>,
    // One async mutex per medication id; toggles on different medications
    // proceed independently.
    locks: Arc<Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>>,
}

impl DoseService {
    pub fn new(medications: MedicationRepository, clock: Arc<dyn Clock>) -> Self {
        Self {
            medications,
            clock,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_for(&self, medication_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(medication_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Toggle a medication between untaken-today and taken-today.
    ///
    /// Taking decrements stock and stamps `last_taken` with today's date;
    /// undoing clears the stamp and refunds one dose, capped at the
    /// medication's fill level so repeated undos cannot overfill it.
    pub async fn toggle_dose(
        &self,
        request: ToggleDoseRequest,
    ) -> Result<ToggleDoseResponse, DoseError> {
        let lock = self.lock_for(request.id);
        let _guard = lock.lock().await;

        let mut medication = self
            .medications
            .get_medication(request.id)
            .await?
            .ok_or(DoseError::NotFound)?;
        let today = self.clock.now().date_naive();

        if medication.last_taken == Some(today) {
            // Undo: the dose was already checked off today
            medication.last_taken = None;
            if medication.stock < medication.max_stock {
                medication.stock += 1;
            }

            let entry = NewActivityEntry {
                account_id: request.account_id,
                action: format!("Undo: {}", medication.name),
                detail: format!("Stock corrected to {}", medication.stock),
                timestamp: Utc::now().to_rfc3339(),
            };
            self.medications
                .commit_dose_transition(&medication, &entry)
                .await?;

            info!(
                "Undid dose of {} (id {}), stock back to {}",
                medication.name, medication.id, medication.stock
            );

            Ok(ToggleDoseResponse {
                medication_id: medication.id,
                name: medication.name.clone(),
                stock: medication.stock,
                taken_today: false,
                success_message: format!("Unchecked {}", medication.name),
            })
        } else {
            // Take: check the dose off for today
            if medication.stock == 0 {
                warn!(
                    "Refused to dispense {} (id {}): out of stock",
                    medication.name, medication.id
                );
                return Err(DoseError::OutOfStock(medication.name));
            }

            medication.stock -= 1;
            medication.last_taken = Some(today);

            let entry = NewActivityEntry {
                account_id: request.account_id,
                action: format!("Dispensed {}", medication.name),
                detail: format!("Manual check-off. Stock remaining: {}", medication.stock),
                timestamp: Utc::now().to_rfc3339(),
            };
            self.medications
                .commit_dose_transition(&medication, &entry)
                .await?;

            info!(
                "Dispensed {} (id {}), stock now {}",
                medication.name, medication.id, medication.stock
            );

            Ok(ToggleDoseResponse {
                medication_id: medication.id,
                name: medication.name.clone(),
                stock: medication.stock,
                taken_today: true,
                success_message: format!("Checked off {}", medication.name),
            })
        }
    }
}
