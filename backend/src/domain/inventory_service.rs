//! Inventory health reporting.
//!
//! Read-side projection mapping each medication's remaining stock against its
//! fill level. Never mutates anything.

use anyhow::Result;
use shared::{InventoryItem, InventoryStatus};
use tracing::info;

use crate::domain::{DEFAULT_MAX_STOCK, LOW_STOCK_THRESHOLD};
use crate::storage::{MedicationRepository, MedicationStorage};

/// Service that derives inventory health for an account's medications
#[derive(Clone)]
pub struct InventoryService {
    medications: MedicationRepository,
}

impl InventoryService {
    pub fn new(medications: MedicationRepository) -> Self {
        Self { medications }
    }

    /// Build the inventory view for an account
    pub async fn get_inventory(&self, account_id: i64) -> Result<Vec<InventoryItem>> {
        let medications = self.medications.list_for_account(account_id).await?;

        let items: Vec<InventoryItem> = medications
            .iter()
            .map(|m| {
                let med = &m.medication;
                let status = if med.stock < LOW_STOCK_THRESHOLD {
                    InventoryStatus::Low
                } else {
                    InventoryStatus::Ok
                };
                // Legacy rows can carry a zero maximum; fall back to the
                // standard fill quantity for display.
                let total = if med.max_stock > 0 {
                    med.max_stock
                } else {
                    DEFAULT_MAX_STOCK
                };

                InventoryItem {
                    name: format!("{} ({})", med.name, m.patient_name),
                    dosage: med.dosage.clone(),
                    stock: med.stock,
                    total,
                    unit: "tablets".to_string(),
                    status,
                    instructions: med.instructions.clone(),
                }
            })
            .collect();

        let low_count = items.iter().filter(|i| i.status == InventoryStatus::Low).count();
        if low_count > 0 {
            info!(
                "Inventory for account {}: {} of {} medications running low",
                account_id,
                low_count,
                items.len()
            );
        }

        Ok(items)
    }
}
