//! Today's adherence roll-up.

use anyhow::Result;
use shared::AdherenceStats;
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::storage::{MedicationRepository, MedicationStorage};

/// Service that aggregates today's taken/missed counts into a score
#[derive(Clone)]
pub struct StatsService {
    medications: MedicationRepository,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(medications: MedicationRepository, clock: Arc<dyn Clock>) -> Self {
        Self { medications, clock }
    }

    /// Compute today's adherence stats over all of an account's medications.
    ///
    /// Every medication counts toward the total, whether or not its
    /// recurrence schedules it today. The score truncates toward zero.
    pub async fn get_stats(&self, account_id: i64) -> Result<AdherenceStats> {
        let medications = self.medications.list_for_account(account_id).await?;
        let today = self.clock.now().date_naive();

        let total = medications.len() as i64;
        let taken = medications
            .iter()
            .filter(|m| m.medication.last_taken == Some(today))
            .count() as i64;
        let missed = total - taken;
        let score = if total > 0 { taken * 100 / total } else { 0 };

        info!(
            "Stats for account {}: {}/{} taken today, score {}",
            account_id, taken, total, score
        );

        Ok(AdherenceStats {
            total,
            taken,
            missed,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::{DbConnection, PatientRepository, PatientStorage};
    use chrono::NaiveDate;
    use shared::{Medication, NewMedication, Recurrence};

    async fn setup_test() -> (StatsService, MedicationRepository, PatientRepository) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        (
            StatsService::new(
                MedicationRepository::new(db.clone()),
                Arc::new(FixedClock::at(2025, 1, 6, 12, 0)),
            ),
            MedicationRepository::new(db.clone()),
            PatientRepository::new(db),
        )
    }

    async fn seed_medication(
        meds: &MedicationRepository,
        patient_id: i64,
        name: &str,
        taken_today: bool,
    ) -> Medication {
        let mut med = meds
            .store_medication(&NewMedication {
                patient_id,
                name: name.to_string(),
                dosage: "500mg".to_string(),
                instructions: "Before food".to_string(),
                schedule_time: "08:00".to_string(),
                recurrence: Recurrence::Daily,
                stock: 30,
                max_stock: 30,
            })
            .await
            .unwrap();

        if taken_today {
            med.last_taken = Some(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
            med.stock -= 1;
            meds.update_medication(&med).await.unwrap();
        }
        med
    }

    #[tokio::test]
    async fn test_three_of_four_taken_scores_seventy_five() {
        let (service, meds, patients) = setup_test().await;
        let patient = patients.store_patient(1, "Grandma").await.unwrap();

        seed_medication(&meds, patient.id, "A", true).await;
        seed_medication(&meds, patient.id, "B", true).await;
        seed_medication(&meds, patient.id, "C", true).await;
        seed_medication(&meds, patient.id, "D", false).await;

        let stats = service.get_stats(1).await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.taken, 3);
        assert_eq!(stats.missed, 1);
        assert_eq!(stats.score, 75);
    }

    #[tokio::test]
    async fn test_score_truncates_toward_zero() {
        let (service, meds, patients) = setup_test().await;
        let patient = patients.store_patient(1, "Grandma").await.unwrap();

        seed_medication(&meds, patient.id, "A", true).await;
        seed_medication(&meds, patient.id, "B", false).await;
        seed_medication(&meds, patient.id, "C", false).await;

        let stats = service.get_stats(1).await.unwrap();
        assert_eq!(stats.score, 33); // 100 / 3, not rounded up
    }

    #[tokio::test]
    async fn test_no_medications_scores_zero() {
        let (service, _meds, _patients) = setup_test().await;

        let stats = service.get_stats(1).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.taken, 0);
        assert_eq!(stats.missed, 0);
        assert_eq!(stats.score, 0);
    }

    #[tokio::test]
    async fn test_medication_taken_on_another_day_counts_as_missed() {
        let (service, meds, patients) = setup_test().await;
        let patient = patients.store_patient(1, "Grandma").await.unwrap();

        let mut med = seed_medication(&meds, patient.id, "A", false).await;
        med.last_taken = Some(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        meds.update_medication(&med).await.unwrap();

        let stats = service.get_stats(1).await.unwrap();
        assert_eq!(stats.taken, 0);
        assert_eq!(stats.missed, 1);
    }
}
