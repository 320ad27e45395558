//! Schedule evaluation for the medication tracker.
//!
//! Decides, for an arbitrary point in time, which medications are due today
//! and in what status. This is a pure projection over the medication store;
//! the UI only renders what is computed here.

use anyhow::Result;
use chrono::{DateTime, Datelike, Local};
use shared::{MedicationWithPatient, ScheduleEntry, ScheduleStatus, Weekday};
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::storage::{MedicationRepository, MedicationStorage};

/// Service that computes the due-today schedule view
#[derive(Clone)]
pub struct ScheduleService {
    medications: MedicationRepository,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(medications: MedicationRepository, clock: Arc<dyn Clock>) -> Self {
        Self { medications, clock }
    }

    /// Get the due-today schedule for an account at the current time
    pub async fn get_due_today(&self, account_id: i64) -> Result<Vec<ScheduleEntry>> {
        let medications = self.medications.list_for_account(account_id).await?;
        let entries = Self::due_today(self.clock.now(), &medications);

        info!(
            "Schedule for account {}: {} of {} medications due today",
            account_id,
            entries.len(),
            medications.len()
        );

        Ok(entries)
    }

    /// Compute the due-today view for an arbitrary instant.
    ///
    /// Medications whose recurrence does not include today's weekday are
    /// excluded entirely; they are not "missed", they simply are not
    /// scheduled today. For the rest the status is completed if the dose was
    /// already taken today, upcoming if the scheduled time is strictly ahead
    /// of now (an exact tie counts as pending), and pending otherwise.
    ///
    /// No side effects; repeated calls over the same input yield the same
    /// output.
    pub fn due_today(
        now: DateTime<Local>,
        medications: &[MedicationWithPatient],
    ) -> Vec<ScheduleEntry> {
        let today = now.date_naive();
        let now_time = now.format("%H:%M").to_string();
        let weekday = Weekday::from(now.weekday());

        let mut entries: Vec<ScheduleEntry> = medications
            .iter()
            .filter(|m| m.medication.recurrence.is_due_on(weekday))
            .map(|m| {
                let med = &m.medication;
                let is_done = med.last_taken == Some(today);
                let status = if is_done {
                    ScheduleStatus::Completed
                } else if med.schedule_time.as_str() > now_time.as_str() {
                    ScheduleStatus::Upcoming
                } else {
                    ScheduleStatus::Pending
                };

                ScheduleEntry {
                    id: med.id,
                    time: med.schedule_time.clone(),
                    task: med.name.clone(),
                    patient: m.patient_name.clone(),
                    status,
                    is_done,
                }
            })
            .collect();

        // sort_by is stable, so entries with equal times keep iteration order.
        // Lexical comparison is correct because times are zero-padded HH:MM.
        entries.sort_by(|a, b| a.time.cmp(&b.time));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::{DbConnection, PatientRepository, PatientStorage};
    use chrono::NaiveDate;
    use shared::{Medication, Recurrence};

    fn med_entry(
        id: i64,
        name: &str,
        time: &str,
        recurrence: Recurrence,
        last_taken: Option<NaiveDate>,
    ) -> MedicationWithPatient {
        MedicationWithPatient {
            medication: Medication {
                id,
                patient_id: 1,
                name: name.to_string(),
                dosage: "500mg".to_string(),
                instructions: "Before food".to_string(),
                schedule_time: time.to_string(),
                recurrence,
                stock: 28,
                max_stock: 30,
                last_taken,
            },
            patient_name: "Grandma".to_string(),
        }
    }

    // 2025-01-06 is a Monday, 2025-01-07 a Tuesday.
    fn monday_at(hour: u32, minute: u32) -> DateTime<Local> {
        FixedClock::at(2025, 1, 6, hour, minute).0
    }

    #[test]
    fn test_daily_medication_before_time_is_upcoming() {
        let meds = vec![med_entry(1, "Metformin", "08:00", Recurrence::Daily, None)];
        let entries = ScheduleService::due_today(monday_at(7, 0), &meds);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, ScheduleStatus::Upcoming);
        assert!(!entries[0].is_done);
    }

    #[test]
    fn test_daily_medication_after_time_is_pending() {
        let meds = vec![med_entry(1, "Metformin", "08:00", Recurrence::Daily, None)];
        let entries = ScheduleService::due_today(monday_at(9, 0), &meds);

        assert_eq!(entries[0].status, ScheduleStatus::Pending);
    }

    #[test]
    fn test_taken_today_is_completed() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let meds = vec![med_entry(1, "Metformin", "08:00", Recurrence::Daily, Some(today))];
        let entries = ScheduleService::due_today(monday_at(9, 0), &meds);

        assert_eq!(entries[0].status, ScheduleStatus::Completed);
        assert!(entries[0].is_done);
    }

    #[test]
    fn test_taken_yesterday_does_not_count_as_done() {
        let yesterday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let meds = vec![med_entry(1, "Metformin", "08:00", Recurrence::Daily, Some(yesterday))];
        let entries = ScheduleService::due_today(monday_at(9, 0), &meds);

        assert_eq!(entries[0].status, ScheduleStatus::Pending);
        assert!(!entries[0].is_done);
    }

    #[test]
    fn test_exact_time_tie_is_pending_not_upcoming() {
        let meds = vec![med_entry(1, "Metformin", "08:00", Recurrence::Daily, None)];
        let entries = ScheduleService::due_today(monday_at(8, 0), &meds);

        assert_eq!(entries[0].status, ScheduleStatus::Pending);
    }

    #[test]
    fn test_weekday_set_excludes_off_days_entirely() {
        let mon_wed = Recurrence::OnDays(vec![Weekday::Mon, Weekday::Wed]);
        let meds = vec![
            med_entry(1, "Metformin", "08:00", mon_wed.clone(), None),
            med_entry(2, "Aspirin", "09:00", Recurrence::Daily, None),
        ];

        // Tuesday: only the daily medication is scheduled
        let tuesday = FixedClock::at(2025, 1, 7, 10, 0).0;
        let entries = ScheduleService::due_today(tuesday, &meds);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].task, "Aspirin");

        // Monday: both are scheduled
        let entries = ScheduleService::due_today(monday_at(10, 0), &meds);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_entries_sorted_by_time_with_stable_ties() {
        let meds = vec![
            med_entry(1, "Evening pill", "20:00", Recurrence::Daily, None),
            med_entry(2, "Morning pill", "08:00", Recurrence::Daily, None),
            med_entry(3, "Second morning pill", "08:00", Recurrence::Daily, None),
        ];
        let entries = ScheduleService::due_today(monday_at(7, 0), &meds);

        assert_eq!(entries[0].id, 2);
        assert_eq!(entries[1].id, 3); // same time keeps iteration order
        assert_eq!(entries[2].id, 1);
    }

    #[test]
    fn test_due_today_is_idempotent() {
        let meds = vec![
            med_entry(1, "Metformin", "08:00", Recurrence::Daily, None),
            med_entry(2, "Aspirin", "14:00", Recurrence::Daily, None),
        ];
        let now = monday_at(9, 30);

        let first = ScheduleService::due_today(now, &meds);
        let second = ScheduleService::due_today(now, &meds);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_due_today_reads_store_through_clock() {
        let db = DbConnection::init_test().await.unwrap();
        let patients = PatientRepository::new(db.clone());
        let medications = MedicationRepository::new(db);

        let patient = patients.store_patient(1, "Grandma").await.unwrap();
        medications
            .store_medication(&shared::NewMedication {
                patient_id: patient.id,
                name: "Metformin".to_string(),
                dosage: "500mg".to_string(),
                instructions: "Before food".to_string(),
                schedule_time: "08:00".to_string(),
                recurrence: Recurrence::Daily,
                stock: 30,
                max_stock: 30,
            })
            .await
            .unwrap();

        let service = ScheduleService::new(
            medications,
            Arc::new(FixedClock::at(2025, 1, 6, 7, 0)),
        );
        let entries = service.get_due_today(1).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].patient, "Grandma");
        assert_eq!(entries[0].status, ScheduleStatus::Upcoming);
    }
}
