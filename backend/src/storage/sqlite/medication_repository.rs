use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Medication, MedicationWithPatient, NewActivityEntry, NewMedication, Recurrence};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

use crate::storage::connection::DbConnection;
use crate::storage::traits::MedicationStorage;

/// Repository for medication operations
#[derive(Clone)]
pub struct MedicationRepository {
    db: DbConnection,
}

impl MedicationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn from_row(row: &SqliteRow) -> Result<Medication> {
        let recurrence: String = row.get("recurrence");
        let last_taken: Option<String> = row.get("last_taken");
        let last_taken = match last_taken {
            Some(date) => Some(NaiveDate::parse_from_str(&date, "%Y-%m-%d")?),
            None => None,
        };

        Ok(Medication {
            id: row.get("id"),
            patient_id: row.get("patient_id"),
            name: row.get("name"),
            dosage: row.get("dosage"),
            instructions: row.get("instructions"),
            schedule_time: row.get("schedule_time"),
            recurrence: Recurrence::from_str(&recurrence)?,
            stock: row.get("stock"),
            max_stock: row.get("max_stock"),
            last_taken,
        })
    }
}

#[async_trait]
impl MedicationStorage for MedicationRepository {
    /// Store a medication in the database and return it with its new ID
    async fn store_medication(&self, medication: &NewMedication) -> Result<Medication> {
        let result = sqlx::query(
            r#"
            INSERT INTO medications
                (patient_id, name, dosage, instructions, schedule_time, recurrence, stock, max_stock)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(medication.patient_id)
        .bind(&medication.name)
        .bind(&medication.dosage)
        .bind(&medication.instructions)
        .bind(&medication.schedule_time)
        .bind(medication.recurrence.descriptor())
        .bind(medication.stock)
        .bind(medication.max_stock)
        .execute(self.db.pool())
        .await?;

        Ok(Medication {
            id: result.last_insert_rowid(),
            patient_id: medication.patient_id,
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            instructions: medication.instructions.clone(),
            schedule_time: medication.schedule_time.clone(),
            recurrence: medication.recurrence.clone(),
            stock: medication.stock,
            max_stock: medication.max_stock,
            last_taken: None,
        })
    }

    /// Get a medication by ID
    async fn get_medication(&self, medication_id: i64) -> Result<Option<Medication>> {
        let row = sqlx::query(
            r#"
            SELECT id, patient_id, name, dosage, instructions, schedule_time,
                   recurrence, stock, max_stock, last_taken
            FROM medications
            WHERE id = ?
            "#,
        )
        .bind(medication_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Self::from_row(&r)?)),
            None => Ok(None),
        }
    }

    /// List one patient's medications ordered by scheduled time
    async fn list_for_patient(&self, patient_id: i64) -> Result<Vec<Medication>> {
        let rows = sqlx::query(
            r#"
            SELECT id, patient_id, name, dosage, instructions, schedule_time,
                   recurrence, stock, max_stock, last_taken
            FROM medications
            WHERE patient_id = ?
            ORDER BY schedule_time ASC, id ASC
            "#,
        )
        .bind(patient_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// List all medications across an account's patients with patient names
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<MedicationWithPatient>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.patient_id, m.name, m.dosage, m.instructions,
                   m.schedule_time, m.recurrence, m.stock, m.max_stock,
                   m.last_taken, p.name AS patient_name
            FROM medications m
            JOIN patients p ON p.id = m.patient_id
            WHERE p.account_id = ?
            ORDER BY m.patient_id ASC, m.id ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MedicationWithPatient {
                    medication: Self::from_row(row)?,
                    patient_name: row.get("patient_name"),
                })
            })
            .collect()
    }

    /// Update a medication's mutable fields
    async fn update_medication(&self, medication: &Medication) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE medications
            SET stock = ?, last_taken = ?
            WHERE id = ?
            "#,
        )
        .bind(medication.stock)
        .bind(medication.last_taken.map(|d| d.to_string()))
        .bind(medication.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a medication by ID
    async fn delete_medication(&self, medication_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM medications WHERE id = ?
            "#,
        )
        .bind(medication_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist a dose transition and its audit entry in one transaction
    async fn commit_dose_transition(
        &self,
        medication: &Medication,
        entry: &NewActivityEntry,
    ) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            UPDATE medications
            SET stock = ?, last_taken = ?
            WHERE id = ?
            "#,
        )
        .bind(medication.stock)
        .bind(medication.last_taken.map(|d| d.to_string()))
        .bind(medication.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO activity_log (account_id, action, detail, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.account_id)
        .bind(&entry.action)
        .bind(&entry.detail)
        .bind(&entry.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::patient_repository::PatientRepository;
    use crate::storage::traits::{ActivityStorage, PatientStorage};
    use shared::Weekday;

    async fn setup_test() -> (MedicationRepository, PatientRepository) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        (MedicationRepository::new(db.clone()), PatientRepository::new(db))
    }

    fn new_medication(patient_id: i64, name: &str, time: &str, recurrence: Recurrence) -> NewMedication {
        NewMedication {
            patient_id,
            name: name.to_string(),
            dosage: "500mg".to_string(),
            instructions: "Before food".to_string(),
            schedule_time: time.to_string(),
            recurrence,
            stock: 30,
            max_stock: 30,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_medication() {
        let (meds, patients) = setup_test().await;
        let patient = patients.store_patient(1, "Grandma").await.unwrap();

        let stored = meds
            .store_medication(&new_medication(
                patient.id,
                "Metformin",
                "08:00",
                Recurrence::OnDays(vec![Weekday::Mon, Weekday::Wed]),
            ))
            .await
            .unwrap();

        let fetched = meds.get_medication(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(
            fetched.recurrence,
            Recurrence::OnDays(vec![Weekday::Mon, Weekday::Wed])
        );
        assert_eq!(fetched.last_taken, None);
    }

    #[tokio::test]
    async fn test_get_nonexistent_medication() {
        let (meds, _patients) = setup_test().await;
        let fetched = meds.get_medication(9999).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_update_medication_persists_stock_and_last_taken() {
        let (meds, patients) = setup_test().await;
        let patient = patients.store_patient(1, "Grandma").await.unwrap();
        let mut med = meds
            .store_medication(&new_medication(patient.id, "Aspirin", "14:00", Recurrence::Daily))
            .await
            .unwrap();

        med.stock = 29;
        med.last_taken = Some(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        meds.update_medication(&med).await.unwrap();

        let fetched = meds.get_medication(med.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock, 29);
        assert_eq!(fetched.last_taken, Some(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()));
    }

    #[tokio::test]
    async fn test_list_for_account_joins_patient_names() {
        let (meds, patients) = setup_test().await;
        let grandma = patients.store_patient(1, "Grandma").await.unwrap();
        let grandpa = patients.store_patient(1, "Grandpa").await.unwrap();
        let other = patients.store_patient(2, "Stranger").await.unwrap();

        meds.store_medication(&new_medication(grandma.id, "Metformin", "08:00", Recurrence::Daily))
            .await
            .unwrap();
        meds.store_medication(&new_medication(grandpa.id, "Lisinopril", "09:00", Recurrence::Daily))
            .await
            .unwrap();
        meds.store_medication(&new_medication(other.id, "Unrelated", "10:00", Recurrence::Daily))
            .await
            .unwrap();

        let listed = meds.list_for_account(1).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].patient_name, "Grandma");
        assert_eq!(listed[1].patient_name, "Grandpa");
    }

    #[tokio::test]
    async fn test_commit_dose_transition_writes_both_rows() {
        let (meds, patients) = setup_test().await;
        let patient = patients.store_patient(1, "Grandma").await.unwrap();
        let mut med = meds
            .store_medication(&new_medication(patient.id, "Metformin", "08:00", Recurrence::Daily))
            .await
            .unwrap();

        med.stock -= 1;
        med.last_taken = Some(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        let entry = NewActivityEntry {
            account_id: 1,
            action: "Dispensed Metformin".to_string(),
            detail: format!("Manual check-off. Stock remaining: {}", med.stock),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        meds.commit_dose_transition(&med, &entry).await.unwrap();

        let fetched = meds.get_medication(med.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock, 29);

        let activity = crate::storage::sqlite::activity_repository::ActivityRepository::new(
            meds.db.clone(),
        );
        let entries = activity.list_for_account(1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "Dispensed Metformin");
    }
}
