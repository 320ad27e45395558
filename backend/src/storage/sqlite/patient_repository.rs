use anyhow::Result;
use async_trait::async_trait;
use shared::Patient;
use sqlx::Row;

use crate::storage::connection::DbConnection;
use crate::storage::traits::PatientStorage;

/// Repository for patient operations
#[derive(Clone)]
pub struct PatientRepository {
    db: DbConnection,
}

impl PatientRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PatientStorage for PatientRepository {
    /// Store a patient and return it with its new ID
    async fn store_patient(&self, account_id: i64, name: &str) -> Result<Patient> {
        let result = sqlx::query(
            r#"
            INSERT INTO patients (account_id, name)
            VALUES (?, ?)
            "#,
        )
        .bind(account_id)
        .bind(name)
        .execute(self.db.pool())
        .await?;

        Ok(Patient {
            id: result.last_insert_rowid(),
            account_id,
            name: name.to_string(),
        })
    }

    /// Get a patient by ID
    async fn get_patient(&self, patient_id: i64) -> Result<Option<Patient>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, name
            FROM patients
            WHERE id = ?
            "#,
        )
        .bind(patient_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Patient {
                id: r.get("id"),
                account_id: r.get("account_id"),
                name: r.get("name"),
            })),
            None => Ok(None),
        }
    }

    /// List all patients for an account in creation order
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<Patient>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, name
            FROM patients
            WHERE account_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        let patients = rows
            .iter()
            .map(|row| Patient {
                id: row.get("id"),
                account_id: row.get("account_id"),
                name: row.get("name"),
            })
            .collect();

        Ok(patients)
    }

    /// Delete all of an account's patients and their medications
    ///
    /// The medication delete runs in the same transaction so a roster
    /// replace never leaves orphaned medications behind.
    async fn delete_for_account(&self, account_id: i64) -> Result<u64> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            DELETE FROM medications
            WHERE patient_id IN (SELECT id FROM patients WHERE account_id = ?)
            "#,
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            DELETE FROM patients WHERE account_id = ?
            "#,
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
