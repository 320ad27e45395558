use anyhow::Result;
use async_trait::async_trait;
use shared::{ActivityEntry, NewActivityEntry};
use sqlx::Row;

use crate::storage::connection::DbConnection;
use crate::storage::traits::ActivityStorage;

/// Repository for the append-only activity log
///
/// Intentionally exposes no update or delete. Entries are immutable once
/// written.
#[derive(Clone)]
pub struct ActivityRepository {
    db: DbConnection,
}

impl ActivityRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityStorage for ActivityRepository {
    /// Append an entry and return it with its new ID
    async fn append(&self, entry: &NewActivityEntry) -> Result<ActivityEntry> {
        let result = sqlx::query(
            r#"
            INSERT INTO activity_log (account_id, action, detail, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.account_id)
        .bind(&entry.action)
        .bind(&entry.detail)
        .bind(&entry.timestamp)
        .execute(self.db.pool())
        .await?;

        Ok(ActivityEntry {
            id: result.last_insert_rowid(),
            account_id: entry.account_id,
            action: entry.action.clone(),
            detail: entry.detail.clone(),
            timestamp: entry.timestamp.clone(),
        })
    }

    /// List an account's entries newest-first
    async fn list_for_account(&self, account_id: i64) -> Result<Vec<ActivityEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, action, detail, timestamp
            FROM activity_log
            WHERE account_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        let entries = rows
            .iter()
            .map(|row| ActivityEntry {
                id: row.get("id"),
                account_id: row.get("account_id"),
                action: row.get("action"),
                detail: row.get("detail"),
                timestamp: row.get("timestamp"),
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(account_id: i64, action: &str, timestamp: &str) -> NewActivityEntry {
        NewActivityEntry {
            account_id,
            action: action.to_string(),
            detail: "test detail".to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_and_list_newest_first() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = ActivityRepository::new(db);

        repo.append(&entry(1, "Dispensed Metformin", "2025-01-06T08:01:00+00:00"))
            .await
            .unwrap();
        repo.append(&entry(1, "Undo: Metformin", "2025-01-06T08:05:00+00:00"))
            .await
            .unwrap();
        repo.append(&entry(2, "EMERGENCY ALERT", "2025-01-06T09:00:00+00:00"))
            .await
            .unwrap();

        let entries = repo.list_for_account(1).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "Undo: Metformin");
        assert_eq!(entries[1].action, "Dispensed Metformin");
    }

    #[tokio::test]
    async fn test_equal_timestamps_break_ties_by_id() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = ActivityRepository::new(db);

        let first = repo
            .append(&entry(1, "first", "2025-01-06T08:00:00+00:00"))
            .await
            .unwrap();
        let second = repo
            .append(&entry(1, "second", "2025-01-06T08:00:00+00:00"))
            .await
            .unwrap();
        assert!(second.id > first.id);

        let entries = repo.list_for_account(1).await.unwrap();
        assert_eq!(entries[0].action, "second");
        assert_eq!(entries[1].action, "first");
    }
}
