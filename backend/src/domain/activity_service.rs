//! Append-only activity trail.

use anyhow::Result;
use chrono::Utc;
use shared::{ActivityEntry, NewActivityEntry};
use tracing::info;

use crate::storage::{ActivityRepository, ActivityStorage};

/// Service wrapping the append-only audit trail.
///
/// Exposes append and list only; entries are never updated or deleted.
#[derive(Clone)]
pub struct ActivityService {
    activity: ActivityRepository,
}

impl ActivityService {
    pub fn new(activity: ActivityRepository) -> Self {
        Self { activity }
    }

    /// Append an entry stamped with the current time
    pub async fn record(&self, account_id: i64, action: &str, detail: &str) -> Result<ActivityEntry> {
        let entry = self
            .activity
            .append(&NewActivityEntry {
                account_id,
                action: action.to_string(),
                detail: detail.to_string(),
                timestamp: Utc::now().to_rfc3339(),
            })
            .await?;

        info!("Logged activity for account {}: {}", account_id, action);
        Ok(entry)
    }

    /// List an account's history newest-first
    pub async fn list_for(&self, account_id: i64) -> Result<Vec<ActivityEntry>> {
        self.activity.list_for_account(account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;

    async fn setup_test() -> ActivityService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        ActivityService::new(ActivityRepository::new(db))
    }

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let service = setup_test().await;

        service.record(1, "Dispensed Metformin", "Stock remaining: 29").await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(2)).await;
        service.record(1, "EMERGENCY ALERT", "Patient pressed Panic Button").await.unwrap();

        let entries = service.list_for(1).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "EMERGENCY ALERT");
        assert_eq!(entries[1].action, "Dispensed Metformin");
    }

    #[tokio::test]
    async fn test_accounts_are_isolated() {
        let service = setup_test().await;

        service.record(1, "Dispensed Metformin", "Stock remaining: 29").await.unwrap();
        service.record(2, "Dispensed Aspirin", "Stock remaining: 12").await.unwrap();

        let entries = service.list_for(1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "Dispensed Metformin");
    }
}
