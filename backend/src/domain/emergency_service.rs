//! Manual and emergency request recording.

use anyhow::Result;
use shared::{RecordRequestRequest, RecordRequestResponse, RequestKind};
use std::sync::Arc;
use tracing::warn;

use crate::domain::activity_service::ActivityService;
use crate::domain::notifier::Notifier;

/// Service that records dashboard requests and raises emergency alerts
#[derive(Clone)]
pub struct EmergencyService {
    activity: ActivityService,
    notifier: Arc<dyn Notifier>,
}

impl EmergencyService {
    pub fn new(activity: ActivityService, notifier: Arc<dyn Notifier>) -> Self {
        Self { activity, notifier }
    }

    /// Record a manual request; a help request also alerts the caregiver.
    ///
    /// The alert is attempted first so its outcome can be captured in the
    /// log detail, but the log entry is committed whether or not delivery
    /// succeeded. Delivery failure never surfaces as an error to the caller.
    pub async fn record_request(
        &self,
        request: RecordRequestRequest,
    ) -> Result<RecordRequestResponse> {
        match request.kind {
            RequestKind::Help => {
                let note = request
                    .note
                    .unwrap_or_else(|| "Patient pressed Panic Button".to_string());
                let body = format!("Emergency assistance requested.\n\n{}", note);

                let delivered = self.notifier.send("EMERGENCY ALERT", &body).await;
                let detail = if delivered {
                    format!("{}; caregiver notified", note)
                } else {
                    format!("{}; alert delivery failed", note)
                };

                self.activity
                    .record(request.account_id, "EMERGENCY ALERT", &detail)
                    .await?;
                warn!("Emergency alert recorded for account {}", request.account_id);

                Ok(RecordRequestResponse {
                    success_message: "Emergency alert recorded".to_string(),
                })
            }
            kind => {
                self.activity
                    .record(
                        request.account_id,
                        &format!("Requested {}", kind),
                        "Manual request via dashboard",
                    )
                    .await?;

                Ok(RecordRequestResponse {
                    success_message: format!("{} request received", kind),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ActivityRepository, DbConnection};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Notifier fake that records every send and answers with a canned
    /// delivery result.
    struct RecordingNotifier {
        delivered: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn new(delivered: bool) -> Self {
            Self {
                delivered,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, subject: &str, body: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string()));
            self.delivered
        }
    }

    async fn setup_test(delivered: bool) -> (EmergencyService, ActivityService, Arc<RecordingNotifier>) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let activity = ActivityService::new(ActivityRepository::new(db));
        let notifier = Arc::new(RecordingNotifier::new(delivered));
        (
            EmergencyService::new(activity.clone(), notifier.clone()),
            activity,
            notifier,
        )
    }

    fn help_request(note: Option<&str>) -> RecordRequestRequest {
        RecordRequestRequest {
            account_id: 1,
            kind: RequestKind::Help,
            note: note.map(|n| n.to_string()),
        }
    }

    #[tokio::test]
    async fn test_help_request_notifies_and_logs_delivery() {
        let (service, activity, notifier) = setup_test(true).await;

        service.record_request(help_request(None)).await.unwrap();

        let calls = notifier.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "EMERGENCY ALERT");

        let entries = activity.list_for(1).await.unwrap();
        assert_eq!(entries[0].action, "EMERGENCY ALERT");
        assert!(entries[0].detail.contains("caregiver notified"));
    }

    #[tokio::test]
    async fn test_failed_delivery_still_records_the_emergency() {
        let (service, activity, _notifier) = setup_test(false).await;

        let response = service
            .record_request(help_request(Some("Fall detected in hallway")))
            .await
            .unwrap();
        assert_eq!(response.success_message, "Emergency alert recorded");

        let entries = activity.list_for(1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].detail.contains("Fall detected in hallway"));
        assert!(entries[0].detail.contains("alert delivery failed"));
    }

    #[tokio::test]
    async fn test_water_request_logs_without_notification() {
        let (service, activity, notifier) = setup_test(true).await;

        service
            .record_request(RecordRequestRequest {
                account_id: 1,
                kind: RequestKind::Water,
                note: None,
            })
            .await
            .unwrap();

        assert!(notifier.calls.lock().unwrap().is_empty());

        let entries = activity.list_for(1).await.unwrap();
        assert_eq!(entries[0].action, "Requested Water");
    }
}
