use std::sync::Arc;

use futures::future::join_all;

use crate::database::models::{ActivityRecord, ActivityType, Notification, VACATION_ENTITY};
use crate::services::ports::{AuditTrail, NotificationDispatcher};

/// Emits audit records and notifications after a change has been committed.
/// Failures are logged and swallowed: they never reach the caller.
#[derive(Clone)]
pub struct ActivityLogger {
    audit: Arc<dyn AuditTrail>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl ActivityLogger {
    pub fn new(audit: Arc<dyn AuditTrail>, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        Self { audit, notifier }
    }

    /// Log vacation management activity
    pub async fn log_vacation_activity(
        &self,
        actor_id: i64,
        vacation_id: i64,
        activity_type: ActivityType,
        description: String,
        details: serde_json::Value,
    ) {
        let record = ActivityRecord {
            activity_type,
            entity_type: VACATION_ENTITY.to_string(),
            entity_id: vacation_id,
            description,
            actor_id,
            details,
        };

        if let Err(err) = self.audit.record(record).await {
            log::warn!(
                "Failed to record {} activity for vacation {}: {}",
                activity_type,
                vacation_id,
                err
            );
        }
    }

    /// Sends every notification concurrently; returns how many were delivered.
    pub async fn notify_all(&self, notifications: Vec<Notification>) -> usize {
        let sends = notifications.into_iter().map(|notification| async move {
            let user_id = notification.user_id;
            match self.notifier.send(notification).await {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Failed to notify user {}: {}", user_id, err);
                    false
                }
            }
        });

        join_all(sends).await.into_iter().filter(|sent| *sent).count()
    }

    pub async fn notify(&self, notification: Notification) -> bool {
        self.notify_all(vec![notification]).await == 1
    }
}
