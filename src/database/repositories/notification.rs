use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{models::Notification, utils::sql};
use crate::error::AppError;
use crate::services::ports::NotificationDispatcher;

/// Stores notifications in the `notifications` table; clients poll them.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationDispatcher for PgNotificationStore {
    async fn send(&self, notification: Notification) -> Result<(), AppError> {
        sqlx::query(&sql(r#"
            INSERT INTO
                notifications (user_id, title, message, type, link)
            VALUES
                (?, ?, ?, ?, ?)
        "#))
        .bind(notification.user_id)
        .bind(notification.title)
        .bind(notification.message)
        .bind(notification.kind)
        .bind(notification.link)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
