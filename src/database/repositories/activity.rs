use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{models::ActivityRecord, utils::sql};
use crate::error::AppError;
use crate::services::ports::AuditTrail;

#[derive(Clone)]
pub struct PgActivityTrail {
    pool: PgPool,
}

impl PgActivityTrail {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditTrail for PgActivityTrail {
    async fn record(&self, record: ActivityRecord) -> Result<(), AppError> {
        sqlx::query(&sql(r#"
            INSERT INTO
                activities (type, entity_type, entity_id, description, user_id, details)
            VALUES
                (?, ?, ?, ?, ?, ?)
        "#))
        .bind(record.activity_type)
        .bind(record.entity_type)
        .bind(record.entity_id)
        .bind(record.description)
        .bind(record.actor_id)
        .bind(record.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
