use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{models::Role, utils::sql};
use crate::error::AppError;
use crate::services::ports::OwnershipResolver;

/// Resolves employees to tenants from the `employees` and `users` tables.
#[derive(Clone)]
pub struct PgOwnershipResolver {
    pool: PgPool,
}

impl PgOwnershipResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnershipResolver for PgOwnershipResolver {
    async fn tenant_of(&self, employee_id: i64) -> Result<Option<i64>, AppError> {
        let tenant_id = sqlx::query_scalar::<_, i64>(&sql(
            "SELECT tenant_id FROM employees WHERE id = ?",
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant_id)
    }

    async fn tenant_staff(&self, tenant_id: i64) -> Result<Vec<i64>, AppError> {
        let staff = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT id
            FROM users
            WHERE tenant_id = ?
              AND role IN (?, ?)
            ORDER BY id
        "#))
        .bind(tenant_id)
        .bind(Role::Manager)
        .bind(Role::Admin)
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }
}
