use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{
    models::{NewVacationRequest, VacationRequest, VacationStatus},
    utils::sql,
};
use crate::error::AppError;
use crate::services::ports::VacationRepository;

const COLUMNS: &str = r#"
    id,
    employee_id,
    creator_id,
    type,
    start_date,
    end_date,
    duration,
    reason,
    status,
    approved_by,
    approved_at,
    rejected_by,
    rejected_at,
    quota_exceeded,
    attachment,
    version,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct PgVacationRepository {
    pool: PgPool,
}

impl PgVacationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(&sql(
            "SELECT EXISTS (SELECT 1 FROM vacation_requests WHERE id = ?)",
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Explains a conditional write that matched no row.
    async fn missed_write(&self, id: i64, expected_version: i32) -> AppError {
        match self.exists(id).await {
            Ok(true) => {
                log::debug!(
                    "Stale write on vacation request {} (version {})",
                    id,
                    expected_version
                );
                AppError::Conflict(format!("vacation request {} was modified concurrently", id))
            }
            Ok(false) => AppError::not_found(format!("vacation request {}", id)),
            Err(err) => err,
        }
    }
}

#[async_trait]
impl VacationRepository for PgVacationRepository {
    async fn get(&self, id: i64) -> Result<Option<VacationRequest>, AppError> {
        let request = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            "SELECT {} FROM vacation_requests WHERE id = ?",
            COLUMNS
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn insert(&self, request: NewVacationRequest) -> Result<VacationRequest, AppError> {
        let stored = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            INSERT INTO
                vacation_requests (
                    employee_id,
                    creator_id,
                    type,
                    start_date,
                    end_date,
                    duration,
                    reason,
                    status,
                    quota_exceeded,
                    attachment,
                    version,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING {}
            "#,
            COLUMNS
        )))
        .bind(request.employee_id)
        .bind(request.creator_id)
        .bind(request.leave_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.duration)
        .bind(request.reason)
        .bind(VacationStatus::Pending)
        .bind(request.quota_exceeded)
        .bind(request.attachment)
        .bind(request.created_at)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn update(&self, request: &VacationRequest) -> Result<VacationRequest, AppError> {
        let stored = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            UPDATE vacation_requests
            SET
                employee_id = ?,
                type = ?,
                start_date = ?,
                end_date = ?,
                duration = ?,
                reason = ?,
                status = ?,
                approved_by = ?,
                approved_at = ?,
                rejected_by = ?,
                rejected_at = ?,
                quota_exceeded = ?,
                attachment = ?,
                updated_at = ?,
                version = version + 1
            WHERE
                id = ?
                AND version = ?
            RETURNING {}
            "#,
            COLUMNS
        )))
        .bind(request.employee_id)
        .bind(request.leave_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.duration)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.approved_by)
        .bind(request.approved_at)
        .bind(request.rejected_by)
        .bind(request.rejected_at)
        .bind(request.quota_exceeded)
        .bind(&request.attachment)
        .bind(request.updated_at)
        .bind(request.id)
        .bind(request.version)
        .fetch_optional(&self.pool)
        .await?;

        match stored {
            Some(stored) => Ok(stored),
            None => Err(self.missed_write(request.id, request.version).await),
        }
    }

    async fn delete(&self, id: i64, expected_version: i32) -> Result<(), AppError> {
        let result = sqlx::query(&sql(
            "DELETE FROM vacation_requests WHERE id = ? AND version = ?",
        ))
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        Err(self.missed_write(id, expected_version).await)
    }

    async fn list_by_employee(&self, employee_id: i64) -> Result<Vec<VacationRequest>, AppError> {
        let requests = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            SELECT {}
            FROM vacation_requests
            WHERE employee_id = ?
            ORDER BY created_at DESC
            "#,
            COLUMNS
        )))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn list_by_tenant(&self, tenant_id: i64) -> Result<Vec<VacationRequest>, AppError> {
        let requests = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            SELECT {}
            FROM vacation_requests
            WHERE employee_id IN (SELECT id FROM employees WHERE tenant_id = ?)
            ORDER BY created_at DESC
            "#,
            COLUMNS
        )))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
