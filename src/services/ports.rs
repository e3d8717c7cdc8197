//! Collaborators the vacation service depends on. Postgres implementations
//! live in `database::repositories`; tests substitute in-memory ones.

use async_trait::async_trait;

use crate::database::models::{
    ActivityRecord, LeaveType, NewVacationRequest, Notification, VacationRequest,
};
use crate::error::AppError;

#[async_trait]
pub trait VacationRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<VacationRequest>, AppError>;

    /// Persists a new request with status `pending` and version 1.
    async fn insert(&self, request: NewVacationRequest) -> Result<VacationRequest, AppError>;

    /// Writes every mutable field of `request`, but only if the stored row
    /// still carries `request.version`. Returns the stored row with its
    /// version bumped, `AppError::Conflict` on a stale version, or
    /// `AppError::NotFound` if the row is gone.
    async fn update(&self, request: &VacationRequest) -> Result<VacationRequest, AppError>;

    /// Removes the row only if it still carries `expected_version`, with the
    /// same `Conflict` / `NotFound` outcomes as `update`.
    async fn delete(&self, id: i64, expected_version: i32) -> Result<(), AppError>;

    async fn list_by_employee(&self, employee_id: i64) -> Result<Vec<VacationRequest>, AppError>;

    async fn list_by_tenant(&self, tenant_id: i64) -> Result<Vec<VacationRequest>, AppError>;
}

#[async_trait]
pub trait OwnershipResolver: Send + Sync {
    /// `None` when the employee does not exist.
    async fn tenant_of(&self, employee_id: i64) -> Result<Option<i64>, AppError>;

    /// Managers and admins belonging to the tenant.
    async fn tenant_staff(&self, tenant_id: i64) -> Result<Vec<i64>, AppError>;
}

#[async_trait]
pub trait EntitlementSource: Send + Sync {
    /// Remaining working days of `leave_type` for the employee, or `None`
    /// when the type carries no quota.
    async fn remaining_quota(
        &self,
        employee_id: i64,
        leave_type: LeaveType,
    ) -> Result<Option<i32>, AppError>;
}

#[async_trait]
pub trait AuditTrail: Send + Sync {
    async fn record(&self, record: ActivityRecord) -> Result<(), AppError>;
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), AppError>;
}
