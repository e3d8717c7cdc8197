use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};

use crate::database::models::{LeaveType, VacationStatus};
use crate::error::AppError;
use crate::services::ports::{EntitlementSource, VacationRepository};

/// Yearly quotas per leave type, read from configuration. What is left is
/// the quota minus the working days of the employee's pending and approved
/// requests of that type starting in the current year.
#[derive(Clone)]
pub struct StaticEntitlements {
    quotas: HashMap<LeaveType, i32>,
    repository: Arc<dyn VacationRepository>,
}

impl StaticEntitlements {
    pub fn new(quotas: HashMap<LeaveType, i32>, repository: Arc<dyn VacationRepository>) -> Self {
        Self { quotas, repository }
    }

    pub fn quota(&self, leave_type: LeaveType) -> Option<i32> {
        self.quotas.get(&leave_type).copied()
    }
}

#[async_trait]
impl EntitlementSource for StaticEntitlements {
    async fn remaining_quota(
        &self,
        employee_id: i64,
        leave_type: LeaveType,
    ) -> Result<Option<i32>, AppError> {
        let Some(quota) = self.quota(leave_type) else {
            return Ok(None);
        };

        let year = Utc::now().year();
        let used: i32 = self
            .repository
            .list_by_employee(employee_id)
            .await?
            .iter()
            .filter(|r| r.leave_type == leave_type)
            .filter(|r| r.status != VacationStatus::Rejected)
            .filter(|r| r.start_date.year() == year)
            .map(|r| r.duration)
            .sum();

        Ok(Some((quota - used).max(0)))
    }
}
