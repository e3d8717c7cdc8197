use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use super::vacation::{LeaveType, VacationRequest, VacationStatus};

const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationStats {
    pub total_requests: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_type: BTreeMap<String, i64>,
    /// Requests starting in each month (1-12) of `year`.
    pub by_month: BTreeMap<u32, i64>,
    pub year: i32,
    /// Working days across approved requests.
    pub total_approved_days: i64,
    pub recent_requests: Vec<VacationRequest>,
}

impl VacationStats {
    pub fn compute(requests: &[VacationRequest], year: i32) -> Self {
        let mut by_status: BTreeMap<String, i64> = VacationStatus::ALL
            .iter()
            .map(|status| (status.to_string(), 0))
            .collect();
        let mut by_type: BTreeMap<String, i64> = BTreeMap::new();
        let mut by_month: BTreeMap<u32, i64> = BTreeMap::new();
        let mut total_approved_days = 0i64;

        for request in requests {
            *by_status.entry(request.status.to_string()).or_default() += 1;
            *by_type.entry(request.leave_type.to_string()).or_default() += 1;

            if request.start_date.year() == year {
                *by_month.entry(request.start_date.month()).or_default() += 1;
            }

            if request.status == VacationStatus::Approved {
                total_approved_days += i64::from(request.duration);
            }
        }

        let mut recent_requests = requests.to_vec();
        recent_requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_requests.truncate(RECENT_LIMIT);

        Self {
            total_requests: requests.len() as i64,
            by_status,
            by_type,
            by_month,
            year,
            total_approved_days,
            recent_requests,
        }
    }

    pub fn count_for_type(&self, leave_type: LeaveType) -> i64 {
        self.by_type
            .get(leave_type.as_str())
            .copied()
            .unwrap_or_default()
    }
}
