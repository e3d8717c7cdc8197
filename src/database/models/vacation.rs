use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::macros::string_enum;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    pub id: i64,
    pub employee_id: i64,
    pub creator_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: i32, // working days
    pub reason: Option<String>,
    pub status: VacationStatus,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<i64>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub quota_exceeded: bool,
    pub attachment: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated request ready to be inserted; the store assigns `id` and `version`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVacationRequest {
    pub employee_id: i64,
    pub creator_id: i64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: i32,
    pub reason: Option<String>,
    pub quota_exceeded: bool,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw create payload. Required fields are optional here so that missing
/// values surface as validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVacationInput {
    pub employee_id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date::option")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub leave_type: Option<String>,
    pub duration: Option<i32>,
    pub reason: Option<String>,
    pub attachment: Option<String>,
}

/// Fields an update may touch. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationPatch {
    pub employee_id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date::option")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub leave_type: Option<String>,
    pub reason: Option<String>,
}

impl VacationPatch {
    pub fn is_empty(&self) -> bool {
        self.employee_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.leave_type.is_none()
            && self.reason.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationFilter {
    pub employee_id: Option<i64>,
    pub status: Option<VacationStatus>,
    #[serde(rename = "type")]
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl VacationFilter {
    /// `start_date`/`end_date` select requests overlapping the given window.
    pub fn matches(&self, request: &VacationRequest) -> bool {
        self.employee_id.is_none_or(|id| request.employee_id == id)
            && self.status.is_none_or(|status| request.status == status)
            && self.leave_type.is_none_or(|t| request.leave_type == t)
            && self.start_date.is_none_or(|from| request.end_date >= from)
            && self.end_date.is_none_or(|to| request.start_date <= to)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveType {
        Paid => "paid",
        Unpaid => "unpaid",
        Sick => "sick",
        Rtt => "rtt",
        Exceptional => "exceptional",
        Recovery => "recovery",
        Other => "other",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "snake_case")]
    pub enum VacationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Accepts `YYYY-MM-DD` as well as full RFC 3339 timestamps, keeping only the
/// calendar date.
pub mod flexible_date {
    use super::*;

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).date_naive())
            })
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
    }

    pub fn option<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
        }
    }
}
