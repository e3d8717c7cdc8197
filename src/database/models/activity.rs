use serde::{Deserialize, Serialize};

use super::macros::string_enum;

/// Entity type recorded for every vacation activity.
pub const VACATION_ENTITY: &str = "vacation";

/// What the audit trail receives from the vacation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub entity_type: String,
    pub entity_id: i64,
    pub description: String,
    pub actor_id: i64,
    pub details: serde_json::Value,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum ActivityType {
        Create => "create",
        Update => "update",
        Delete => "delete",
        VacationStatusUpdate => "vacation_status_update",
    }
}
