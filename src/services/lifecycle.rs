//! Status state machine for vacation requests.
//!
//! | from | command     | to       |
//! |------|-------------|----------|
//! | any  | approve     | approved |
//! | any  | reject      | rejected |
//! | any  | set_pending | pending  |
//!
//! Every status can reach every other one. Re-applying the current status
//! is a no-op. Authorization is the caller's job.

use chrono::{DateTime, Utc};

use crate::database::models::{VacationRequest, VacationStatus};
use crate::error::AppError;

pub const REJECTION_PREFIX: &str = "Motif de rejet";

/// A status change, resolved from the requested target status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCommand {
    Approve { by: i64 },
    Reject { by: i64, note: Option<String> },
    SetPending,
}

impl StatusCommand {
    pub fn for_target(target: VacationStatus, actor_id: i64, note: Option<String>) -> Self {
        match target {
            VacationStatus::Approved => StatusCommand::Approve { by: actor_id },
            VacationStatus::Rejected => StatusCommand::Reject { by: actor_id, note },
            VacationStatus::Pending => StatusCommand::SetPending,
        }
    }

    pub fn target(&self) -> VacationStatus {
        match self {
            StatusCommand::Approve { .. } => VacationStatus::Approved,
            StatusCommand::Reject { .. } => VacationStatus::Rejected,
            StatusCommand::SetPending => VacationStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied {
        from: VacationStatus,
        to: VacationStatus,
    },
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleManager;

impl LifecycleManager {
    pub fn new() -> Self {
        Self
    }

    /// Parses a client-supplied status. Anything outside the closed set is
    /// an `InvalidTransition`.
    pub fn parse_status(&self, raw: &str) -> Result<VacationStatus, AppError> {
        raw.parse::<VacationStatus>().map_err(|_| {
            AppError::InvalidTransition(format!(
                "'{}' is not one of pending, approved, rejected",
                raw
            ))
        })
    }

    /// Applies `command` to `request` in place and reports whether anything
    /// changed. `updated_at` moves only on an applied transition.
    pub fn apply(
        &self,
        request: &mut VacationRequest,
        command: StatusCommand,
        now: DateTime<Utc>,
    ) -> Transition {
        let from = request.status;
        let to = command.target();

        if from == to {
            return Transition::Unchanged;
        }

        match command {
            StatusCommand::Approve { by } => {
                request.approved_by = Some(by);
                request.approved_at = Some(now);
                request.rejected_by = None;
                request.rejected_at = None;
            }
            StatusCommand::Reject { by, note } => {
                request.rejected_by = Some(by);
                request.rejected_at = Some(now);
                request.approved_by = None;
                request.approved_at = None;
                if let Some(note) = note.as_deref().filter(|n| !n.trim().is_empty()) {
                    request.reason = Some(annotate_rejection(request.reason.as_deref(), note));
                }
            }
            StatusCommand::SetPending => {
                request.approved_by = None;
                request.approved_at = None;
                request.rejected_by = None;
                request.rejected_at = None;
            }
        }

        request.status = to;
        request.updated_at = now;

        Transition::Applied { from, to }
    }

    /// Field edits are only allowed on pending requests.
    pub fn ensure_editable(&self, request: &VacationRequest) -> Result<(), AppError> {
        match request.status {
            VacationStatus::Pending => Ok(()),
            VacationStatus::Approved | VacationStatus::Rejected => Err(AppError::validation(
                format!("request {} is {} and can no longer be edited", request.id, request.status),
            )),
        }
    }
}

/// Appends a rejection note to the free-text reason.
pub fn annotate_rejection(reason: Option<&str>, note: &str) -> String {
    let note = note.trim();
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("{} | {}: {}", reason, REJECTION_PREFIX, note),
        None => format!("{}: {}", REJECTION_PREFIX, note),
    }
}
