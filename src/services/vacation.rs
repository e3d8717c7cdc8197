use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::json;

use crate::database::models::{
    ActivityType, Actor, CreateVacationInput, LeaveType, NewVacationRequest, Notification,
    NotificationKind, VacationFilter, VacationPatch, VacationRequest, VacationStats,
    VacationStatus,
};
use crate::error::AppError;
use crate::services::activity_logger::ActivityLogger;
use crate::services::authorization::{Action, AuthorizationGuard, Scope, Subject};
use crate::services::duration::working_days;
use crate::services::lifecycle::{LifecycleManager, StatusCommand, Transition};
use crate::services::ports::{
    AuditTrail, EntitlementSource, NotificationDispatcher, OwnershipResolver, VacationRepository,
};

const VACATIONS_LINK: &str = "/vacations";

/// Create, update, approve/reject, delete and query vacation requests on
/// behalf of an authenticated actor.
///
/// Every use case loads, authorizes, mutates, persists, and only then emits
/// audit records and notifications. Emission failures never change the
/// returned result.
#[derive(Clone)]
pub struct VacationService {
    repository: Arc<dyn VacationRepository>,
    ownership: Arc<dyn OwnershipResolver>,
    entitlements: Option<Arc<dyn EntitlementSource>>,
    guard: AuthorizationGuard,
    lifecycle: LifecycleManager,
    activity: ActivityLogger,
}

impl VacationService {
    pub fn new(
        repository: Arc<dyn VacationRepository>,
        ownership: Arc<dyn OwnershipResolver>,
        audit: Arc<dyn AuditTrail>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            guard: AuthorizationGuard::new(ownership.clone()),
            repository,
            ownership,
            entitlements: None,
            lifecycle: LifecycleManager::new(),
            activity: ActivityLogger::new(audit, notifier),
        }
    }

    pub fn with_entitlements(mut self, entitlements: Arc<dyn EntitlementSource>) -> Self {
        self.entitlements = Some(entitlements);
        self
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateVacationInput,
    ) -> Result<VacationRequest, AppError> {
        let employee_id = input
            .employee_id
            .ok_or_else(|| AppError::validation("employeeId is required"))?;
        let start_date = input
            .start_date
            .ok_or_else(|| AppError::validation("startDate is required"))?;
        let end_date = input
            .end_date
            .ok_or_else(|| AppError::validation("endDate is required"))?;
        let leave_type = parse_leave_type(input.leave_type.as_deref())?;
        ensure_date_order(start_date, end_date)?;
        if input.duration.is_some_and(|d| d < 0) {
            return Err(AppError::validation("duration cannot be negative"));
        }

        self.guard
            .authorize(actor, Action::Create, Subject::new_request(employee_id))
            .await?;

        let tenant_id = self.tenant_of(employee_id).await?;
        let duration = input
            .duration
            .unwrap_or_else(|| working_days(start_date, end_date));
        let quota_exceeded = self.quota_exceeded(employee_id, leave_type, duration).await;

        let request = self
            .repository
            .insert(NewVacationRequest {
                employee_id,
                creator_id: actor.id,
                leave_type,
                start_date,
                end_date,
                duration,
                reason: non_blank(input.reason),
                quota_exceeded,
                attachment: non_blank(input.attachment),
                created_at: Utc::now(),
            })
            .await?;

        log::info!(
            "Vacation request {} created by {} for employee {} ({} working days)",
            request.id,
            actor.id,
            employee_id,
            duration
        );

        self.activity
            .log_vacation_activity(
                actor.id,
                request.id,
                ActivityType::Create,
                format!(
                    "Demande de congé ({}) créée pour l'employé {} du {} au {}",
                    leave_type, employee_id, start_date, end_date
                ),
                json!({
                    "employeeId": employee_id,
                    "type": leave_type,
                    "startDate": start_date,
                    "endDate": end_date,
                    "duration": duration,
                    "quotaExceeded": quota_exceeded,
                }),
            )
            .await;

        let notifications = self.creation_notifications(actor, &request, tenant_id).await;
        self.activity.notify_all(notifications).await;

        Ok(request)
    }

    pub async fn update_status(
        &self,
        actor: &Actor,
        id: i64,
        status: &str,
        note: Option<String>,
    ) -> Result<VacationRequest, AppError> {
        let request = self.load(id).await?;
        let target = self.lifecycle.parse_status(status)?;

        self.guard
            .authorize(actor, Action::UpdateStatus(target), Subject::from(&request))
            .await?;

        let note = non_blank(note);
        let mut updated = request.clone();
        let transition = self.lifecycle.apply(
            &mut updated,
            StatusCommand::for_target(target, actor.id, note.clone()),
            Utc::now(),
        );

        let Transition::Applied { from, to } = transition else {
            log::debug!("Vacation request {} already {}, nothing to do", id, target);
            return Ok(request);
        };

        let stored = self.repository.update(&updated).await?;
        log::info!(
            "Vacation request {} moved from {} to {} by {}",
            id,
            from,
            to,
            actor.id
        );

        self.activity
            .log_vacation_activity(
                actor.id,
                id,
                ActivityType::VacationStatusUpdate,
                format!(
                    "Statut de la demande de congé {} changé de {} à {}",
                    id, from, to
                ),
                json!({
                    "employeeId": stored.employee_id,
                    "previous_status": from,
                    "new_status": to,
                    "comment": note,
                }),
            )
            .await;

        self.activity
            .notify(status_notification(&stored, note.as_deref()))
            .await;

        Ok(stored)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        patch: VacationPatch,
    ) -> Result<VacationRequest, AppError> {
        let request = self.load(id).await?;
        self.guard
            .authorize(actor, Action::Update, Subject::from(&request))
            .await?;
        self.lifecycle.ensure_editable(&request)?;

        if patch.is_empty() {
            return Ok(request);
        }

        let mut updated = request.clone();
        let mut changed = Vec::new();

        if let Some(employee_id) = patch.employee_id.filter(|e| *e != request.employee_id) {
            self.guard
                .authorize(actor, Action::Update, Subject::new_request(employee_id))
                .await?;
            updated.employee_id = employee_id;
            changed.push("employeeId");
        }
        if let Some(raw) = patch.leave_type.as_deref() {
            let leave_type = parse_leave_type(Some(raw))?;
            if leave_type != request.leave_type {
                updated.leave_type = leave_type;
                changed.push("type");
            }
        }
        if let Some(start_date) = patch.start_date.filter(|d| *d != request.start_date) {
            updated.start_date = start_date;
            changed.push("startDate");
        }
        if let Some(end_date) = patch.end_date.filter(|d| *d != request.end_date) {
            updated.end_date = end_date;
            changed.push("endDate");
        }
        if let Some(reason) = patch.reason {
            let reason = non_blank(Some(reason));
            if reason != request.reason {
                updated.reason = reason;
                changed.push("reason");
            }
        }

        if changed.is_empty() {
            return Ok(request);
        }

        ensure_date_order(updated.start_date, updated.end_date)?;

        if changed.contains(&"startDate") || changed.contains(&"endDate") {
            updated.duration = working_days(updated.start_date, updated.end_date);
        }
        if changed
            .iter()
            .any(|f| matches!(*f, "employeeId" | "type" | "startDate" | "endDate"))
        {
            updated.quota_exceeded = self
                .quota_exceeded(updated.employee_id, updated.leave_type, updated.duration)
                .await;
        }
        updated.updated_at = Utc::now();

        let stored = self.repository.update(&updated).await?;
        log::info!(
            "Vacation request {} updated by {} ({})",
            id,
            actor.id,
            changed.join(", ")
        );

        self.activity
            .log_vacation_activity(
                actor.id,
                id,
                ActivityType::Update,
                format!("Demande de congé {} modifiée", id),
                json!({
                    "employeeId": stored.employee_id,
                    "changes": changed,
                    "duration": stored.duration,
                }),
            )
            .await;

        Ok(stored)
    }

    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), AppError> {
        let request = self.load(id).await?;
        self.guard
            .authorize(actor, Action::Delete, Subject::from(&request))
            .await?;

        self.repository.delete(id, request.version).await?;
        log::info!("Vacation request {} deleted by {}", id, actor.id);

        self.activity
            .log_vacation_activity(
                actor.id,
                id,
                ActivityType::Delete,
                format!(
                    "Demande de congé {} de l'employé {} supprimée",
                    id, request.employee_id
                ),
                json!({
                    "employeeId": request.employee_id,
                    "status": request.status,
                    "startDate": request.start_date,
                    "endDate": request.end_date,
                }),
            )
            .await;

        // Self-deletions get a confirmation, anything else is a warning.
        let kind = if request.employee_id == actor.id {
            NotificationKind::Info
        } else {
            NotificationKind::Warning
        };
        self.activity
            .notify(
                Notification::new(
                    request.employee_id,
                    "Demande de congé supprimée",
                    format!(
                        "Votre demande de congé du {} au {} a été supprimée.",
                        request.start_date, request.end_date
                    ),
                    kind,
                )
                .with_link(VACATIONS_LINK),
            )
            .await;

        Ok(())
    }

    /// Requests visible to `actor`, newest first.
    pub async fn query(
        &self,
        actor: &Actor,
        filter: &VacationFilter,
    ) -> Result<Vec<VacationRequest>, AppError> {
        let mut requests = self.visible_requests(actor).await?;
        requests.retain(|request| filter.matches(request));
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    pub async fn get(&self, actor: &Actor, id: i64) -> Result<VacationRequest, AppError> {
        let request = self.load(id).await?;
        self.guard
            .authorize(actor, Action::Read, Subject::from(&request))
            .await?;
        Ok(request)
    }

    pub async fn statistics(&self, actor: &Actor) -> Result<VacationStats, AppError> {
        let requests = self.visible_requests(actor).await?;
        Ok(VacationStats::compute(&requests, Utc::now().year()))
    }

    async fn load(&self, id: i64) -> Result<VacationRequest, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("vacation request {}", id)))
    }

    async fn tenant_of(&self, employee_id: i64) -> Result<i64, AppError> {
        self.ownership
            .tenant_of(employee_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("employee {}", employee_id)))
    }

    async fn visible_requests(&self, actor: &Actor) -> Result<Vec<VacationRequest>, AppError> {
        match self.guard.scope_for(actor) {
            Scope::Employee(employee_id) => {
                let mut requests = self.repository.list_by_employee(employee_id).await?;
                requests.retain(|request| request.employee_id == employee_id);
                Ok(requests)
            }
            Scope::Tenant(tenant_id) => self.repository.list_by_tenant(tenant_id).await,
        }
    }

    /// Advisory only. Any failure to read the entitlement counts as "not exceeded".
    async fn quota_exceeded(&self, employee_id: i64, leave_type: LeaveType, duration: i32) -> bool {
        let Some(entitlements) = &self.entitlements else {
            return false;
        };

        match entitlements.remaining_quota(employee_id, leave_type).await {
            Ok(Some(remaining)) => duration > remaining,
            Ok(None) => false,
            Err(err) => {
                log::warn!(
                    "Could not read {} entitlement for employee {}: {}",
                    leave_type,
                    employee_id,
                    err
                );
                false
            }
        }
    }

    /// The employee plus every manager and admin of the tenant, minus whoever
    /// filed the request.
    async fn creation_notifications(
        &self,
        actor: &Actor,
        request: &VacationRequest,
        tenant_id: i64,
    ) -> Vec<Notification> {
        let staff = match self.ownership.tenant_staff(tenant_id).await {
            Ok(staff) => staff,
            Err(err) => {
                log::warn!("Could not list staff of tenant {}: {}", tenant_id, err);
                Vec::new()
            }
        };

        let mut notifications = Vec::new();

        if request.employee_id != actor.id {
            notifications.push(
                Notification::new(
                    request.employee_id,
                    "Nouvelle demande de congé",
                    format!(
                        "Une demande de congé du {} au {} ({} jour(s)) a été créée pour vous.",
                        request.start_date, request.end_date, request.duration
                    ),
                    NotificationKind::Info,
                )
                .with_link(VACATIONS_LINK),
            );
        }

        let recipients: BTreeSet<i64> = staff
            .into_iter()
            .filter(|id| *id != actor.id && *id != request.employee_id)
            .collect();

        let (kind, suffix) = if request.quota_exceeded {
            (NotificationKind::Warning, " Quota dépassé.")
        } else {
            (NotificationKind::Info, "")
        };

        for user_id in recipients {
            notifications.push(
                Notification::new(
                    user_id,
                    "Nouvelle demande de congé",
                    format!(
                        "L'employé {} demande {} jour(s) de congé ({}) du {} au {}.{}",
                        request.employee_id,
                        request.duration,
                        request.leave_type,
                        request.start_date,
                        request.end_date,
                        suffix
                    ),
                    kind,
                )
                .with_link(VACATIONS_LINK),
            );
        }

        notifications
    }
}

fn status_notification(request: &VacationRequest, note: Option<&str>) -> Notification {
    let period = format!("du {} au {}", request.start_date, request.end_date);
    let (title, message, kind) = match request.status {
        VacationStatus::Approved => (
            "Demande de congé approuvée",
            format!("Votre demande de congé {} a été approuvée.", period),
            NotificationKind::Success,
        ),
        VacationStatus::Rejected => (
            "Demande de congé rejetée",
            match note {
                Some(note) => format!(
                    "Votre demande de congé {} a été rejetée. Motif: {}",
                    period, note
                ),
                None => format!("Votre demande de congé {} a été rejetée.", period),
            },
            NotificationKind::Error,
        ),
        VacationStatus::Pending => (
            "Demande de congé en attente",
            format!("Votre demande de congé {} a été remise en attente.", period),
            NotificationKind::Info,
        ),
    };

    Notification::new(request.employee_id, title, message, kind).with_link(VACATIONS_LINK)
}

fn parse_leave_type(raw: Option<&str>) -> Result<LeaveType, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::validation("type is required"))?;
    raw.parse::<LeaveType>().map_err(|_| {
        AppError::validation(format!(
            "unknown leave type '{}' (expected one of {})",
            raw,
            LeaveType::ALL
                .iter()
                .map(LeaveType::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

fn ensure_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::validation(format!(
            "endDate {} is before startDate {}",
            end, start
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
