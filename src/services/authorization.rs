use std::sync::Arc;

use crate::database::models::{Actor, Role, VacationRequest, VacationStatus};
use crate::error::AppError;
use crate::services::ports::OwnershipResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    UpdateStatus(VacationStatus),
    Delete,
}

/// The parts of a request the rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub employee_id: i64,
    pub status: VacationStatus,
}

impl Subject {
    /// A request that does not exist yet.
    pub fn new_request(employee_id: i64) -> Self {
        Self {
            employee_id,
            status: VacationStatus::Pending,
        }
    }
}

impl From<&VacationRequest> for Subject {
    fn from(request: &VacationRequest) -> Self {
        Self {
            employee_id: request.employee_id,
            status: request.status,
        }
    }
}

/// Which requests an actor may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Employee(i64),
    Tenant(i64),
}

#[derive(Clone)]
pub struct AuthorizationGuard {
    ownership: Arc<dyn OwnershipResolver>,
}

impl AuthorizationGuard {
    pub fn new(ownership: Arc<dyn OwnershipResolver>) -> Self {
        Self { ownership }
    }

    pub async fn authorize(
        &self,
        actor: &Actor,
        action: Action,
        subject: Subject,
    ) -> Result<(), AppError> {
        match actor.role {
            Role::Employee => authorize_employee(actor, action, subject),
            Role::Manager | Role::Admin => self.authorize_staff(actor, subject).await,
        }
    }

    pub fn scope_for(&self, actor: &Actor) -> Scope {
        match actor.role {
            Role::Employee => Scope::Employee(actor.id),
            Role::Manager | Role::Admin => Scope::Tenant(actor.tenant_id),
        }
    }

    /// Managers and admins act on anything inside their tenant, nothing outside.
    async fn authorize_staff(&self, actor: &Actor, subject: Subject) -> Result<(), AppError> {
        let tenant_id = self
            .ownership
            .tenant_of(subject.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("employee {}", subject.employee_id)))?;

        if tenant_id != actor.tenant_id {
            log::warn!(
                "Denied {} {} access to employee {} of tenant {}",
                actor.role,
                actor.id,
                subject.employee_id,
                tenant_id
            );
            return Err(AppError::forbidden(
                "request belongs to an employee outside your organization",
            ));
        }

        Ok(())
    }
}

fn authorize_employee(actor: &Actor, action: Action, subject: Subject) -> Result<(), AppError> {
    if subject.employee_id != actor.id {
        return Err(AppError::forbidden(match action {
            Action::Create => "employees can only file requests for themselves",
            Action::Read => "cannot view other employees' requests",
            Action::Update => "cannot modify other employees' requests",
            Action::UpdateStatus(_) => "cannot change the status of other employees' requests",
            Action::Delete => "cannot delete other employees' requests",
        }));
    }

    match action {
        Action::Create | Action::Read => Ok(()),
        Action::Update | Action::Delete => match subject.status {
            VacationStatus::Pending => Ok(()),
            VacationStatus::Approved | VacationStatus::Rejected => Err(AppError::forbidden(
                format!("request has already been {}", subject.status),
            )),
        },
        Action::UpdateStatus(VacationStatus::Pending) => Ok(()),
        Action::UpdateStatus(VacationStatus::Approved | VacationStatus::Rejected) => Err(
            AppError::forbidden("employees cannot approve or reject their own requests"),
        ),
    }
}
