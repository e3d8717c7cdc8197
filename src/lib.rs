use std::sync::Arc;

use sqlx::PgPool;

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use services::VacationService;

use database::repositories::{
    PgActivityTrail, PgNotificationStore, PgOwnershipResolver, PgVacationRepository,
};
use services::StaticEntitlements;

/// Wires the Postgres adapters into a `VacationService`. Quota checks are
/// enabled only when `LEAVE_QUOTAS` configures at least one leave type.
pub fn build_vacation_service(pool: PgPool, config: &Config) -> anyhow::Result<VacationService> {
    let repository = Arc::new(PgVacationRepository::new(pool.clone()));
    let service = VacationService::new(
        repository.clone(),
        Arc::new(PgOwnershipResolver::new(pool.clone())),
        Arc::new(PgActivityTrail::new(pool.clone())),
        Arc::new(PgNotificationStore::new(pool)),
    );

    let quotas = config.leave_quotas()?;
    if quotas.is_empty() {
        log::info!("No leave quotas configured, quota checks disabled");
        return Ok(service);
    }

    log::info!("Leave quotas configured for {} leave types", quotas.len());
    Ok(service.with_entitlements(Arc::new(StaticEntitlements::new(quotas, repository))))
}
