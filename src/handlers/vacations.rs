use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::Claims;
use crate::database::models::{
    CreateVacationInput, LeaveType, VacationFilter, VacationPatch, VacationStatus, flexible_date,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestIdExt;
use crate::services::VacationService;

#[derive(Debug, Default, Deserialize)]
pub struct VacationQuery {
    #[serde(alias = "employeeId")]
    pub employee_id: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub leave_type: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

impl VacationQuery {
    /// Query strings arrive untyped; bad values are validation errors, not 404s.
    pub fn into_filter(self) -> Result<VacationFilter, AppError> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<VacationStatus>().map_err(AppError::ValidationError))
            .transpose()?;
        let leave_type = self
            .leave_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<LeaveType>().map_err(AppError::ValidationError))
            .transpose()?;

        Ok(VacationFilter {
            employee_id: self.employee_id,
            status,
            leave_type,
            start_date: parse_query_date("start_date", self.start_date.as_deref())?,
            end_date: parse_query_date("end_date", self.end_date.as_deref())?,
        })
    }
}

fn parse_query_date(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => flexible_date::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("{}: invalid date '{}'", field, raw))),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub comment: Option<String>,
}

/// Create a vacation request
pub async fn create_vacation(
    claims: Claims,
    service: web::Data<VacationService>,
    input: web::Json<CreateVacationInput>,
) -> Result<HttpResponse, AppError> {
    let request = service.create(&claims.actor(), input.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        Some(request),
        "Vacation request created",
    )))
}

/// List vacation requests visible to the caller
pub async fn get_vacations(
    claims: Claims,
    service: web::Data<VacationService>,
    query: web::Query<VacationQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;
    let requests = service.query(&claims.actor(), &filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn get_vacation_stats(
    claims: Claims,
    service: web::Data<VacationService>,
) -> Result<HttpResponse, AppError> {
    let stats = service.statistics(&claims.actor()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

pub async fn get_vacation(
    claims: Claims,
    service: web::Data<VacationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let request = service.get(&claims.actor(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Edit a pending vacation request
pub async fn update_vacation(
    claims: Claims,
    service: web::Data<VacationService>,
    path: web::Path<i64>,
    input: web::Json<VacationPatch>,
) -> Result<HttpResponse, AppError> {
    let request = service
        .update(&claims.actor(), path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(request),
        "Vacation request updated",
    )))
}

/// Approve, reject, or reset a vacation request
pub async fn update_vacation_status(
    req: HttpRequest,
    claims: Claims,
    service: web::Data<VacationService>,
    path: web::Path<i64>,
    input: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let StatusUpdateRequest { status, comment } = input.into_inner();

    log::debug!(
        "Status change on vacation {} to '{}' requested by {} (correlation_id={})",
        id,
        status,
        claims.sub,
        req.correlation_id().unwrap_or_default()
    );

    let request = service
        .update_status(&claims.actor(), id, &status, comment)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(request),
        "Vacation status updated",
    )))
}

pub async fn delete_vacation(
    claims: Claims,
    service: web::Data<VacationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    service.delete(&claims.actor(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Vacation request deleted",
    )))
}
