use crate::{
    auth::auth::AuthUser,
    model::{payroll::PayrollPeriod, role::Capability},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreatePeriod {
    #[schema(example = "March 2025 - First Half")]
    pub period_name: String,
    #[schema(example = "2025-03-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-03-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "2025-03-20", format = "date", value_type = String)]
    pub pay_date: NaiveDate,
}

/// Open Payroll Period
#[utoipa::path(
    post,
    path = "/api/v1/payroll/periods",
    request_body = CreatePeriod,
    responses(
        (status = 201, description = "Period opened"),
        (status = 400, description = "Invalid date range")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePeriod>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManagePeriods)?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Period end must not be before start"
        })));
    }
    if payload.pay_date < payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Pay date must not fall inside the period"
        })));
    }

    let result = sqlx::query(
        "INSERT INTO payroll_periods (period_name, start_date, end_date, pay_date) VALUES (?, ?, ?, ?)",
    )
    .bind(payload.period_name.trim())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.pay_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to open payroll period");
        ErrorInternalServerError("Internal Server Error")
    })?;

    info!(period_id = result.last_insert_id(), "Payroll period opened");

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "message": "Period opened"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/periods",
    responses((status = 200, body = [PayrollPeriod])),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_periods(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let periods = sqlx::query_as::<_, PayrollPeriod>(
        "SELECT id, period_name, start_date, end_date, pay_date, status \
         FROM payroll_periods ORDER BY start_date DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch payroll periods");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(periods))
}

/// Close Payroll Period
///
/// A closed period accepts no further payroll rows; closing is idempotent
/// at the HTTP layer (already closed is a 404, not a second close).
#[utoipa::path(
    put,
    path = "/api/v1/payroll/periods/{period_id}/close",
    params(("period_id", Path, description = "Payroll period ID")),
    responses(
        (status = 200, description = "Period closed"),
        (status = 404, description = "Period not found or already closed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn close_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManagePeriods)?;

    let period_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE payroll_periods SET status = 'Closed' WHERE id = ? AND status = 'Open'",
    )
    .bind(period_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, period_id, "Failed to close period");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Period not found or already closed"
        })));
    }

    info!(period_id, "Payroll period closed");
    Ok(HttpResponse::Ok().json(json!({ "message": "Period closed" })))
}
