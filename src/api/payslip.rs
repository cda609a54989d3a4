use std::str::FromStr;

use crate::{
    auth::auth::AuthUser,
    compute::payslip as payslip_calc,
    model::{payslip::Payslip, role::Capability, status::PayslipStatus},
    utils::sql::is_duplicate_key,
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeneratePayslips {
    #[schema(example = 3)]
    pub payroll_period_id: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectPayslip {
    /// Stored verbatim; a blank or missing reason becomes "No reason provided".
    pub reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct GenerateReport {
    pub generated: u32,
    pub skipped: u32,
}

#[derive(sqlx::FromRow)]
struct ApprovedPayroll {
    id: u64,
    employee_id: u64,
    basic_salary: f64,
    overtime_pay: f64,
    holiday_pay: f64,
    night_differential: f64,
    allowance_total: f64,
    gross_pay: f64,
    total_deductions: f64,
    net_pay: f64,
}

/// Generate Payslips
///
/// Snapshots every Approved payroll row of the period into a payslip.
/// Rows that already have one are skipped, so the call is rerunnable.
#[utoipa::path(
    post,
    path = "/api/v1/payslips/generate",
    request_body = GeneratePayslips,
    responses(
        (status = 200, description = "Generation report", body = GenerateReport),
        (status = 404, description = "No approved payroll rows in this period")
    ),
    security(("bearer_auth" = [])),
    tag = "Payslip"
)]
#[instrument(skip(auth, pool), fields(period_id = payload.payroll_period_id))]
pub async fn generate_payslips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayslips>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::GeneratePayslips)?;

    let rows = sqlx::query_as::<_, ApprovedPayroll>(
        r#"
        SELECT p.id, p.employee_id, p.basic_salary, p.overtime_pay, p.holiday_pay,
               p.night_differential, p.allowance_total, p.gross_pay, p.total_deductions, p.net_pay
        FROM payrolls p
        WHERE p.payroll_period_id = ? AND p.status = 'Approved'
        ORDER BY p.id
        "#,
    )
    .bind(payload.payroll_period_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch approved payrolls");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if rows.is_empty() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No approved payroll rows in this period"
        })));
    }

    let mut generated = 0u32;
    let mut skipped = 0u32;

    for row in rows {
        let number = payslip_calc::payslip_number(row.id, Utc::now().naive_utc());

        let result = sqlx::query(
            r#"
            INSERT INTO payslips
            (employee_id, payroll_id, payslip_number, basic_salary, overtime_pay, holiday_pay,
             night_differential, allowance_total, gross_pay, total_deductions, net_pay, generated_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.employee_id)
        .bind(row.id)
        .bind(&number)
        .bind(row.basic_salary)
        .bind(row.overtime_pay)
        .bind(row.holiday_pay)
        .bind(row.night_differential)
        .bind(row.allowance_total)
        .bind(row.gross_pay)
        .bind(row.total_deductions)
        .bind(row.net_pay)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await;

        match result {
            Ok(_) => generated += 1,
            Err(e) if is_duplicate_key(&e) => skipped += 1,
            Err(e) => {
                error!(error = %e, payroll_id = row.id, "Failed to insert payslip");
                return Err(ErrorInternalServerError("Internal Server Error"));
            }
        }
    }

    info!(generated, skipped, "Payslip generation finished");
    Ok(HttpResponse::Ok().json(GenerateReport { generated, skipped }))
}

#[utoipa::path(
    get,
    path = "/api/v1/payslips/employee/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses((status = 200, body = [Payslip])),
    security(("bearer_auth" = [])),
    tag = "Payslip"
)]
pub async fn list_payslips_for_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_employee_id(Some(path.into_inner()))?;

    let rows = sqlx::query_as::<_, Payslip>(
        "SELECT * FROM payslips WHERE employee_id = ? ORDER BY generated_at DESC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch payslips");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/payslips/{payslip_id}",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, body = Payslip),
        (status = 404, description = "Payslip not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payslip"
)]
pub async fn get_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payslip_id = path.into_inner();

    let row = sqlx::query_as::<_, Payslip>("SELECT * FROM payslips WHERE id = ?")
        .bind(payslip_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, payslip_id, "Failed to fetch payslip");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let row = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payslip not found"
            })));
        }
    };

    if auth.is_employee() {
        auth.acting_employee_id(Some(row.employee_id))?;
    }

    Ok(HttpResponse::Ok().json(row))
}

/// Shared Generated -> (Approved | Rejected) review step. The lifecycle
/// check runs in Rust and the WHERE clause repeats the source status, so a
/// concurrent reviewer loses cleanly.
async fn review_payslip(
    pool: &MySqlPool,
    payslip_id: u64,
    reviewer: u64,
    next: PayslipStatus,
    reason: Option<String>,
) -> actix_web::Result<HttpResponse> {
    let current: Option<String> = sqlx::query_scalar("SELECT status FROM payslips WHERE id = ?")
        .bind(payslip_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, payslip_id, "Failed to load payslip status");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let current = match current {
        Some(s) => s,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payslip not found"
            })));
        }
    };

    let current_status = PayslipStatus::from_str(&current).map_err(|_| {
        error!(payslip_id, status = %current, "Payslip row carries unknown status");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if !current_status.can_transition(next) {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": format!("Cannot move payslip from {} to {}", current_status, next)
        })));
    }

    let result = sqlx::query(
        "UPDATE payslips SET status = ?, rejection_reason = ?, reviewed_by = ?, reviewed_at = NOW() \
         WHERE id = ? AND status = ?",
    )
    .bind(next.to_string())
    .bind(&reason)
    .bind(reviewer)
    .bind(payslip_id)
    .bind(current_status.to_string())
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, payslip_id, "Failed to review payslip");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        warn!(payslip_id, "Payslip status changed mid-review");
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payslip was reviewed concurrently"
        })));
    }

    info!(payslip_id, reviewer, status = %next, "Payslip reviewed");
    Ok(HttpResponse::Ok().json(json!({ "message": format!("Payslip {}", next) })))
}

/// Approve Payslip
#[utoipa::path(
    put,
    path = "/api/v1/payslips/{payslip_id}/approve",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, description = "Payslip approved"),
        (status = 404, description = "Payslip not found"),
        (status = 409, description = "Lifecycle forbids the transition")
    ),
    security(("bearer_auth" = [])),
    tag = "Payslip"
)]
pub async fn approve_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ReviewPayslips)?;
    review_payslip(
        pool.get_ref(),
        path.into_inner(),
        auth.user_id,
        PayslipStatus::Approved,
        None,
    )
    .await
}

/// Reject Payslip
#[utoipa::path(
    put,
    path = "/api/v1/payslips/{payslip_id}/reject",
    params(("payslip_id", Path, description = "Payslip ID")),
    request_body = RejectPayslip,
    responses(
        (status = 200, description = "Payslip rejected"),
        (status = 404, description = "Payslip not found"),
        (status = 409, description = "Lifecycle forbids the transition")
    ),
    security(("bearer_auth" = [])),
    tag = "Payslip"
)]
pub async fn reject_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RejectPayslip>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ReviewPayslips)?;
    let reason = payslip_calc::rejection_reason(payload.reason.as_deref());
    review_payslip(
        pool.get_ref(),
        path.into_inner(),
        auth.user_id,
        PayslipStatus::Rejected,
        Some(reason),
    )
    .await
}

/// Distribute Payslip
///
/// Only Approved payslips move to Distributed; the timestamp marks release
/// to the employee.
#[utoipa::path(
    put,
    path = "/api/v1/payslips/{payslip_id}/distribute",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, description = "Payslip distributed"),
        (status = 404, description = "Payslip not found"),
        (status = 409, description = "Payslip is not approved")
    ),
    security(("bearer_auth" = [])),
    tag = "Payslip"
)]
pub async fn distribute_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::DistributePayslips)?;

    let payslip_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE payslips SET status = 'Distributed', distributed_at = NOW() \
         WHERE id = ? AND status = 'Approved'",
    )
    .bind(payslip_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, payslip_id, "Failed to distribute payslip");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payslips WHERE id = ?)")
                .bind(payslip_id)
                .fetch_one(pool.get_ref())
                .await
                .map_err(|e| {
                    error!(error = %e, payslip_id, "Failed to check payslip");
                    ErrorInternalServerError("Internal Server Error")
                })?;
        return if exists {
            Ok(HttpResponse::Conflict().json(json!({
                "message": "Only approved payslips can be distributed"
            })))
        } else {
            Ok(HttpResponse::NotFound().json(json!({
                "message": "Payslip not found"
            })))
        };
    }

    info!(payslip_id, "Payslip distributed");
    Ok(HttpResponse::Ok().json(json!({ "message": "Payslip distributed" })))
}

/// Mark Payslip Claimed
///
/// Self-service acknowledgement by the owning employee once the slip has
/// been distributed.
#[utoipa::path(
    put,
    path = "/api/v1/payslips/{payslip_id}/claim",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, description = "Payslip claimed"),
        (status = 404, description = "Payslip not found"),
        (status = 409, description = "Payslip is not distributed yet")
    ),
    security(("bearer_auth" = [])),
    tag = "Payslip"
)]
pub async fn claim_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payslip_id = path.into_inner();

    let owner: Option<(u64, String)> =
        sqlx::query_as("SELECT employee_id, status FROM payslips WHERE id = ?")
            .bind(payslip_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, payslip_id, "Failed to load payslip");
                ErrorInternalServerError("Internal Server Error")
            })?;

    let (employee_id, status) = match owner {
        Some(o) => o,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payslip not found"
            })));
        }
    };

    auth.acting_employee_id(Some(employee_id))?;

    if PayslipStatus::from_str(&status) != Ok(PayslipStatus::Distributed) {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payslip is not distributed yet"
        })));
    }

    sqlx::query("UPDATE payslips SET claimed = TRUE WHERE id = ?")
        .bind(payslip_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, payslip_id, "Failed to mark payslip claimed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Payslip claimed" })))
}
