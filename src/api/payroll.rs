use std::str::FromStr;

use crate::{
    auth::auth::AuthUser,
    compute::{
        deductions::{self, ContributionSplit},
        pay::{self, BasePay, PayInputs},
    },
    model::{
        payroll::Payroll,
        role::Capability,
        status::{EmploymentType, PayrollStatus, PeriodStatus},
    },
    utils::sql::is_duplicate_key,
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessPayroll {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 3)]
    pub payroll_period_id: u64,
    /// Approved overtime for the period, in hours.
    #[schema(example = 4.0)]
    pub overtime_hours: Option<f64>,
    #[schema(example = 0.0)]
    pub holiday_hours: Option<f64>,
    #[schema(example = 0.0)]
    pub night_hours: Option<f64>,
    /// Ad-hoc deduction on top of the employee's recurring deductions.
    #[schema(example = 0.0)]
    pub other_deductions: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct EmployeeFacts {
    employment_type: String,
    salary: f64,
}

#[derive(sqlx::FromRow)]
struct PeriodFacts {
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
}

#[derive(sqlx::FromRow)]
struct WorkedFacts {
    worked_hours: f64,
    worked_days: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct ContributionQuery {
    #[schema(example = 32000.0)]
    pub salary: f64,
    #[schema(example = "Regular")]
    pub employment_type: Option<EmploymentType>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct ContributionPreview {
    pub salary: f64,
    pub sss: ContributionSplit,
    pub philhealth: ContributionSplit,
    pub pagibig: ContributionSplit,
    pub gsis: ContributionSplit,
    pub withholding_tax: f64,
}

/// Statutory contribution preview for a monthly salary, including the GSIS
/// schedule for plantilla personnel. Pure computation, nothing is stored.
#[utoipa::path(
    get,
    path = "/api/v1/payroll/contributions",
    params(
        ("salary", Query, description = "Monthly basic salary"),
        ("employment_type", Query, description = "Picks the withholding bracket; defaults to Regular")
    ),
    responses((status = 200, body = ContributionPreview)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn contribution_preview(
    auth: AuthUser,
    query: web::Query<ContributionQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ViewReports)?;

    let salary = query.salary;
    let employment_type = query.employment_type.unwrap_or(EmploymentType::Regular);

    Ok(HttpResponse::Ok().json(ContributionPreview {
        salary,
        sss: deductions::sss(salary),
        philhealth: deductions::philhealth(salary),
        pagibig: deductions::pagibig(salary),
        gsis: deductions::gsis(salary),
        withholding_tax: deductions::withholding_for(employment_type, salary),
    }))
}

/// Recurring deduction total: a positive per-employee amount is taken as-is,
/// otherwise the deduction defaults to 5% of the monthly salary.
async fn recurring_deductions(
    pool: &MySqlPool,
    employee_id: u64,
    salary: f64,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(CASE WHEN ed.amount > 0 THEN ed.amount ELSE ROUND(? * 0.05, 2) END), 0)
        FROM employee_deductions ed
        JOIN deductions d ON d.id = ed.deduction_id
        WHERE ed.employee_id = ? AND ed.active AND d.active
        "#,
    )
    .bind(salary)
    .bind(employee_id)
    .fetch_one(pool)
    .await
}

/// Allowance total: active catalog entries linked to the employee whose
/// salary bracket covers the monthly salary.
async fn allowance_total(
    pool: &MySqlPool,
    employee_id: u64,
    salary: f64,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(a.amount), 0)
        FROM employee_allowances ea
        JOIN allowances a ON a.id = ea.allowance_id
        WHERE ea.employee_id = ?
          AND a.active
          AND a.min_salary <= ?
          AND (a.max_salary IS NULL OR a.max_salary >= ?)
        "#,
    )
    .bind(employee_id)
    .bind(salary)
    .bind(salary)
    .fetch_one(pool)
    .await
}

/// Process Payroll
///
/// Builds the itemized Draft row for one employee in an Open period. The
/// UNIQUE (employee, period) key turns a duplicate run into a 409 instead of
/// a second row.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/process",
    request_body = ProcessPayroll,
    responses(
        (status = 201, description = "Payroll row created"),
        (status = 404, description = "Employee or period not found"),
        (status = 409, description = "Payroll already processed for this period or period closed"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
#[instrument(skip(auth, pool), fields(employee_id = payload.employee_id, period_id = payload.payroll_period_id))]
pub async fn process_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ProcessPayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ProcessPayroll)?;

    let employee = sqlx::query_as::<_, EmployeeFacts>(
        "SELECT employment_type, salary FROM employees WHERE id = ? AND status = 'Active'",
    )
    .bind(payload.employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to load employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let employee = match employee {
        Some(e) => e,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found or archived"
            })));
        }
    };

    let period = sqlx::query_as::<_, PeriodFacts>(
        "SELECT start_date, end_date, status FROM payroll_periods WHERE id = ?",
    )
    .bind(payload.payroll_period_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to load payroll period");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let period = match period {
        Some(p) => p,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payroll period not found"
            })));
        }
    };

    if PeriodStatus::from_str(&period.status) != Ok(PeriodStatus::Open) {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payroll period is closed"
        })));
    }

    let employment_type = EmploymentType::from_str(&employee.employment_type).map_err(|_| {
        error!(
            employment_type = %employee.employment_type,
            "Employee row carries unknown employment type"
        );
        ErrorInternalServerError("Internal Server Error")
    })?;

    let worked = sqlx::query_as::<_, WorkedFacts>(
        r#"
        SELECT COALESCE(SUM(working_hours), 0) AS worked_hours,
               COUNT(CASE WHEN working_hours > 0 THEN 1 END) AS worked_days
        FROM attendance
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        "#,
    )
    .bind(payload.employee_id)
    .bind(period.start_date)
    .bind(period.end_date)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to sum attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let allowances = allowance_total(pool.get_ref(), payload.employee_id, employee.salary)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to sum allowances");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let recurring = recurring_deductions(pool.get_ref(), payload.employee_id, employee.salary)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to sum recurring deductions");
            ErrorInternalServerError("Internal Server Error")
        })?;

    // Daily-paid classifications earn by day present; salaried ones are
    // prorated over the 160-hour month.
    let base = match employment_type {
        EmploymentType::Casual | EmploymentType::JobOrder => BasePay::DailyRated {
            worked_days: worked.worked_days as f64,
        },
        EmploymentType::Regular | EmploymentType::PartTime => BasePay::HourlyProrated {
            worked_hours: worked.worked_hours,
        },
    };

    let overtime_hours = payload.overtime_hours.unwrap_or(0.0);
    let breakdown = pay::compute(&PayInputs {
        employment_type,
        basic_salary: employee.salary,
        base,
        overtime_hours,
        holiday_hours: payload.holiday_hours.unwrap_or(0.0),
        night_hours: payload.night_hours.unwrap_or(0.0),
        allowance_total: allowances,
        other_deductions: payload.other_deductions.unwrap_or(0.0) + recurring,
    });

    let result = sqlx::query(
        r#"
        INSERT INTO payrolls
        (employee_id, payroll_period_id, basic_salary, worked_hours, overtime_hours,
         base_pay, overtime_pay, holiday_pay, night_differential, allowance_total, gross_pay,
         sss_contribution, philhealth_contribution, pagibig_contribution, tax_withheld,
         other_deductions, total_deductions, net_pay)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.payroll_period_id)
    .bind(breakdown.basic_salary)
    .bind(worked.worked_hours)
    .bind(overtime_hours)
    .bind(breakdown.base_pay)
    .bind(breakdown.overtime_pay)
    .bind(breakdown.holiday_pay)
    .bind(breakdown.night_differential)
    .bind(breakdown.allowance_total)
    .bind(breakdown.gross_pay)
    .bind(breakdown.sss_contribution)
    .bind(breakdown.philhealth_contribution)
    .bind(breakdown.pagibig_contribution)
    .bind(breakdown.tax_withheld)
    .bind(breakdown.other_deductions)
    .bind(breakdown.total_deductions)
    .bind(breakdown.net_pay)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            info!(payroll_id = res.last_insert_id(), net_pay = breakdown.net_pay, "Payroll processed");
            Ok(HttpResponse::Created().json(json!({
                "id": res.last_insert_id(),
                "breakdown": breakdown,
                "message": "Payroll row created"
            })))
        }
        Err(e) if is_duplicate_key(&e) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Payroll already processed for this period"
        }))),
        Err(e) => {
            error!(error = %e, "Failed to insert payroll row");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/period/{period_id}",
    params(("period_id", Path, description = "Payroll period ID")),
    responses((status = 200, body = [Payroll])),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls_for_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ProcessPayroll)?;

    let period_id = path.into_inner();

    let rows = sqlx::query_as::<_, Payroll>(
        "SELECT * FROM payrolls WHERE payroll_period_id = ? ORDER BY employee_id",
    )
    .bind(period_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, period_id, "Failed to fetch payrolls");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", Path, description = "Payroll row ID")),
    responses(
        (status = 200, body = Payroll),
        (status = 404, description = "Payroll row not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let row = sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls WHERE id = ?")
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, payroll_id, "Failed to fetch payroll");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let row = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payroll row not found"
            })));
        }
    };

    // Self-service users may only read their own payroll.
    if auth.is_employee() {
        auth.acting_employee_id(Some(row.employee_id))?;
    }

    Ok(HttpResponse::Ok().json(row))
}

/// Reprocess Payroll
///
/// Deletes and rebuilds a Draft row so corrected attendance flows through.
/// Approved rows refuse the edit.
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", Path, description = "Payroll row ID")),
    responses(
        (status = 200, description = "Draft payroll row deleted"),
        (status = 404, description = "Payroll row not found"),
        (status = 409, description = "Approved payroll rows cannot be deleted")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_draft_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ProcessPayroll)?;

    let payroll_id = path.into_inner();

    let status: Option<String> = sqlx::query_scalar("SELECT status FROM payrolls WHERE id = ?")
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, payroll_id, "Failed to load payroll status");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match status.as_deref().map(PayrollStatus::from_str) {
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payroll row not found"
            })));
        }
        Some(Ok(PayrollStatus::Draft)) => {}
        Some(_) => {
            return Ok(HttpResponse::Conflict().json(json!({
                "message": "Approved payroll rows cannot be deleted"
            })));
        }
    }

    // The status guard repeats in the WHERE clause so a concurrent approval
    // cannot slip between the check and the delete.
    let result = sqlx::query("DELETE FROM payrolls WHERE id = ? AND status = 'Draft'")
        .bind(payroll_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, payroll_id, "Failed to delete payroll row");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Approved payroll rows cannot be deleted"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Draft payroll row deleted" })))
}

/// Approve Payroll
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}/approve",
    params(("payroll_id", Path, description = "Payroll row ID")),
    responses(
        (status = 200, description = "Payroll approved"),
        (status = 404, description = "Payroll row not found or already approved")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn approve_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ApprovePayroll)?;

    let payroll_id = path.into_inner();

    let result =
        sqlx::query("UPDATE payrolls SET status = 'Approved' WHERE id = ? AND status = 'Draft'")
            .bind(payroll_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, payroll_id, "Failed to approve payroll");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Payroll row not found or already approved"
        })));
    }

    info!(payroll_id, approved_by = auth.user_id, "Payroll approved");
    Ok(HttpResponse::Ok().json(json!({ "message": "Payroll approved" })))
}
