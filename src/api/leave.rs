use std::str::FromStr;

use crate::{
    auth::auth::AuthUser,
    compute::leave as leave_calc,
    model::{
        leave::{Leave, LeaveCredit, LeaveType},
        role::Capability,
        status::LeaveStatus,
    },
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RequestLeave {
    /// Omitted for self-service requests; staff may file for any employee.
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2025-04-07", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-04-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LeaveQuery {
    pub employee_id: Option<u64>,
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct GrantCredits {
    pub employee_id: u64,
    pub leave_type_id: u64,
    /// Credits added to the employee's total for this leave type.
    #[schema(example = 5.0)]
    pub credits: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct AccrualQuery {
    #[schema(format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end: NaiveDate,
}

/// Request Leave
///
/// The day count is inclusive of both endpoints. Credit sufficiency is
/// enforced at approval time against the ledger, not here.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = RequestLeave,
    responses(
        (status = 201, description = "Leave request filed"),
        (status = 400, description = "Invalid date range")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn request_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<RequestLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_employee_id(payload.employee_id)?;

    let days = leave_calc::days_requested(payload.start_date, payload.end_date);
    if days <= 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "End date must not be before start date"
        })));
    }

    let type_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM leave_types WHERE id = ?)")
            .bind(payload.leave_type_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to check leave type");
                ErrorInternalServerError("Internal Server Error")
            })?;
    if !type_exists {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Unknown leave type"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO leaves (employee_id, leave_type_id, start_date, end_date, days_requested, reason)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.leave_type_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(days)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to file leave request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "days_requested": days,
        "message": "Leave request filed"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("status", Query, description = "Filter by status")
    ),
    responses((status = 200, body = [Leave])),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = if auth.is_employee() {
        Some(auth.acting_employee_id(query.employee_id)?)
    } else {
        query.employee_id
    };

    if let Some(raw) = &query.status {
        if LeaveStatus::from_str(raw).is_err() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Unknown leave status: {}", raw)
            })));
        }
    }

    let mut sql = String::from(
        r#"
        SELECT id, employee_id, leave_type_id, start_date, end_date, days_requested,
               reason, status, approved_by, approved_at, created_at
        FROM leaves WHERE 1 = 1
        "#,
    );
    if employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    if query.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    sql.push_str(" ORDER BY created_at DESC LIMIT 500");

    let mut q = sqlx::query_as::<_, Leave>(&sql);
    if let Some(id) = employee_id {
        q = q.bind(id);
    }
    if let Some(status) = &query.status {
        q = q.bind(status);
    }

    let rows = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch leave requests");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id", Path, description = "Leave request ID")),
    responses(
        (status = 200, body = Leave),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let row = sqlx::query_as::<_, Leave>(
        r#"
        SELECT id, employee_id, leave_type_id, start_date, end_date, days_requested,
               reason, status, approved_by, approved_at, created_at
        FROM leaves WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to fetch leave request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let row = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Leave request not found"
            })));
        }
    };

    if auth.is_employee() {
        auth.acting_employee_id(Some(row.employee_id))?;
    }

    Ok(HttpResponse::Ok().json(row))
}

/// Approve Leave
///
/// Approval and credit consumption happen in one transaction: the request
/// flips Pending -> Approved only if the ledger still holds enough credits,
/// and the same statement run twice finds nothing left to approve.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(("leave_id", Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave approved"),
        (status = 404, description = "Leave request not found or not pending"),
        (status = 409, description = "Insufficient leave credits")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ApproveLeave)?;

    let leave_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let pending: Option<(u64, u64, i64)> = sqlx::query_as(
        "SELECT employee_id, leave_type_id, days_requested FROM leaves \
         WHERE id = ? AND status = 'Pending' FOR UPDATE",
    )
    .bind(leave_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to load leave request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let (employee_id, leave_type_id, days) = match pending {
        Some(row) => row,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Leave request not found or not pending"
            })));
        }
    };

    let remaining: Option<f64> = sqlx::query_scalar(
        "SELECT total_credits - used_credits FROM leave_credits \
         WHERE employee_id = ? AND leave_type_id = ? FOR UPDATE",
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to load leave credits");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let remaining = remaining.unwrap_or(0.0);
    if remaining < days as f64 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Insufficient leave credits",
            "remaining": remaining,
            "requested": days
        })));
    }

    sqlx::query(
        "UPDATE leave_credits SET used_credits = used_credits + ? \
         WHERE employee_id = ? AND leave_type_id = ?",
    )
    .bind(days as f64)
    .bind(employee_id)
    .bind(leave_type_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to consume leave credits");
        ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query(
        "UPDATE leaves SET status = 'Approved', approved_by = ?, approved_at = NOW() WHERE id = ?",
    )
    .bind(auth.user_id)
    .bind(leave_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to approve leave");
        ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, leave_id, "Failed to commit leave approval");
        ErrorInternalServerError("Internal Server Error")
    })?;

    info!(leave_id, employee_id, days, "Leave approved");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave approved",
        "days_charged": days
    })))
}

/// Reject Leave
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(("leave_id", Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave rejected"),
        (status = 404, description = "Leave request not found or not pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ApproveLeave)?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE leaves SET status = 'Rejected', approved_by = ?, approved_at = NOW() \
         WHERE id = ? AND status = 'Pending'",
    )
    .bind(auth.user_id)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to reject leave");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Leave request not found or not pending"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Leave rejected" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/leave/types",
    responses((status = 200, body = [LeaveType])),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let types = sqlx::query_as::<_, LeaveType>("SELECT id, name FROM leave_types ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave types");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(types))
}

#[utoipa::path(
    get,
    path = "/api/v1/leave/credits/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses((status = 200, body = [LeaveCredit])),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave_credits(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_employee_id(Some(path.into_inner()))?;

    let credits = sqlx::query_as::<_, LeaveCredit>(
        "SELECT id, employee_id, leave_type_id, total_credits, used_credits \
         FROM leave_credits WHERE employee_id = ? ORDER BY leave_type_id",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch leave credits");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(credits))
}

/// Grant Leave Credits
///
/// Adds to the employee's total for a leave type, creating the ledger row if
/// the employee predates it.
#[utoipa::path(
    post,
    path = "/api/v1/leave/credits",
    request_body = GrantCredits,
    responses(
        (status = 200, description = "Credits granted"),
        (status = 400, description = "Credits must be positive")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn grant_leave_credits(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GrantCredits>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::GrantLeaveCredits)?;

    if payload.credits <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Credits must be positive"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_credits (employee_id, leave_type_id, total_credits)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE total_credits = total_credits + VALUES(total_credits)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.leave_type_id)
    .bind(payload.credits)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to grant leave credits");
        ErrorInternalServerError("Internal Server Error")
    })?;

    info!(
        employee_id = payload.employee_id,
        leave_type_id = payload.leave_type_id,
        credits = payload.credits,
        granted_by = auth.user_id,
        "Leave credits granted"
    );

    Ok(HttpResponse::Ok().json(json!({ "message": "Credits granted" })))
}

/// Vacation/sick accrual report over a date range.
///
/// Derived view: baseline 15+15 plus one credit per month per side, less the
/// approved vacation/sick days falling in the range.
#[utoipa::path(
    get,
    path = "/api/v1/leave/accrual/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("start", Query, description = "Range start (YYYY-MM-DD)"),
        ("end", Query, description = "Range end (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, body = crate::compute::leave::AccrualReport),
        (status = 400, description = "Invalid range")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn accrual_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<AccrualQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_employee_id(Some(path.into_inner()))?;

    if query.start > query.end {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Range end must not be before start"
        })));
    }

    let used: Vec<(String, f64)> = sqlx::query_as(
        r#"
        SELECT lt.name, CAST(COALESCE(SUM(l.days_requested), 0) AS DOUBLE)
        FROM leaves l
        JOIN leave_types lt ON lt.id = l.leave_type_id
        WHERE l.employee_id = ?
          AND l.status = 'Approved'
          AND l.start_date >= ? AND l.start_date <= ?
          AND lt.name IN ('Vacation', 'Sick')
        GROUP BY lt.name
        "#,
    )
    .bind(employee_id)
    .bind(query.start)
    .bind(query.end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to sum approved leave");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let mut used_vacation = 0.0;
    let mut used_sick = 0.0;
    for (name, days) in used {
        match name.as_str() {
            "Vacation" => used_vacation = days,
            "Sick" => used_sick = days,
            _ => {}
        }
    }

    let report = leave_calc::accrual_report(query.start, query.end, used_vacation, used_sick);
    Ok(HttpResponse::Ok().json(report))
}
