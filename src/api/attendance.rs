use std::str::FromStr;

use crate::{
    auth::auth::AuthUser,
    compute::timesheet,
    model::{attendance::Attendance, role::Capability, status::AttendanceStatus},
    utils::sql::is_duplicate_key,
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RecordAttendance {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2025-03-14", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "08:05:00", value_type = String)]
    pub time_in: Option<NaiveTime>,
    #[schema(example = "17:00:00", value_type = String)]
    pub time_out: Option<NaiveTime>,
    /// Explicit status overrides derivation from the morning punch
    /// (Absent and On Leave days carry no punches).
    #[schema(example = "Present")]
    pub status: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CorrectAttendance {
    #[schema(example = "08:05:00", value_type = String)]
    pub time_in: Option<NaiveTime>,
    #[schema(example = "17:00:00", value_type = String)]
    pub time_out: Option<NaiveTime>,
    #[schema(example = "Present")]
    pub status: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AttendanceQuery {
    pub employee_id: Option<u64>,
    #[schema(format = "date", value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct DailySummary {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub on_leave: i64,
    pub half_day: i64,
}

/// Resolve (status, working_hours) from the posted fields. `working_hours`
/// is always derived server-side, never taken from the client.
fn resolve_status_and_hours(
    status: Option<&str>,
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
) -> actix_web::Result<(AttendanceStatus, f64)> {
    let status = match status {
        Some(raw) => AttendanceStatus::from_str(raw)
            .map_err(|_| actix_web::error::ErrorBadRequest(format!("Unknown status: {}", raw)))?,
        None => match time_in {
            Some(t) => timesheet::classify_time_in(t),
            None => AttendanceStatus::Absent,
        },
    };
    let hours = timesheet::working_hours(status, time_in, time_out);
    Ok((status, hours))
}

/// Record Attendance
///
/// One row per employee per date; a second record for the same day is a 409.
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = RecordAttendance,
    responses(
        (status = 201, description = "Attendance recorded"),
        (status = 409, description = "Attendance already recorded for this date"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn record_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<RecordAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::RecordAttendance)?;

    let (status, working_hours) =
        resolve_status_and_hours(payload.status.as_deref(), payload.time_in, payload.time_out)?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, time_in, time_out, status, remarks, working_hours)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.date)
    .bind(payload.time_in)
    .bind(payload.time_out)
    .bind(status.to_string())
    .bind(&payload.remarks)
    .bind(working_hours)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(json!({
            "id": res.last_insert_id(),
            "status": status.to_string(),
            "working_hours": working_hours,
            "message": "Attendance recorded"
        }))),
        Err(e) if is_duplicate_key(&e) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Attendance already recorded for this date"
        }))),
        Err(e) => {
            error!(error = %e, employee_id = payload.employee_id, "Failed to record attendance");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Correct Attendance
///
/// Punches and status are replaced wholesale; working hours are recomputed
/// from the corrected values.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    params(("attendance_id", Path, description = "Attendance record ID")),
    request_body = CorrectAttendance,
    responses(
        (status = 200, description = "Attendance corrected"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn correct_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CorrectAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::RecordAttendance)?;

    let attendance_id = path.into_inner();

    let (status, working_hours) =
        resolve_status_and_hours(payload.status.as_deref(), payload.time_in, payload.time_out)?;

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET time_in = ?, time_out = ?, status = ?, remarks = ?, working_hours = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.time_in)
    .bind(payload.time_out)
    .bind(status.to_string())
    .bind(&payload.remarks)
    .bind(working_hours)
    .bind(attendance_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, attendance_id, "Failed to correct attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": status.to_string(),
        "working_hours": working_hours,
        "message": "Attendance corrected"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("from", Query, description = "Range start (inclusive)"),
        ("to", Query, description = "Range end (inclusive)")
    ),
    responses((status = 200, body = [Attendance])),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    // Self-service users are pinned to their own records.
    let employee_id = if auth.is_employee() {
        Some(auth.acting_employee_id(query.employee_id)?)
    } else {
        query.employee_id
    };

    let mut sql = String::from(
        r#"
        SELECT id, employee_id, date, time_in, time_out, status, remarks, working_hours
        FROM attendance WHERE 1 = 1
        "#,
    );
    if employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    if query.from.is_some() {
        sql.push_str(" AND date >= ?");
    }
    if query.to.is_some() {
        sql.push_str(" AND date <= ?");
    }
    sql.push_str(" ORDER BY date DESC, employee_id LIMIT 500");

    let mut q = sqlx::query_as::<_, Attendance>(&sql);
    if let Some(id) = employee_id {
        q = q.bind(id);
    }
    if let Some(from) = query.from {
        q = q.bind(from);
    }
    if let Some(to) = query.to {
        q = q.bind(to);
    }

    let rows = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Daily headcount by status, for the dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary/{date}",
    params(("date", Path, description = "Calendar date (YYYY-MM-DD)")),
    responses((status = 200, body = DailySummary)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn daily_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<NaiveDate>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ViewReports)?;

    let date = path.into_inner();

    let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(CASE WHEN status = 'Present' THEN 1 END),
            COUNT(CASE WHEN status = 'Absent' THEN 1 END),
            COUNT(CASE WHEN status = 'Late' THEN 1 END),
            COUNT(CASE WHEN status = 'On Leave' THEN 1 END),
            COUNT(CASE WHEN status = 'Half Day' THEN 1 END)
        FROM attendance WHERE date = ?
        "#,
    )
    .bind(date)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to summarize attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(DailySummary {
        date,
        present: row.0,
        absent: row.1,
        late: row.2,
        on_leave: row.3,
        half_day: row.4,
    }))
}
