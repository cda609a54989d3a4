use crate::{
    auth::auth::AuthUser,
    model::{
        catalog::{Allowance, Deduction, EmployeeAllowance, EmployeeDeduction},
        role::Capability,
    },
    utils::sql::is_duplicate_key,
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateAllowance {
    #[schema(example = "Rice Subsidy")]
    pub name: String,
    #[schema(example = 1000.0)]
    pub amount: f64,
    /// Lower salary bound of the bracket this allowance applies to.
    #[schema(example = 0.0)]
    pub min_salary: Option<f64>,
    /// Upper salary bound; omitted means no ceiling.
    pub max_salary: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDeduction {
    #[schema(example = "Provident Fund")]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignAllowance {
    pub employee_id: u64,
    pub allowance_id: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignDeduction {
    pub employee_id: u64,
    pub deduction_id: u64,
    /// Fixed monthly amount; zero falls back to 5% of the salary.
    #[schema(example = 500.0)]
    pub amount: Option<f64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/allowances",
    request_body = CreateAllowance,
    responses(
        (status = 201, description = "Allowance created"),
        (status = 400, description = "Invalid amount or bracket")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_allowance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAllowance>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ProcessPayroll)?;

    if payload.amount < 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Amount must not be negative"
        })));
    }
    let min_salary = payload.min_salary.unwrap_or(0.0);
    if let Some(max) = payload.max_salary {
        if max < min_salary {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Bracket ceiling must not be below its floor"
            })));
        }
    }

    let result = sqlx::query(
        "INSERT INTO allowances (name, amount, min_salary, max_salary) VALUES (?, ?, ?, ?)",
    )
    .bind(payload.name.trim())
    .bind(payload.amount)
    .bind(min_salary)
    .bind(payload.max_salary)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create allowance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "message": "Allowance created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/allowances",
    responses((status = 200, body = [Allowance])),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_allowances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ViewReports)?;

    let rows = sqlx::query_as::<_, Allowance>(
        "SELECT id, name, amount, active, min_salary, max_salary FROM allowances ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch allowances");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/deductions",
    request_body = CreateDeduction,
    responses((status = 201, description = "Deduction created")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_deduction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDeduction>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ProcessPayroll)?;

    let result = sqlx::query("INSERT INTO deductions (name) VALUES (?)")
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create deduction");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "message": "Deduction created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/deductions",
    responses((status = 200, body = [Deduction])),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_deductions(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ViewReports)?;

    let rows =
        sqlx::query_as::<_, Deduction>("SELECT id, name, active FROM deductions ORDER BY name")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch deductions");
                ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Link an allowance to an employee; linking twice is a conflict.
#[utoipa::path(
    post,
    path = "/api/v1/catalog/allowances/assign",
    request_body = AssignAllowance,
    responses(
        (status = 201, description = "Allowance assigned"),
        (status = 409, description = "Already assigned")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn assign_allowance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignAllowance>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ProcessPayroll)?;

    let result =
        sqlx::query("INSERT INTO employee_allowances (employee_id, allowance_id) VALUES (?, ?)")
            .bind(payload.employee_id)
            .bind(payload.allowance_id)
            .execute(pool.get_ref())
            .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(json!({
            "id": res.last_insert_id(),
            "message": "Allowance assigned"
        }))),
        Err(e) if is_duplicate_key(&e) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Allowance already assigned to this employee"
        }))),
        Err(e) => {
            error!(error = %e, "Failed to assign allowance");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/deductions/assign",
    request_body = AssignDeduction,
    responses(
        (status = 201, description = "Deduction assigned"),
        (status = 409, description = "Already assigned")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn assign_deduction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignDeduction>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ProcessPayroll)?;

    let result = sqlx::query(
        "INSERT INTO employee_deductions (employee_id, deduction_id, amount) VALUES (?, ?, ?)",
    )
    .bind(payload.employee_id)
    .bind(payload.deduction_id)
    .bind(payload.amount.unwrap_or(0.0))
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(json!({
            "id": res.last_insert_id(),
            "message": "Deduction assigned"
        }))),
        Err(e) if is_duplicate_key(&e) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Deduction already assigned to this employee"
        }))),
        Err(e) => {
            error!(error = %e, "Failed to assign deduction");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/allowances/employee/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses((status = 200, body = [EmployeeAllowance])),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_employee_allowances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_employee_id(Some(path.into_inner()))?;

    let rows = sqlx::query_as::<_, EmployeeAllowance>(
        "SELECT id, employee_id, allowance_id FROM employee_allowances WHERE employee_id = ?",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee allowances");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/deductions/employee/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses((status = 200, body = [EmployeeDeduction])),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_employee_deductions(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_employee_id(Some(path.into_inner()))?;

    let rows = sqlx::query_as::<_, EmployeeDeduction>(
        "SELECT id, employee_id, deduction_id, amount, active FROM employee_deductions \
         WHERE employee_id = ?",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee deductions");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}
