use std::str::FromStr;

use crate::{
    auth::auth::AuthUser,
    compute::leave::{BASE_SICK_CREDITS, BASE_VACATION_CREDITS},
    model::{
        employee::Employee,
        role::Capability,
        status::{EmployeeStatus, EmploymentType},
    },
    utils::sql::{build_update_sql, execute_update, is_duplicate_key},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::{MySqlPool, MySql, Transaction};
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Maria")]
    pub first_name: String,
    #[schema(example = "Santos")]
    pub last_name: String,
    #[schema(example = "maria.santos@lgu.gov.ph", format = "email")]
    pub email: String,
    #[schema(example = "+639171234567")]
    pub phone: Option<String>,
    #[schema(example = 1)]
    pub department_id: u64,
    #[schema(example = 2)]
    pub position_id: Option<u64>,
    #[schema(example = "Regular")]
    pub employment_type: EmploymentType,
    #[schema(example = 32000.0)]
    pub salary: f64,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub hire_date: chrono::NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub employment_type: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Columns a partial update may touch. Archival goes through its own route.
const UPDATABLE_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone",
    "department_id",
    "position_id",
    "employment_type",
    "salary",
    "hire_date",
];

/// Next free `{DEPT}-{NNNN}` code for a department. The prefix comes from the
/// first letters of the department name's first two words.
async fn next_employee_code(
    tx: &mut Transaction<'_, MySql>,
    department_id: u64,
) -> Result<String, sqlx::Error> {
    let dept_name: Option<String> =
        sqlx::query_scalar("SELECT name FROM departments WHERE id = ?")
            .bind(department_id)
            .fetch_optional(&mut **tx)
            .await?;

    let prefix = match dept_name {
        Some(name) => {
            let initials: String = name
                .split_whitespace()
                .take(2)
                .filter_map(|w| w.chars().next())
                .collect::<String>()
                .to_uppercase();
            if initials.len() >= 2 {
                initials
            } else {
                name.chars().take(2).collect::<String>().to_uppercase()
            }
        }
        None => "EM".to_string(),
    };

    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE department_id = ?")
            .bind(department_id)
            .fetch_one(&mut **tx)
            .await?;

    let mut n = existing + 1;
    loop {
        let candidate = format!("{}-{:04}", prefix, n);
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_code = ? LIMIT 1)",
        )
        .bind(&candidate)
        .fetch_one(&mut **tx)
        .await?;
        if !taken {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Create Employee
///
/// Inserts the profile and seeds the leave-credit ledger (15 vacation,
/// 15 sick, zero elsewhere) in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManageEmployees)?;

    if payload.salary < 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Salary must not be negative"
        })));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let employee_code = next_employee_code(&mut tx, payload.department_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to generate employee code");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let insert = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_code, first_name, last_name, email, phone, department_id, position_id,
         employment_type, salary, hire_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&employee_code)
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(payload.email.trim())
    .bind(&payload.phone)
    .bind(payload.department_id)
    .bind(payload.position_id)
    .bind(payload.employment_type.to_string())
    .bind(payload.salary)
    .bind(payload.hire_date)
    .execute(&mut *tx)
    .await;

    let employee_id = match insert {
        Ok(res) => res.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => {
            return Ok(HttpResponse::Conflict().json(json!({
                "message": "Email already registered"
            })));
        }
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            return Err(ErrorInternalServerError("Internal Server Error"));
        }
    };

    // Seed a ledger row for every leave type in the catalog.
    sqlx::query(
        r#"
        INSERT INTO leave_credits (employee_id, leave_type_id, total_credits)
        SELECT ?, id,
               CASE name WHEN 'Vacation' THEN ? WHEN 'Sick' THEN ? ELSE 0 END
        FROM leave_types
        "#,
    )
    .bind(employee_id)
    .bind(BASE_VACATION_CREDITS)
    .bind(BASE_SICK_CREDITS)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to seed leave credits");
        ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit employee creation");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "id": employee_id,
        "employee_code": employee_code,
        "message": "Employee created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("department_id", Query, description = "Filter by department"),
        ("employment_type", Query, description = "Filter by employment type"),
        ("status", Query, description = "Filter by status"),
        ("search", Query, description = "Search by name or email")
    ),
    responses((status = 200, description = "Paginated employee list", body = EmployeeListResponse)),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ViewReports)?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    if let Some(raw) = &query.status {
        if EmployeeStatus::from_str(raw).is_err() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Unknown employee status: {}", raw)
            })));
        }
    }

    let mut conditions = Vec::new();
    let like = query.search.as_ref().map(|s| format!("%{}%", s));

    if query.department_id.is_some() {
        conditions.push("department_id = ?");
    }
    if query.employment_type.is_some() {
        conditions.push("employment_type = ?");
    }
    if query.status.is_some() {
        conditions.push("status = ?");
    }
    if like.is_some() {
        conditions.push("(first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(department_id) = query.department_id {
        count_query = count_query.bind(department_id);
    }
    if let Some(employment_type) = &query.employment_type {
        count_query = count_query.bind(employment_type);
    }
    if let Some(status) = &query.status {
        count_query = count_query.bind(status);
    }
    if let Some(like) = &like {
        count_query = count_query.bind(like).bind(like).bind(like);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_code, first_name, last_name, email, phone, department_id,
               position_id, employment_type, salary, hire_date, status
        FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?
        "#,
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    if let Some(department_id) = query.department_id {
        data_query = data_query.bind(department_id);
    }
    if let Some(employment_type) = &query.employment_type {
        data_query = data_query.bind(employment_type);
    }
    if let Some(status) = &query.status {
        data_query = data_query.bind(status);
    }
    if let Some(like) = &like {
        data_query = data_query.bind(like).bind(like).bind(like);
    }
    let data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.acting_employee_id(Some(path.into_inner()))?;

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_code, first_name, last_name, email, phone, department_id,
               position_id, employment_type, salary, hire_date, status
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Partial update over a whitelisted column set.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Unknown field in payload"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManageEmployees)?;

    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, UPDATABLE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to update employee");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated"
    })))
}

/// Archive Employee (soft delete)
///
/// Rows are never removed while attendance/payroll history references them.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee archived"),
        (status = 404, description = "Employee not found or already archived")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn archive_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ArchiveEmployees)?;

    let employee_id = path.into_inner();

    let result =
        sqlx::query("UPDATE employees SET status = 'Archived' WHERE id = ? AND status = 'Active'")
            .bind(employee_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, "Failed to archive employee");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found or already archived"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee archived"
    })))
}
