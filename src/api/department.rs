use crate::auth::auth::AuthUser;
use crate::model::department::{Department, Position};
use crate::model::role::Capability;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Accounting Office")]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreatePosition {
    #[schema(example = "Administrative Aide I")]
    pub title: String,
    #[schema(example = 1)]
    pub department_id: u64,
}

#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created"),
        (status = 409, description = "Department already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManageDepartments)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Department name must not be empty"
        })));
    }

    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(name)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(serde_json::json!({
            "id": res.last_insert_id(),
            "message": "Department created"
        }))),
        Err(e) if crate::utils::sql::is_duplicate_key(&e) => {
            Ok(HttpResponse::Conflict().json(serde_json::json!({
                "message": "Department already exists"
            })))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create department");
            Err(actix_web::error::ErrorInternalServerError("Internal Server Error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses((status = 200, body = [Department])),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let departments =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch departments");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(departments))
}

#[utoipa::path(
    post,
    path = "/api/v1/departments/positions",
    request_body = CreatePosition,
    responses((status = 201, description = "Position created")),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_position(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePosition>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManageDepartments)?;

    let result = sqlx::query("INSERT INTO positions (title, department_id) VALUES (?, ?)")
        .bind(payload.title.trim())
        .bind(payload.department_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create position");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": result.last_insert_id(),
        "message": "Position created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}/positions",
    params(("department_id", description = "Department ID")),
    responses((status = 200, body = [Position])),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_positions(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();

    let positions = sqlx::query_as::<_, Position>(
        "SELECT id, title, department_id FROM positions WHERE department_id = ? ORDER BY title",
    )
    .bind(department_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, department_id, "Failed to fetch positions");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(positions))
}
