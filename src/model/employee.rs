use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "AO-0001",
        "first_name": "Maria",
        "last_name": "Santos",
        "email": "maria.santos@lgu.gov.ph",
        "phone": "+639171234567",
        "department_id": 2,
        "position_id": 5,
        "employment_type": "Regular",
        "salary": 32000.0,
        "hire_date": "2022-06-01",
        "status": "Active"
    })
)]
pub struct Employee {
    pub id: u64,

    /// Generated `{DEPT}-{NNNN}` code, unique across the roster.
    pub employee_code: String,

    pub first_name: String,
    pub last_name: String,

    pub email: String,

    #[schema(nullable = true)]
    pub phone: Option<String>,

    pub department_id: u64,
    pub position_id: Option<u64>,

    /// Regular | Casual | JobOrder | PartTime
    pub employment_type: String,

    /// Monthly basic salary.
    pub salary: f64,

    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    /// Active | Archived (soft delete)
    pub status: String,
}
