use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Named allowance with an optional salary bracket; only active entries whose
/// bracket covers the employee's salary count toward the allowance total.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Allowance {
    pub id: u64,
    pub name: String,
    pub amount: f64,
    pub active: bool,
    pub min_salary: f64,
    #[schema(nullable = true)]
    pub max_salary: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Deduction {
    pub id: u64,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeAllowance {
    pub id: u64,
    pub employee_id: u64,
    pub allowance_id: u64,
}

/// Employee-specific deduction link. A positive `amount` overrides the
/// default 5%-of-salary fallback.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeDeduction {
    pub id: u64,
    pub employee_id: u64,
    pub deduction_id: u64,
    pub amount: f64,
    pub active: bool,
}
