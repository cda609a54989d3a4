use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollPeriod {
    pub id: u64,
    pub period_name: String,

    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(value_type = String, format = "date")]
    pub pay_date: NaiveDate,

    /// Open | Closed; payroll rows are only insertable while Open.
    pub status: String,
}

/// One row per (employee, period), UNIQUE at the storage layer so two
/// concurrent process calls cannot both succeed.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,
    pub payroll_period_id: u64,

    pub basic_salary: f64,
    pub worked_hours: f64,
    pub overtime_hours: f64,

    pub base_pay: f64,
    pub overtime_pay: f64,
    pub holiday_pay: f64,
    pub night_differential: f64,
    pub allowance_total: f64,
    pub gross_pay: f64,

    pub sss_contribution: f64,
    pub philhealth_contribution: f64,
    pub pagibig_contribution: f64,
    pub tax_withheld: f64,
    pub other_deductions: f64,
    pub total_deductions: f64,
    pub net_pay: f64,

    /// Draft | Approved
    pub status: String,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
