use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable snapshot of a payroll row at generation time. Monetary fields
/// are copied, never recomputed, so later catalog edits cannot change an
/// issued payslip.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payslip {
    pub id: u64,
    pub employee_id: u64,
    pub payroll_id: u64,

    /// `PS-{payroll_id}-{YYYYmmddHHMMSS}`, unique.
    pub payslip_number: String,

    pub basic_salary: f64,
    pub overtime_pay: f64,
    pub holiday_pay: f64,
    pub night_differential: f64,
    pub allowance_total: f64,
    pub gross_pay: f64,
    pub total_deductions: f64,
    pub net_pay: f64,

    /// Generated | Approved | Rejected | Distributed
    pub status: String,

    #[schema(nullable = true)]
    pub rejection_reason: Option<String>,

    pub claimed: bool,

    #[schema(nullable = true)]
    pub generated_by: Option<u64>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub generated_at: Option<DateTime<Utc>>,

    #[schema(nullable = true)]
    pub reviewed_by: Option<u64>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub distributed_at: Option<DateTime<Utc>>,
}
