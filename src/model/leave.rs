use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    pub id: u64,
    /// Vacation | Sick | Personal | Emergency | Maternity | Paternity
    pub name: String,
}

/// Per (employee, leave type) ledger row. `remaining = total - used`; the
/// `used_credits` column is the authoritative mutation point for consumption.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveCredit {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub total_credits: f64,
    pub used_credits: f64,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Leave {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,

    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// Inclusive day count: end - start + 1.
    pub days_requested: i64,

    #[schema(nullable = true)]
    pub reason: Option<String>,

    /// Pending | Approved | Rejected
    pub status: String,

    #[schema(nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
