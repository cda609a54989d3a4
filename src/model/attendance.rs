use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per employee per calendar date (UNIQUE key). `working_hours` is
/// recomputed on every insert and update, never trusted from the client.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,

    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = String, nullable = true)]
    pub time_in: Option<NaiveTime>,

    #[schema(value_type = String, nullable = true)]
    pub time_out: Option<NaiveTime>,

    /// Present | Absent | Late | Half Day | On Leave
    pub status: String,

    #[schema(nullable = true)]
    pub remarks: Option<String>,

    pub working_hours: f64,
}
