use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Employment classifications carried on every employee row. The payroll
/// computation dispatches the withholding bracket on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum EmploymentType {
    Regular,
    Casual,
    JobOrder,
    PartTime,
}

/// Employees are archived, never hard-deleted, while payroll or attendance
/// history still references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum EmployeeStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
    #[serde(rename = "On Leave")]
    #[strum(serialize = "On Leave")]
    OnLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum PeriodStatus {
    Open,
    Closed,
}

/// Draft payroll rows may be edited and recomputed; Approved rows refuse
/// further edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum PayrollStatus {
    Draft,
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum PayslipStatus {
    Generated,
    Approved,
    Rejected,
    Distributed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn multi_word_statuses_round_trip_through_strings() {
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "Half Day");
        assert_eq!(
            AttendanceStatus::from_str("Half Day").unwrap(),
            AttendanceStatus::HalfDay
        );
        assert_eq!(AttendanceStatus::OnLeave.to_string(), "On Leave");
        assert_eq!(EmploymentType::JobOrder.to_string(), "JobOrder");
    }
}
