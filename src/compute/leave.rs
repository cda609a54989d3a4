use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::compute::deductions::round2;

/// Annual baseline entitlement carried forward each year (government rules).
pub const BASE_VACATION_CREDITS: f64 = 15.0;
pub const BASE_SICK_CREDITS: f64 = 15.0;

/// Monthly accrual: one vacation day and one sick day per calendar month.
pub const MONTHLY_VACATION_ACCRUAL: f64 = 1.0;
pub const MONTHLY_SICK_ACCRUAL: f64 = 1.0;

/// Inclusive day count of a leave request. Returns 0 when the range is
/// inverted; callers reject those requests before persisting.
pub fn days_requested(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }
    (end - start).num_days() + 1
}

/// Weekday (Mon-Fri) count in an inclusive date range.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .count() as u32
}

/// Credits still available on a ledger row.
pub fn remaining_credits(total_credits: f64, used_credits: f64) -> f64 {
    round2(total_credits - used_credits)
}

/// Calendar months covered by a reporting range, counted inclusively.
pub fn months_elapsed(start: NaiveDate, end: NaiveDate) -> i64 {
    let months = (end.year() as i64 - start.year() as i64) * 12
        + (end.month() as i64 - start.month() as i64)
        + 1;
    months.max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct AccrualSide {
    pub baseline: f64,
    pub earned: f64,
    pub total: f64,
    pub used: f64,
    pub balance: f64,
}

/// Vacation/sick balance report for a date range.
///
/// This is a derived read over approved leave sums; the persisted
/// `leave_credits` ledger remains the authoritative mutation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct AccrualReport {
    pub months: i64,
    pub vacation: AccrualSide,
    pub sick: AccrualSide,
}

fn accrual_side(baseline: f64, monthly_rate: f64, months: i64, used: f64) -> AccrualSide {
    let earned = round2(monthly_rate * months as f64);
    let total = round2(baseline + earned);
    AccrualSide {
        baseline,
        earned,
        total,
        used: round2(used),
        balance: round2((total - used).max(0.0)),
    }
}

pub fn accrual_report(
    start: NaiveDate,
    end: NaiveDate,
    used_vacation: f64,
    used_sick: f64,
) -> AccrualReport {
    let months = months_elapsed(start, end);
    AccrualReport {
        months,
        vacation: accrual_side(BASE_VACATION_CREDITS, MONTHLY_VACATION_ACCRUAL, months, used_vacation),
        sick: accrual_side(BASE_SICK_CREDITS, MONTHLY_SICK_ACCRUAL, months, used_sick),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn days_requested_is_inclusive() {
        assert_eq!(days_requested(d(2025, 1, 10), d(2025, 1, 14)), 5);
        assert_eq!(days_requested(d(2025, 1, 10), d(2025, 1, 10)), 1);
        assert_eq!(days_requested(d(2025, 1, 14), d(2025, 1, 10)), 0);
    }

    #[test]
    fn working_days_skips_weekends() {
        // 2025-01-10 is a Friday; through the 14th spans one weekend
        assert_eq!(working_days(d(2025, 1, 10), d(2025, 1, 14)), 3);
        // a full January 2025 has 23 weekdays
        assert_eq!(working_days(d(2025, 1, 1), d(2025, 1, 31)), 23);
        assert_eq!(working_days(d(2025, 1, 14), d(2025, 1, 10)), 0);
    }

    #[test]
    fn remaining_is_total_minus_used() {
        assert_eq!(remaining_credits(15.0, 4.5), 10.5);
        assert_eq!(remaining_credits(15.0, 15.0), 0.0);
    }

    #[test]
    fn months_counted_inclusively() {
        assert_eq!(months_elapsed(d(2025, 1, 1), d(2025, 1, 31)), 1);
        assert_eq!(months_elapsed(d(2025, 1, 15), d(2025, 6, 2)), 6);
        assert_eq!(months_elapsed(d(2024, 11, 1), d(2025, 2, 28)), 4);
        assert_eq!(months_elapsed(d(2025, 6, 1), d(2025, 1, 1)), 0);
    }

    #[test]
    fn accrual_report_applies_baseline_and_monthly_earning() {
        let report = accrual_report(d(2025, 1, 1), d(2025, 6, 30), 4.0, 2.0);
        assert_eq!(report.months, 6);
        assert_eq!(report.vacation.earned, 6.0);
        assert_eq!(report.vacation.total, 21.0);
        assert_eq!(report.vacation.balance, 17.0);
        assert_eq!(report.sick.total, 21.0);
        assert_eq!(report.sick.balance, 19.0);
    }

    #[test]
    fn accrual_balance_floors_at_zero() {
        let report = accrual_report(d(2025, 1, 1), d(2025, 1, 31), 40.0, 0.0);
        assert_eq!(report.vacation.balance, 0.0);
    }
}
