use serde::Serialize;
use utoipa::ToSchema;

use crate::compute::deductions::{self, round2};
use crate::model::status::EmploymentType;

/// Standard monthly working hours used for hourly proration.
pub const STANDARD_MONTHLY_HOURS: f64 = 160.0;
/// Working days assumed per month for the daily rate.
pub const WORKING_DAYS_PER_MONTH: f64 = 22.0;

pub const OVERTIME_PREMIUM: f64 = 1.25;
pub const HOLIDAY_PREMIUM: f64 = 2.0;
pub const NIGHT_DIFFERENTIAL_RATE: f64 = 0.10;

pub fn hourly_rate(basic_salary: f64) -> f64 {
    if basic_salary > 0.0 {
        basic_salary / STANDARD_MONTHLY_HOURS
    } else {
        0.0
    }
}

pub fn daily_rate(basic_salary: f64) -> f64 {
    if basic_salary > 0.0 {
        basic_salary / WORKING_DAYS_PER_MONTH
    } else {
        0.0
    }
}

/// How the base earnings for the period are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasePay {
    /// Monthly salary prorated by worked hours over the 160-hour month.
    HourlyProrated { worked_hours: f64 },
    /// Daily rate times worked days (casual / daily-paid flow).
    DailyRated { worked_days: f64 },
}

#[derive(Debug, Clone)]
pub struct PayInputs {
    pub employment_type: EmploymentType,
    pub basic_salary: f64,
    pub base: BasePay,
    pub overtime_hours: f64,
    pub holiday_hours: f64,
    pub night_hours: f64,
    pub allowance_total: f64,
    pub other_deductions: f64,
}

/// Fully itemized result of one payroll computation.
///
/// Invariant: `net_pay == gross_pay - total_deductions` to the centavo.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayBreakdown {
    pub basic_salary: f64,
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
}

pub fn compute(inputs: &PayInputs) -> PayBreakdown {
    let rate = hourly_rate(inputs.basic_salary);

    let base_pay = match inputs.base {
        BasePay::HourlyProrated { worked_hours } => round2(rate * worked_hours.max(0.0)),
        BasePay::DailyRated { worked_days } => {
            round2(daily_rate(inputs.basic_salary) * worked_days.max(0.0))
        }
    };

    let overtime_pay = round2(rate * OVERTIME_PREMIUM * inputs.overtime_hours.max(0.0));
    let holiday_pay = round2(rate * HOLIDAY_PREMIUM * inputs.holiday_hours.max(0.0));
    let night_differential = round2(rate * NIGHT_DIFFERENTIAL_RATE * inputs.night_hours.max(0.0));
    let allowance_total = round2(inputs.allowance_total.max(0.0));

    let gross_pay = round2(base_pay + overtime_pay + holiday_pay + night_differential + allowance_total);

    // Statutory contributions are assessed on the monthly basic salary;
    // withholding tax on the period's gross, by employment type.
    let sss_contribution = deductions::sss(inputs.basic_salary).employee_share;
    let philhealth_contribution = deductions::philhealth(inputs.basic_salary).employee_share;
    let pagibig_contribution = deductions::pagibig(inputs.basic_salary).employee_share;
    let tax_withheld = deductions::withholding_for(inputs.employment_type, gross_pay);
    let other_deductions = round2(inputs.other_deductions.max(0.0));

    let total_deductions = round2(
        sss_contribution + philhealth_contribution + pagibig_contribution + tax_withheld + other_deductions,
    );
    let net_pay = round2(gross_pay - total_deductions);

    PayBreakdown {
        basic_salary: inputs.basic_salary,
        base_pay,
        overtime_pay,
        holiday_pay,
        night_differential,
        allowance_total,
        gross_pay,
        sss_contribution,
        philhealth_contribution,
        pagibig_contribution,
        tax_withheld,
        other_deductions,
        total_deductions,
        net_pay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular_inputs(basic_salary: f64, worked_hours: f64) -> PayInputs {
        PayInputs {
            employment_type: EmploymentType::Regular,
            basic_salary,
            base: BasePay::HourlyProrated { worked_hours },
            overtime_hours: 0.0,
            holiday_hours: 0.0,
            night_hours: 0.0,
            allowance_total: 0.0,
            other_deductions: 0.0,
        }
    }

    #[test]
    fn full_month_regular_employee() {
        let breakdown = compute(&regular_inputs(32_000.0, 160.0));
        assert_eq!(breakdown.base_pay, 32_000.0);
        assert_eq!(breakdown.gross_pay, 32_000.0);
        assert_eq!(breakdown.sss_contribution, 1_600.0);
        assert_eq!(breakdown.philhealth_contribution, 800.0);
        assert_eq!(breakdown.pagibig_contribution, 50.0);
        assert_eq!(breakdown.tax_withheld, 2_233.33);
        assert_eq!(breakdown.total_deductions, 4_683.33);
        assert_eq!(breakdown.net_pay, 27_316.67);
    }

    #[test]
    fn overtime_pays_quarter_premium() {
        let mut inputs = regular_inputs(32_000.0, 160.0);
        inputs.overtime_hours = 8.0;
        let breakdown = compute(&inputs);
        // hourly rate 200.0 -> 200 * 1.25 * 8
        assert_eq!(breakdown.overtime_pay, 2_000.0);
    }

    #[test]
    fn holiday_and_night_premiums() {
        let mut inputs = regular_inputs(16_000.0, 160.0);
        inputs.holiday_hours = 8.0;
        inputs.night_hours = 10.0;
        let breakdown = compute(&inputs);
        // hourly rate 100.0
        assert_eq!(breakdown.holiday_pay, 1_600.0);
        assert_eq!(breakdown.night_differential, 100.0);
    }

    #[test]
    fn daily_rated_base_pay() {
        let inputs = PayInputs {
            employment_type: EmploymentType::Casual,
            basic_salary: 22_000.0,
            base: BasePay::DailyRated { worked_days: 11.0 },
            overtime_hours: 0.0,
            holiday_hours: 0.0,
            night_hours: 0.0,
            allowance_total: 0.0,
            other_deductions: 0.0,
        };
        // daily rate 1,000 * 11 days
        assert_eq!(compute(&inputs).base_pay, 11_000.0);
    }

    #[test]
    fn job_order_uses_flat_withholding() {
        let mut inputs = regular_inputs(30_000.0, 160.0);
        inputs.employment_type = EmploymentType::JobOrder;
        let breakdown = compute(&inputs);
        assert_eq!(
            breakdown.tax_withheld,
            deductions::job_order_withholding_tax(breakdown.gross_pay)
        );
    }

    #[test]
    fn net_equals_gross_minus_deductions() {
        let cases = [
            regular_inputs(12_345.67, 152.5),
            regular_inputs(85_000.0, 160.0),
            PayInputs {
                employment_type: EmploymentType::PartTime,
                basic_salary: 18_000.0,
                base: BasePay::HourlyProrated { worked_hours: 80.0 },
                overtime_hours: 3.5,
                holiday_hours: 0.0,
                night_hours: 6.0,
                allowance_total: 1_500.0,
                other_deductions: 250.0,
            },
        ];
        for inputs in cases {
            let b = compute(&inputs);
            assert_eq!(b.net_pay, round2(b.gross_pay - b.total_deductions));
            assert_eq!(
                b.total_deductions,
                round2(
                    b.sss_contribution
                        + b.philhealth_contribution
                        + b.pagibig_contribution
                        + b.tax_withheld
                        + b.other_deductions
                )
            );
        }
    }

    #[test]
    fn zero_salary_produces_zero_row() {
        let breakdown = compute(&regular_inputs(0.0, 160.0));
        assert_eq!(breakdown.gross_pay, 0.0);
        assert_eq!(breakdown.total_deductions, 0.0);
        assert_eq!(breakdown.net_pay, 0.0);
    }
}
