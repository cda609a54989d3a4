use serde::Serialize;
use utoipa::ToSchema;

use crate::model::status::EmploymentType;

/// Round a peso amount to centavos.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// SSS minimum / maximum monthly salary credit (2025 schedule)
pub const SSS_MIN_SALARY_CREDIT: f64 = 5_000.0;
pub const SSS_MAX_SALARY_CREDIT: f64 = 35_000.0;
pub const SSS_EMPLOYEE_RATE: f64 = 0.05;
pub const SSS_EMPLOYER_RATE: f64 = 0.10;

pub const PHILHEALTH_SALARY_FLOOR: f64 = 10_000.0;
pub const PHILHEALTH_SALARY_CEILING: f64 = 100_000.0;
pub const PHILHEALTH_PREMIUM_RATE: f64 = 0.05;

pub const PAGIBIG_SALARY_CEILING: f64 = 5_000.0;
pub const PAGIBIG_FLAT_THRESHOLD: f64 = 1_500.0;
pub const PAGIBIG_FLAT_CONTRIBUTION: f64 = 100.0;
pub const PAGIBIG_RATE: f64 = 0.02;

pub const GSIS_EMPLOYEE_RATE: f64 = 0.09;
pub const GSIS_EMPLOYER_RATE: f64 = 0.12;

/// First TRAIN bracket boundary, expressed monthly (250,000 / 12).
pub const TAX_EXEMPT_MONTHLY: f64 = 250_000.0 / 12.0;

/// Employee/employer contribution split for a statutory scheme.
///
/// `total` is always the sum of the two rounded shares, so the split
/// reconciles to the centavo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ContributionSplit {
    pub employee_share: f64,
    pub employer_share: f64,
    pub total: f64,
}

impl ContributionSplit {
    pub const ZERO: ContributionSplit = ContributionSplit {
        employee_share: 0.0,
        employer_share: 0.0,
        total: 0.0,
    };

    fn from_shares(employee: f64, employer: f64) -> Self {
        let employee_share = round2(employee);
        let employer_share = round2(employer);
        ContributionSplit {
            employee_share,
            employer_share,
            total: round2(employee_share + employer_share),
        }
    }
}

/// SSS contribution on the effective monthly salary credit.
pub fn sss(salary: f64) -> ContributionSplit {
    if salary <= 0.0 {
        return ContributionSplit::ZERO;
    }
    let credit = salary.clamp(SSS_MIN_SALARY_CREDIT, SSS_MAX_SALARY_CREDIT);
    ContributionSplit::from_shares(credit * SSS_EMPLOYEE_RATE, credit * SSS_EMPLOYER_RATE)
}

/// PhilHealth premium: 5% of the floored/capped salary, split 50/50.
pub fn philhealth(salary: f64) -> ContributionSplit {
    if salary <= 0.0 {
        return ContributionSplit::ZERO;
    }
    let base = salary.clamp(PHILHEALTH_SALARY_FLOOR, PHILHEALTH_SALARY_CEILING);
    let premium = base * PHILHEALTH_PREMIUM_RATE;
    ContributionSplit::from_shares(premium / 2.0, premium / 2.0)
}

/// Pag-IBIG contribution: flat 100 at or below 1,500, otherwise 2% of the
/// capped salary, split 50/50.
pub fn pagibig(salary: f64) -> ContributionSplit {
    if salary <= 0.0 {
        return ContributionSplit::ZERO;
    }
    let base = salary.min(PAGIBIG_SALARY_CEILING);
    let contribution = if base <= PAGIBIG_FLAT_THRESHOLD {
        PAGIBIG_FLAT_CONTRIBUTION
    } else {
        base * PAGIBIG_RATE
    };
    ContributionSplit::from_shares(contribution / 2.0, contribution / 2.0)
}

/// GSIS contribution on the raw (uncapped) salary.
pub fn gsis(salary: f64) -> ContributionSplit {
    if salary <= 0.0 {
        return ContributionSplit::ZERO;
    }
    ContributionSplit::from_shares(salary * GSIS_EMPLOYEE_RATE, salary * GSIS_EMPLOYER_RATE)
}

/// Monthly withholding tax for regular employees, TRAIN 2023+ schedule.
///
/// Annual brackets (250k / 400k / 800k / 2M / 8M) and their fixed amounts are
/// divided by 12; marginal rates 20/25/30/32/35 % apply to the excess above
/// each boundary.
pub fn withholding_tax(monthly: f64) -> f64 {
    if monthly <= TAX_EXEMPT_MONTHLY {
        0.0
    } else if monthly <= 400_000.0 / 12.0 {
        round2(0.20 * (monthly - 250_000.0 / 12.0))
    } else if monthly <= 800_000.0 / 12.0 {
        round2(30_000.0 / 12.0 + 0.25 * (monthly - 400_000.0 / 12.0))
    } else if monthly <= 2_000_000.0 / 12.0 {
        round2(130_000.0 / 12.0 + 0.30 * (monthly - 800_000.0 / 12.0))
    } else if monthly <= 8_000_000.0 / 12.0 {
        round2(490_000.0 / 12.0 + 0.32 * (monthly - 2_000_000.0 / 12.0))
    } else {
        round2(2_410_000.0 / 12.0 + 0.35 * (monthly - 8_000_000.0 / 12.0))
    }
}

/// Simplified withholding for job-order personnel: flat 20% of the excess
/// above the monthly tax-free boundary.
pub fn job_order_withholding_tax(monthly: f64) -> f64 {
    if monthly <= TAX_EXEMPT_MONTHLY {
        0.0
    } else {
        round2(0.20 * (monthly - TAX_EXEMPT_MONTHLY))
    }
}

/// Pick the bracket function appropriate to the employment type.
pub fn withholding_for(employment_type: EmploymentType, gross_pay: f64) -> f64 {
    match employment_type {
        EmploymentType::JobOrder => job_order_withholding_tax(gross_pay),
        _ => withholding_tax(gross_pay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sss_clamps_salary_credit() {
        let low = sss(3_000.0);
        assert_eq!(low.employee_share, 250.0); // floored at 5,000
        assert_eq!(low.employer_share, 500.0);

        let high = sss(50_000.0);
        assert_eq!(high.employee_share, 1_750.0); // capped at 35,000
        assert_eq!(high.employer_share, 3_500.0);
    }

    #[test]
    fn sss_split_reconciles() {
        for salary in [0.01, 1_234.56, 5_000.0, 17_890.12, 35_000.0, 99_999.99] {
            let split = sss(salary);
            assert_eq!(
                split.total,
                round2(split.employee_share + split.employer_share),
                "split must reconcile for salary {salary}"
            );
        }
    }

    #[test]
    fn philhealth_splits_premium_evenly() {
        let split = philhealth(30_000.0);
        assert_eq!(split.total, 1_500.0);
        assert_eq!(split.employee_share, 750.0);
        assert_eq!(split.employer_share, 750.0);

        // floor applies below 10,000
        assert_eq!(philhealth(8_000.0).total, 500.0);
        // ceiling applies above 100,000
        assert_eq!(philhealth(250_000.0).total, 5_000.0);
    }

    #[test]
    fn pagibig_flat_below_threshold() {
        let split = pagibig(1_200.0);
        assert_eq!(split.total, 100.0);
        assert_eq!(split.employee_share, 50.0);

        let split = pagibig(4_000.0);
        assert_eq!(split.total, 80.0);

        // cap at 5,000
        assert_eq!(pagibig(80_000.0).total, 100.0);
    }

    #[test]
    fn gsis_uses_raw_salary() {
        let split = gsis(40_000.0);
        assert_eq!(split.employee_share, 3_600.0);
        assert_eq!(split.employer_share, 4_800.0);
        assert_eq!(split.total, 8_400.0);
    }

    #[test]
    fn zero_or_negative_salary_yields_zero() {
        for salary in [0.0, -1.0, -50_000.0] {
            assert_eq!(sss(salary), ContributionSplit::ZERO);
            assert_eq!(philhealth(salary), ContributionSplit::ZERO);
            assert_eq!(pagibig(salary), ContributionSplit::ZERO);
            assert_eq!(gsis(salary), ContributionSplit::ZERO);
            assert_eq!(withholding_tax(salary), 0.0);
            assert_eq!(job_order_withholding_tax(salary), 0.0);
        }
    }

    #[test]
    fn withholding_tax_bracket_boundary() {
        assert_eq!(withholding_tax(20_833.33), 0.0);
        assert!(withholding_tax(25_000.0) > 0.0);
        // 30,000: 20% of the excess over 250,000/12
        assert_eq!(withholding_tax(30_000.0), 1_833.33);
    }

    #[test]
    fn withholding_tax_upper_brackets() {
        // 50,000 falls in the 25% bracket: 2,500 + 25% of (50,000 - 33,333.33)
        assert_eq!(withholding_tax(50_000.0), 6_666.67);
        // 100,000 falls in the 30% bracket
        assert_eq!(withholding_tax(100_000.0), 20_833.33);
    }

    #[test]
    fn job_order_withholding_is_flat_twenty_percent() {
        assert_eq!(job_order_withholding_tax(20_833.33), 0.0);
        assert_eq!(job_order_withholding_tax(30_833.33 + 10_000.0), 4_000.0);
        assert_eq!(job_order_withholding_tax(25_000.0), round2(0.20 * (25_000.0 - TAX_EXEMPT_MONTHLY)));
    }

    #[test]
    fn employment_type_dispatch() {
        let gross = 40_000.0;
        assert_eq!(
            withholding_for(EmploymentType::JobOrder, gross),
            job_order_withholding_tax(gross)
        );
        assert_eq!(
            withholding_for(EmploymentType::Regular, gross),
            withholding_tax(gross)
        );
        assert_eq!(
            withholding_for(EmploymentType::Casual, gross),
            withholding_tax(gross)
        );
    }
}
