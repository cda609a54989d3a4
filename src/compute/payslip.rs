use chrono::NaiveDateTime;

use crate::model::status::PayslipStatus;

/// Fallback stored when a rejection arrives without a reason.
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Unique payslip number derived from the source payroll row and the
/// generation instant: `PS-{payroll_id}-{YYYYmmddHHMMSS}`.
pub fn payslip_number(payroll_id: u64, generated_at: NaiveDateTime) -> String {
    format!("PS-{}-{}", payroll_id, generated_at.format("%Y%m%d%H%M%S"))
}

pub fn rejection_reason(reason: Option<&str>) -> String {
    match reason.map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => DEFAULT_REJECTION_REASON.to_string(),
    }
}

impl PayslipStatus {
    /// Lifecycle: Generated -> Approved | Rejected, Approved -> Distributed.
    /// Rejected and Distributed are terminal.
    pub fn can_transition(self, next: PayslipStatus) -> bool {
        matches!(
            (self, next),
            (PayslipStatus::Generated, PayslipStatus::Approved)
                | (PayslipStatus::Generated, PayslipStatus::Rejected)
                | (PayslipStatus::Approved, PayslipStatus::Distributed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PayslipStatus::Rejected | PayslipStatus::Distributed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn number_embeds_payroll_id_and_timestamp() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap();
        assert_eq!(payslip_number(42, at), "PS-42-20250314092653");
    }

    #[test]
    fn rejection_reason_defaults_when_blank() {
        assert_eq!(rejection_reason(None), DEFAULT_REJECTION_REASON);
        assert_eq!(rejection_reason(Some("   ")), DEFAULT_REJECTION_REASON);
        assert_eq!(rejection_reason(Some("wrong period")), "wrong period");
    }

    #[test]
    fn lifecycle_admits_exactly_three_transitions() {
        use PayslipStatus::*;
        let all = [Generated, Approved, Rejected, Distributed];
        for from in all {
            for to in all {
                let allowed = matches!(
                    (from, to),
                    (Generated, Approved) | (Generated, Rejected) | (Approved, Distributed)
                );
                assert_eq!(from.can_transition(to), allowed, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn rejected_and_distributed_are_terminal() {
        assert!(PayslipStatus::Rejected.is_terminal());
        assert!(PayslipStatus::Distributed.is_terminal());
        assert!(!PayslipStatus::Generated.is_terminal());
        assert!(!PayslipStatus::Approved.is_terminal());
    }
}
