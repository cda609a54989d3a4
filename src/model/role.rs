/// Closed set of dashboard roles. Stored as numeric ids in the users table
/// and in JWT claims; never compared as strings.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Officer = 2,
    DeptHead = 3,
    Employee = 4,
    PayrollStaff = 5,
}

/// Operations gated by role. Authorization rules live in one place
/// (`Role::allows`) instead of ad hoc comparisons in each handler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Capability {
    ManageEmployees,
    ArchiveEmployees,
    ManageDepartments,
    RecordAttendance,
    ApproveLeave,
    GrantLeaveCredits,
    ManagePeriods,
    ProcessPayroll,
    ApprovePayroll,
    GeneratePayslips,
    ReviewPayslips,
    DistributePayslips,
    ViewReports,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Officer),
            3 => Some(Role::DeptHead),
            4 => Some(Role::Employee),
            5 => Some(Role::PayrollStaff),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn allows(self, capability: Capability) -> bool {
        use Capability::*;
        use Role::*;
        match capability {
            ManageEmployees => matches!(self, Admin | Officer),
            ArchiveEmployees => self == Admin,
            ManageDepartments => matches!(self, Admin | Officer),
            RecordAttendance => matches!(self, Admin | Officer),
            ApproveLeave => matches!(self, Admin | Officer | DeptHead),
            GrantLeaveCredits => matches!(self, Admin | Officer),
            ManagePeriods => matches!(self, Admin | PayrollStaff),
            ProcessPayroll => matches!(self, Admin | PayrollStaff),
            ApprovePayroll => self == Admin,
            GeneratePayslips => matches!(self, Admin | PayrollStaff),
            ReviewPayslips => self == Admin,
            DistributePayslips => matches!(self, Admin | PayrollStaff),
            ViewReports => matches!(self, Admin | Officer | DeptHead | PayrollStaff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for role in [
            Role::Admin,
            Role::Officer,
            Role::DeptHead,
            Role::Employee,
            Role::PayrollStaff,
        ] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(6), None);
    }

    #[test]
    fn payroll_capabilities_stay_off_hr_roles() {
        assert!(Role::PayrollStaff.allows(Capability::ProcessPayroll));
        assert!(!Role::Officer.allows(Capability::ProcessPayroll));
        assert!(!Role::PayrollStaff.allows(Capability::ApproveLeave));
        assert!(!Role::Employee.allows(Capability::RecordAttendance));
        assert!(Role::Admin.allows(Capability::ReviewPayslips));
        assert!(!Role::PayrollStaff.allows(Capability::ReviewPayslips));
    }
}
