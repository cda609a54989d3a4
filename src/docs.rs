use crate::api::attendance::{AttendanceQuery, CorrectAttendance, DailySummary, RecordAttendance};
use crate::api::catalog::{AssignAllowance, AssignDeduction, CreateAllowance, CreateDeduction};
use crate::api::department::{CreateDepartment, CreatePosition};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::leave::{AccrualQuery, GrantCredits, LeaveQuery, RequestLeave};
use crate::api::payroll::{ContributionPreview, ContributionQuery, ProcessPayroll};
use crate::compute::deductions::ContributionSplit;
use crate::model::catalog::{Allowance, Deduction, EmployeeAllowance, EmployeeDeduction};
use crate::api::payslip::{GeneratePayslips, GenerateReport, RejectPayslip};
use crate::api::period::CreatePeriod;
use crate::compute::leave::{AccrualReport, AccrualSide};
use crate::compute::pay::PayBreakdown;
use crate::model::attendance::Attendance;
use crate::model::department::{Department, Position};
use crate::model::employee::Employee;
use crate::model::leave::{Leave, LeaveCredit, LeaveType};
use crate::model::payroll::{Payroll, PayrollPeriod};
use crate::model::payslip::Payslip;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LGU HR & Payroll API",
        version = "1.0.0",
        description = r#"
## Local Government Unit HR & Payroll System

This API powers the HR and payroll back office of a local government unit.

### 🔹 Key Features
- **Employee Management**
  - Roster with generated employee codes, archival instead of deletion
- **Attendance**
  - Daily punch records with derived working hours and lateness tagging
- **Leave Management**
  - Requests, approval against a credit ledger, monthly accrual reports
- **Payroll**
  - Period lifecycle, itemized computation with PH statutory deductions
    (SSS, PhilHealth, Pag-IBIG, withholding tax)
- **Payslips**
  - Immutable snapshots with a Generated → Approved → Distributed lifecycle

### 🔐 Security
All endpoints under the API prefix require **JWT Bearer authentication**;
authorization is enforced per role (Admin, HR Officer, Department Head,
Employee, Payroll Staff).

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::archive_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::create_position,
        crate::api::department::list_positions,

        crate::api::attendance::record_attendance,
        crate::api::attendance::correct_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::daily_summary,

        crate::api::leave::request_leave,
        crate::api::leave::list_leaves,
        crate::api::leave::get_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::list_leave_types,
        crate::api::leave::get_leave_credits,
        crate::api::leave::grant_leave_credits,
        crate::api::leave::accrual_report,

        crate::api::period::create_period,
        crate::api::period::list_periods,
        crate::api::period::close_period,

        crate::api::payroll::process_payroll,
        crate::api::payroll::contribution_preview,
        crate::api::payroll::list_payrolls_for_period,
        crate::api::payroll::get_payroll,
        crate::api::payroll::delete_draft_payroll,
        crate::api::payroll::approve_payroll,

        crate::api::payslip::generate_payslips,
        crate::api::payslip::list_payslips_for_employee,
        crate::api::payslip::get_payslip,
        crate::api::payslip::approve_payslip,
        crate::api::payslip::reject_payslip,
        crate::api::payslip::distribute_payslip,
        crate::api::payslip::claim_payslip,

        crate::api::catalog::create_allowance,
        crate::api::catalog::list_allowances,
        crate::api::catalog::create_deduction,
        crate::api::catalog::list_deductions,
        crate::api::catalog::assign_allowance,
        crate::api::catalog::assign_deduction,
        crate::api::catalog::list_employee_allowances,
        crate::api::catalog::list_employee_deductions
    ),
    components(
        schemas(
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Employee,
            CreateDepartment,
            CreatePosition,
            Department,
            Position,
            RecordAttendance,
            CorrectAttendance,
            AttendanceQuery,
            DailySummary,
            Attendance,
            RequestLeave,
            LeaveQuery,
            GrantCredits,
            AccrualQuery,
            AccrualReport,
            AccrualSide,
            Leave,
            LeaveType,
            LeaveCredit,
            CreatePeriod,
            PayrollPeriod,
            ProcessPayroll,
            Payroll,
            PayBreakdown,
            GeneratePayslips,
            GenerateReport,
            RejectPayslip,
            Payslip,
            ContributionQuery,
            ContributionPreview,
            ContributionSplit,
            CreateAllowance,
            CreateDeduction,
            AssignAllowance,
            AssignDeduction,
            Allowance,
            Deduction,
            EmployeeAllowance,
            EmployeeDeduction
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee roster APIs"),
        (name = "Department", description = "Department and position APIs"),
        (name = "Attendance", description = "Attendance recording APIs"),
        (name = "Leave", description = "Leave request and credit APIs"),
        (name = "Payroll", description = "Payroll period and computation APIs"),
        (name = "Payslip", description = "Payslip lifecycle APIs"),
        (name = "Catalog", description = "Allowance and deduction catalog APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
