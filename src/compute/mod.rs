//! Pure payroll, attendance, and leave arithmetic. Everything here is a
//! function of its inputs; persistence lives in the api handlers.

pub mod deductions;
pub mod leave;
pub mod pay;
pub mod payslip;
pub mod timesheet;
