pub mod attendance;
pub mod catalog;
pub mod department;
pub mod employee;
pub mod leave;
pub mod payroll;
pub mod payslip;
pub mod period;
