pub mod deduction;
pub mod employee;
pub mod employment;
pub mod message;
pub mod payslip;
pub mod role;
