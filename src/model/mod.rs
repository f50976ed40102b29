pub mod attendance;
pub mod employee;
pub mod manual_payment;
pub mod payroll;
pub mod period;
pub mod role;
