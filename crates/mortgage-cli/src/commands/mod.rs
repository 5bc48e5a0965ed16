pub mod arm;
pub mod borrower;
pub mod housing;
pub mod loan;
