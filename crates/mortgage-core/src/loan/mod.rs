pub mod amortization;
pub mod monthly_payment;
