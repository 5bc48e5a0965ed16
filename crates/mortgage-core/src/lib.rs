pub mod config;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loan")]
pub mod loan;

#[cfg(feature = "borrower")]
pub mod borrower;

#[cfg(feature = "arm")]
pub mod arm;

#[cfg(feature = "housing")]
pub mod housing;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage calculations
pub type MortgageResult<T> = Result<T, MortgageError>;
