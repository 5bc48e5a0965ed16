pub mod affordability;
pub mod refinance;
