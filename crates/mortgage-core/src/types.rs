use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::MortgageResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.012 = 1.2%).
pub type Rate = Decimal;

/// Loan interest rates quoted the way lenders quote them (7.25 = 7.25%).
pub type Percent = Decimal;

/// Largest amount any calculator accepts (one quadrillion). Keeps per-period
/// products and multi-decade totals inside the Decimal range.
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000_000);

/// Round to the currency minor unit, half away from zero.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Basic loan parameters shared by every calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
}

impl LoanTerms {
    pub fn term_months(&self) -> u32 {
        self.term_years * 12
    }

    pub fn validate(&self) -> MortgageResult<()> {
        require_non_negative("principal", self.principal)?;
        validate_rate_percent("annual_rate_percent", self.annual_rate_percent)?;
        validate_term_years("term_years", self.term_years)
    }
}

pub(crate) fn require_non_negative(field: &str, value: Decimal) -> MortgageResult<()> {
    if value < Decimal::ZERO {
        return Err(MortgageError::invalid(field, "Value cannot be negative"));
    }
    require_within_range(field, value)
}

pub(crate) fn require_positive(field: &str, value: Decimal) -> MortgageResult<()> {
    if value <= Decimal::ZERO {
        return Err(MortgageError::invalid(field, "Value must be positive"));
    }
    require_within_range(field, value)
}

fn require_within_range(field: &str, value: Decimal) -> MortgageResult<()> {
    if value > MAX_AMOUNT {
        return Err(MortgageError::invalid(
            field,
            "Value exceeds the supported maximum of 1,000,000,000,000,000",
        ));
    }
    Ok(())
}

pub(crate) fn require_unit_interval(field: &str, value: Rate) -> MortgageResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(MortgageError::invalid(field, "Rate must be between 0 and 1"));
    }
    Ok(())
}

pub(crate) fn validate_rate_percent(field: &str, rate: Percent) -> MortgageResult<()> {
    if rate < Decimal::ZERO {
        return Err(MortgageError::invalid(field, "Interest rate cannot be negative"));
    }
    if rate > Decimal::ONE_HUNDRED {
        return Err(MortgageError::invalid(
            field,
            "Interest rate above 100% is not supported",
        ));
    }
    Ok(())
}

pub(crate) fn validate_term_years(field: &str, years: u32) -> MortgageResult<()> {
    if years == 0 {
        return Err(MortgageError::invalid(field, "Term must be at least 1 year"));
    }
    if years > 50 {
        return Err(MortgageError::invalid(field, "Term cannot exceed 50 years"));
    }
    Ok(())
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
