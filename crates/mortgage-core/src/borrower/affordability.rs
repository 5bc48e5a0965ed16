//! Maximum affordable home price from income, debts and down payment.
//!
//! The monthly housing budget is the lesser of the front-end limit
//! (`income × front-end ratio`) and the back-end limit
//! (`income × 36% − existing debts`). The solver then finds the largest price
//! on a $1,000 grid between $100,000 and $5,000,000 whose estimated payment
//! fits the budget.
//!
//! The estimate prices escrow as a flat rate of the home price (tax +
//! insurance + a 0.5% PMI allowance), which makes it strictly increasing in
//! price and lets the grid be searched by bisection. Because the PMI allowance
//! is charged on the price rather than the loan and regardless of down
//! payment, the composed payment at the solved price never exceeds the budget.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::MarketDefaults;
use crate::error::MortgageError;
use crate::time_value::monthly_payment;
use crate::types::{
    require_non_negative, require_positive, require_unit_interval, round_money,
    validate_rate_percent, validate_term_years, with_metadata, ComputationOutput, Money, Percent,
    Rate,
};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Total-debt-to-income ceiling. Not caller-configurable.
pub const BACK_END_RATIO: Rate = dec!(0.36);

/// Housing ratio above which a qualifying borrower is cautioned.
const FRONT_END_GUIDELINE: Rate = dec!(0.28);

const MIN_SEARCH_PRICE: Money = dec!(100_000);
const MAX_SEARCH_PRICE: Money = dec!(5_000_000);
const PRICE_STEP: Money = dec!(1_000);
/// Grid points above the minimum: ($5,000,000 - $100,000) / $1,000.
const SEARCH_STEPS: u32 = 4_900;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityProfile {
    pub monthly_gross_income: Money,
    /// Existing monthly debt service (cards, auto, student loans).
    pub monthly_debts: Money,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_tax_rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_rate: Option<Rate>,
    /// Overrides the market front-end ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_front_end_ratio: Option<Rate>,
}

/// Estimated monthly housing payment at a candidate price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HousingPaymentEstimate {
    pub principal_and_interest: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub pmi_allowance: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffordabilityRecommendation {
    IncreaseIncomeOrSavings,
    ReduceDebts,
    ConsiderPaymentCarefully,
    StrongPosition,
}

impl AffordabilityRecommendation {
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::IncreaseIncomeOrSavings => {
                "No home price from $100,000 fits this budget. Increase income, \
                 reduce debt or save a larger down payment."
            }
            Self::ReduceDebts => {
                "Total debt exceeds 36% of income. Reducing existing debts would \
                 improve loan approval odds."
            }
            Self::ConsiderPaymentCarefully => {
                "You qualify, but housing costs exceed 28% of income. Consider the \
                 monthly payment carefully."
            }
            Self::StrongPosition => {
                "Strong financial position: housing and total debt ratios are within \
                 conventional guidelines."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    /// False when no price on the search grid fits the budget.
    pub feasible: bool,
    pub max_home_price: Money,
    pub max_loan_amount: Money,
    /// Housing budget implied by the ratio limits.
    pub max_monthly_payment: Money,
    /// Estimated payment at `max_home_price`.
    pub estimated_payment: HousingPaymentEstimate,
    /// Housing payment / income at the solved price.
    pub front_end_ratio: Rate,
    /// (Housing payment + debts) / income at the solved price.
    pub back_end_ratio: Rate,
    pub recommendation: AffordabilityRecommendation,
    pub guidance: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for the maximum affordable home price.
pub fn calculate_affordability(
    profile: &AffordabilityProfile,
    defaults: &MarketDefaults,
) -> MortgageResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate(profile)?;

    let income = profile.monthly_gross_income;
    let front_ratio = profile
        .max_front_end_ratio
        .unwrap_or(defaults.front_end_ratio);
    let front_limit = income * front_ratio;
    let back_limit = income * BACK_END_RATIO - profile.monthly_debts;
    let max_monthly_payment = round_money(front_limit.min(back_limit).max(Decimal::ZERO));

    if back_limit < front_limit {
        warnings.push("Existing debts make the back-end ratio the binding limit".into());
    }

    let solved = if max_monthly_payment > Decimal::ZERO {
        solve_max_price(profile, defaults, max_monthly_payment)?
    } else {
        None
    };

    let output = match solved {
        Some((price, estimate)) => {
            if price == MAX_SEARCH_PRICE {
                warnings.push("Result capped at the $5,000,000 search ceiling".into());
            }
            let front_end_ratio = (estimate.total / income).round_dp(4);
            let back_end_ratio = ((estimate.total + profile.monthly_debts) / income).round_dp(4);
            // Unreachable while the budget nets debts out of the back-end limit:
            // a solved price cannot exceed it. Kept so the ratio is checked first.
            let recommendation = if back_end_ratio > BACK_END_RATIO {
                AffordabilityRecommendation::ReduceDebts
            } else if front_end_ratio > FRONT_END_GUIDELINE {
                AffordabilityRecommendation::ConsiderPaymentCarefully
            } else {
                AffordabilityRecommendation::StrongPosition
            };
            AffordabilityOutput {
                feasible: true,
                max_home_price: price,
                max_loan_amount: (price - profile.down_payment).max(Decimal::ZERO),
                max_monthly_payment,
                estimated_payment: estimate,
                front_end_ratio,
                back_end_ratio,
                recommendation,
                guidance: recommendation.guidance().to_string(),
            }
        }
        None => {
            let recommendation = AffordabilityRecommendation::IncreaseIncomeOrSavings;
            AffordabilityOutput {
                feasible: false,
                max_home_price: Decimal::ZERO,
                max_loan_amount: Decimal::ZERO,
                max_monthly_payment,
                estimated_payment: HousingPaymentEstimate::default(),
                front_end_ratio: Decimal::ZERO,
                back_end_ratio: (profile.monthly_debts / income).round_dp(4),
                recommendation,
                guidance: recommendation.guidance().to_string(),
            }
        }
    };

    tracing::debug!(
        feasible = output.feasible,
        max_home_price = %output.max_home_price,
        max_monthly_payment = %max_monthly_payment,
        "affordability solved"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "28/36 DTI budget inverted over a $1,000 price grid (bisection)",
        profile,
        warnings,
        elapsed,
        output,
    ))
}

/// Estimated monthly housing payment at `price` under the profile's rates.
pub fn estimate_housing_payment(
    price: Money,
    profile: &AffordabilityProfile,
    defaults: &MarketDefaults,
) -> MortgageResult<HousingPaymentEstimate> {
    let tax_rate = match profile.property_tax_rate {
        Some(rate) => rate,
        None => defaults.default_property_tax_rate()?,
    };
    let insurance_rate = profile.insurance_rate.unwrap_or(defaults.insurance_rate);
    let loan = (price - profile.down_payment).max(Decimal::ZERO);

    let principal_and_interest =
        monthly_payment(loan, profile.annual_rate_percent, profile.term_years)?;
    let property_tax = round_money(price * tax_rate / MONTHS_PER_YEAR);
    let insurance = round_money(price * insurance_rate / MONTHS_PER_YEAR);
    let pmi_allowance = round_money(price * defaults.pmi_rate / MONTHS_PER_YEAR);

    Ok(HousingPaymentEstimate {
        principal_and_interest,
        property_tax,
        insurance,
        pmi_allowance,
        total: principal_and_interest + property_tax + insurance + pmi_allowance,
    })
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn grid_price(step: u32) -> Money {
    MIN_SEARCH_PRICE + PRICE_STEP * Decimal::from(step)
}

/// Largest grid price whose estimate fits `budget`, or `None` if even the
/// lowest price does not.
fn solve_max_price(
    profile: &AffordabilityProfile,
    defaults: &MarketDefaults,
    budget: Money,
) -> MortgageResult<Option<(Money, HousingPaymentEstimate)>> {
    let fits = |step: u32| -> MortgageResult<Option<HousingPaymentEstimate>> {
        let estimate = estimate_housing_payment(grid_price(step), profile, defaults)?;
        Ok((estimate.total <= budget).then_some(estimate))
    };

    let Some(mut best) = fits(0)? else {
        return Ok(None);
    };
    if let Some(top) = fits(SEARCH_STEPS)? {
        return Ok(Some((grid_price(SEARCH_STEPS), top)));
    }

    // Invariant: `lo` fits, `hi` does not.
    let (mut lo, mut hi) = (0u32, SEARCH_STEPS);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        match fits(mid)? {
            Some(estimate) => {
                lo = mid;
                best = estimate;
            }
            None => hi = mid,
        }
    }

    Ok(Some((grid_price(lo), best)))
}

fn validate(profile: &AffordabilityProfile) -> MortgageResult<()> {
    require_positive("monthly_gross_income", profile.monthly_gross_income)?;
    require_non_negative("monthly_debts", profile.monthly_debts)?;
    require_non_negative("down_payment", profile.down_payment)?;
    validate_rate_percent("annual_rate_percent", profile.annual_rate_percent)?;
    validate_term_years("term_years", profile.term_years)?;
    if let Some(rate) = profile.property_tax_rate {
        require_unit_interval("property_tax_rate", rate)?;
    }
    if let Some(rate) = profile.insurance_rate {
        require_unit_interval("insurance_rate", rate)?;
    }
    if let Some(ratio) = profile.max_front_end_ratio {
        if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
            return Err(MortgageError::invalid(
                "max_front_end_ratio",
                "Front-end ratio must be in (0, 1]",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
