//! Full monthly housing payment: principal and interest plus escrow.
//!
//! Each line item is rounded to cents on its own before the total is taken,
//! so the total always equals the sum of the amounts a borrower sees.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::MarketDefaults;
use crate::error::MortgageError;
use crate::time_value::monthly_payment;
use crate::types::{
    require_non_negative, require_positive, round_money, validate_rate_percent,
    validate_term_years, with_metadata, ComputationOutput, Money, Percent, Rate,
};
use crate::MortgageResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly payment request. Optional amounts override the market defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgagePaymentInput {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    /// Known annual property tax bill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_property_tax: Option<Money>,
    /// Known annual homeowners insurance premium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_insurance: Option<Money>,
    /// Monthly PMI quoted by the lender; always used when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_pmi: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_hoa: Option<Money>,
    /// Jurisdiction whose combined rate replaces the default tax rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

/// Monthly housing budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageBudget {
    pub home_price: Money,
    pub down_payment: Money,
    pub down_payment_percent: Decimal,
    pub loan_amount: Money,
    pub loan_to_value: Rate,
    pub principal_and_interest: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub pmi: Money,
    /// Whether the down payment is below the PMI threshold.
    pub pmi_required: bool,
    pub hoa: Money,
    pub total_monthly_payment: Money,
    /// Interest paid over the full term at the level payment.
    pub total_interest: Money,
    /// All principal-and-interest payments over the term.
    pub total_cost_of_loan: Money,
}

/// Compose the full monthly mortgage payment.
pub fn calculate_mortgage_payment(
    input: &MortgagePaymentInput,
    defaults: &MarketDefaults,
) -> MortgageResult<ComputationOutput<MortgageBudget>> {
    let start = Instant::now();
    let (budget, warnings) = compose_budget(input, defaults)?;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment P&I plus escrow (tax, insurance, PMI, HOA)",
        input,
        warnings,
        elapsed,
        budget,
    ))
}

/// Budget computation without the output envelope, for reuse by other calculators.
pub fn compose_budget(
    input: &MortgagePaymentInput,
    defaults: &MarketDefaults,
) -> MortgageResult<(MortgageBudget, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    validate(input)?;

    let price = input.home_price;
    let loan_amount = price - input.down_payment;
    let months = input.term_years * 12;

    let principal_and_interest =
        monthly_payment(loan_amount, input.annual_rate_percent, input.term_years)?;

    let property_tax = match input.annual_property_tax {
        Some(annual) => round_money(annual / MONTHS_PER_YEAR),
        None => {
            let rate = match input.jurisdiction.as_deref() {
                Some(key) => {
                    let resolved = defaults.jurisdiction(key)?;
                    if resolved.fell_back {
                        warnings.push(format!(
                            "Unknown jurisdiction '{key}'; using '{}' rates",
                            resolved.key
                        ));
                    }
                    resolved.rates.total()
                }
                None => defaults.default_property_tax_rate()?,
            };
            round_money(price * rate / MONTHS_PER_YEAR)
        }
    };

    let insurance = match input.annual_insurance {
        Some(annual) => round_money(annual / MONTHS_PER_YEAR),
        None => round_money(price * defaults.insurance_rate / MONTHS_PER_YEAR),
    };

    let down_ratio = input.down_payment / price;
    let pmi_required = down_ratio < defaults.pmi_down_payment_threshold;
    let pmi = match input.monthly_pmi {
        Some(quoted) => round_money(quoted),
        None if pmi_required => round_money(loan_amount * defaults.pmi_rate / MONTHS_PER_YEAR),
        None => Decimal::ZERO,
    };
    if pmi_required && input.monthly_pmi.is_none() {
        warnings.push(format!(
            "Down payment of {}% is below {}%; PMI estimated at {}% of the loan per year",
            round_money(down_ratio * Decimal::ONE_HUNDRED),
            defaults.pmi_down_payment_threshold * Decimal::ONE_HUNDRED,
            defaults.pmi_rate * Decimal::ONE_HUNDRED,
        ));
    }

    let hoa = round_money(input.monthly_hoa.unwrap_or(Decimal::ZERO));

    let total_monthly_payment = principal_and_interest + property_tax + insurance + pmi + hoa;
    let total_cost_of_loan = principal_and_interest * Decimal::from(months);
    let total_interest = (total_cost_of_loan - loan_amount).max(Decimal::ZERO);

    let budget = MortgageBudget {
        home_price: price,
        down_payment: input.down_payment,
        down_payment_percent: round_money(down_ratio * Decimal::ONE_HUNDRED),
        loan_amount,
        loan_to_value: loan_amount / price,
        principal_and_interest,
        property_tax,
        insurance,
        pmi,
        pmi_required,
        hoa,
        total_monthly_payment,
        total_interest,
        total_cost_of_loan,
    };

    Ok((budget, warnings))
}

fn validate(input: &MortgagePaymentInput) -> MortgageResult<()> {
    require_positive("home_price", input.home_price)?;
    require_non_negative("down_payment", input.down_payment)?;
    if input.down_payment > input.home_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment cannot exceed the home price",
        ));
    }
    validate_rate_percent("annual_rate_percent", input.annual_rate_percent)?;
    validate_term_years("term_years", input.term_years)?;
    for (field, value) in [
        ("annual_property_tax", input.annual_property_tax),
        ("annual_insurance", input.annual_insurance),
        ("monthly_pmi", input.monthly_pmi),
        ("monthly_hoa", input.monthly_hoa),
    ] {
        if let Some(v) = value {
            require_non_negative(field, v)?;
        }
    }
    Ok(())
}
