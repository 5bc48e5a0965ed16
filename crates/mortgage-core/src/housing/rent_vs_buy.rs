//! Multi-year rent versus buy comparison.
//!
//! Buying is charged the down payment, closing costs and its after-tax
//! monthly cost, and credited with home equity. Renting is charged rent
//! (growing annually) and credited with the gain on an investment account
//! seeded with the down payment and fed the monthly amount by which owning
//! costs more than renting. The break-even year is the first year buying's
//! net cost drops below renting's.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::MarketDefaults;
use crate::error::MortgageError;
use crate::loan::amortization::{amortization_ledger, balance_after};
use crate::time_value::{annuity_future_value, future_value, monthly_payment, monthly_rate};
use crate::types::{
    require_non_negative, require_positive, require_unit_interval, round_money, with_metadata,
    ComputationOutput, LoanTerms, Money, Percent, Rate,
};
use crate::MortgageResult;

/// Share of first-period interest taken as the average deductible interest.
const INTEREST_AVERAGING_FACTOR: Decimal = dec!(0.8);
/// Difference in net cost treated as a real advantage.
const MATERIAL_DIFFERENCE: Money = dec!(10_000);
const BUY_BREAK_EVEN_YEARS: u32 = 5;
const MAX_HORIZON_YEARS: u32 = 50;
const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyInput {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    pub monthly_rent: Money,
    /// Falls back to the market default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_tax_rate: Option<Rate>,
    /// Falls back to the market default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_rate: Option<Rate>,
    /// Annual upkeep as a fraction of price.
    pub maintenance_rate: Rate,
    #[serde(default)]
    pub monthly_hoa: Money,
    #[serde(default)]
    pub closing_costs: Money,
    pub rent_growth_rate: Rate,
    pub appreciation_rate: Rate,
    /// Annual return on money not tied up in the home.
    pub investment_return: Rate,
    pub marginal_tax_rate: Rate,
    pub horizon_years: u32,
}

/// First-year monthly cost of owning versus renting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCostComparison {
    pub principal_and_interest: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub maintenance: Money,
    pub hoa: Money,
    pub gross_buying_cost: Money,
    pub average_interest: Money,
    pub tax_benefit: Money,
    pub after_tax_buying_cost: Money,
    pub monthly_rent: Money,
    /// After-tax buying cost minus rent.
    pub monthly_difference: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyYear {
    pub year: u32,
    pub home_value: Money,
    pub loan_balance: Money,
    pub equity: Money,
    /// Down payment plus after-tax monthly costs to date.
    pub cumulative_buying_cost: Money,
    pub buying_net_cost: Money,
    pub cumulative_rent: Money,
    pub investment_value: Money,
    /// Investment value less the down payment and monthly contributions.
    pub investment_gain: Money,
    pub renting_net_cost: Money,
    /// Renting net cost minus buying net cost (positive favors buying).
    pub buying_advantage: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentVsBuyRecommendation {
    Buy,
    Rent,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyOutput {
    pub monthly: MonthlyCostComparison,
    pub projections: Vec<RentVsBuyYear>,
    /// First year buying is cheaper, or `horizon_years + 1` if never.
    pub break_even_year: u32,
    pub break_even_reached: bool,
    /// Buying advantage in the final year.
    pub final_net_difference: Money,
    pub recommendation: RentVsBuyRecommendation,
    pub guidance: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare the cost of buying against renting over the horizon.
pub fn analyze_rent_vs_buy(
    input: &RentVsBuyInput,
    defaults: &MarketDefaults,
) -> MortgageResult<ComputationOutput<RentVsBuyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate(input)?;

    let price = input.home_price;
    let loan = LoanTerms {
        principal: price - input.down_payment,
        annual_rate_percent: input.annual_rate_percent,
        term_years: input.term_years,
    };
    let ledger = amortization_ledger(&loan, Decimal::ZERO)?;

    let tax_rate = match input.property_tax_rate {
        Some(rate) => rate,
        None => defaults.default_property_tax_rate()?,
    };
    let insurance_rate = input.insurance_rate.unwrap_or(defaults.insurance_rate);

    let principal_and_interest =
        monthly_payment(loan.principal, loan.annual_rate_percent, loan.term_years)?;
    let property_tax = round_money(price * tax_rate / MONTHS_PER_YEAR);
    let insurance = round_money(price * insurance_rate / MONTHS_PER_YEAR);
    let maintenance = round_money(price * input.maintenance_rate / MONTHS_PER_YEAR);
    let hoa = round_money(input.monthly_hoa);
    let carrying_cost = property_tax + insurance + maintenance + hoa;
    let gross_buying_cost = principal_and_interest + carrying_cost;

    let average_interest = round_money(loan.principal * monthly_rate(loan.annual_rate_percent));
    let interest_benefit = average_interest * INTEREST_AVERAGING_FACTOR * input.marginal_tax_rate;
    let property_tax_benefit = property_tax * input.marginal_tax_rate;
    let tax_benefit = round_money(interest_benefit + property_tax_benefit);
    let after_tax_buying_cost = gross_buying_cost - tax_benefit;
    // Once the loan is retired only carrying costs and the property tax deduction remain.
    let after_tax_cost_paid_off = carrying_cost - round_money(property_tax_benefit);

    let monthly_difference = after_tax_buying_cost - input.monthly_rent;
    let invested_monthly = monthly_difference.max(Decimal::ZERO);
    let monthly_return = input.investment_return / MONTHS_PER_YEAR;

    if input.horizon_years > input.term_years {
        warnings.push(format!(
            "Horizon runs {} years past loan payoff",
            input.horizon_years - input.term_years
        ));
    }

    let mut projections = Vec::with_capacity(input.horizon_years as usize);
    let mut cumulative_buying_cost = input.down_payment;
    let mut cumulative_rent = Decimal::ZERO;

    for year in 1..=input.horizon_years {
        let monthly_cost = if year <= input.term_years {
            after_tax_buying_cost
        } else {
            after_tax_cost_paid_off
        };
        cumulative_buying_cost += monthly_cost * MONTHS_PER_YEAR;

        let loan_balance = balance_after(&ledger, loan.principal, year * 12);
        let home_value = round_money(future_value(input.appreciation_rate, year, price)?);
        let equity = home_value - loan_balance;
        let buying_net_cost = cumulative_buying_cost + input.closing_costs - equity;

        let annual_rent = future_value(
            input.rent_growth_rate,
            year - 1,
            input.monthly_rent * MONTHS_PER_YEAR,
        )?;
        cumulative_rent = cumulative_rent
            .checked_add(round_money(annual_rent))
            .ok_or_else(|| MortgageError::overflow("rent_growth_rate"))?;

        let lump_sum = future_value(input.investment_return, year, input.down_payment)?;
        let contributions = annuity_future_value(monthly_return, year * 12, invested_monthly)?;
        let investment_value = round_money(
            lump_sum
                .checked_add(contributions)
                .ok_or_else(|| MortgageError::overflow("investment_return"))?,
        );
        let contributed = invested_monthly * Decimal::from(year * 12);
        let investment_gain = investment_value - input.down_payment - contributed;
        let renting_net_cost = cumulative_rent
            .checked_sub(investment_gain)
            .ok_or_else(|| MortgageError::overflow("investment_return"))?;
        let buying_advantage = renting_net_cost
            .checked_sub(buying_net_cost)
            .ok_or_else(|| MortgageError::overflow("horizon_years"))?;

        projections.push(RentVsBuyYear {
            year,
            home_value,
            loan_balance,
            equity,
            cumulative_buying_cost,
            buying_net_cost,
            cumulative_rent,
            investment_value,
            investment_gain,
            renting_net_cost,
            buying_advantage,
        });
    }

    let break_even_year = projections
        .iter()
        .find(|p| p.buying_net_cost < p.renting_net_cost)
        .map(|p| p.year)
        .unwrap_or(input.horizon_years + 1);
    let break_even_reached = break_even_year <= input.horizon_years;
    let final_net_difference = projections
        .last()
        .map(|p| p.buying_advantage)
        .ok_or_else(|| MortgageError::invalid("horizon_years", "Projection produced no years"))?;

    let recommendation = recommend(break_even_year, input.horizon_years, final_net_difference);
    let guidance = match recommendation {
        RentVsBuyRecommendation::Buy => format!(
            "Buying pulls ahead in year {break_even_year} and leads by {final_net_difference} \
             after {} years.",
            input.horizon_years
        ),
        RentVsBuyRecommendation::Rent => format!(
            "Renting stays cheaper over the {}-year horizon.",
            input.horizon_years
        ),
        RentVsBuyRecommendation::Neutral => "The numbers are close. Let lifestyle decide: how \
            long you expect to stay, how much flexibility you need and whether you want to \
            take on upkeep."
            .to_string(),
    };

    tracing::debug!(
        break_even_year,
        final_net_difference = %final_net_difference,
        ?recommendation,
        "rent vs buy projected"
    );

    let output = RentVsBuyOutput {
        monthly: MonthlyCostComparison {
            principal_and_interest,
            property_tax,
            insurance,
            maintenance,
            hoa,
            gross_buying_cost,
            average_interest,
            tax_benefit,
            after_tax_buying_cost,
            monthly_rent: input.monthly_rent,
            monthly_difference,
        },
        projections,
        break_even_year,
        break_even_reached,
        final_net_difference,
        recommendation,
        guidance,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net cost of ownership vs renting with opportunity-cost compounding",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn recommend(
    break_even_year: u32,
    horizon: u32,
    final_difference: Money,
) -> RentVsBuyRecommendation {
    if break_even_year <= BUY_BREAK_EVEN_YEARS && final_difference >= MATERIAL_DIFFERENCE {
        RentVsBuyRecommendation::Buy
    } else if break_even_year > horizon || final_difference <= -MATERIAL_DIFFERENCE {
        RentVsBuyRecommendation::Rent
    } else {
        RentVsBuyRecommendation::Neutral
    }
}

fn require_growth_rate(field: &str, rate: Rate) -> MortgageResult<()> {
    if rate <= dec!(-1) || rate > Decimal::ONE {
        return Err(MortgageError::invalid(field, "Rate must be in (-1, 1]"));
    }
    Ok(())
}

fn validate(input: &RentVsBuyInput) -> MortgageResult<()> {
    require_positive("home_price", input.home_price)?;
    require_non_negative("down_payment", input.down_payment)?;
    if input.down_payment > input.home_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment cannot exceed the home price",
        ));
    }
    require_positive("monthly_rent", input.monthly_rent)?;
    require_non_negative("monthly_hoa", input.monthly_hoa)?;
    require_non_negative("closing_costs", input.closing_costs)?;
    if let Some(rate) = input.property_tax_rate {
        require_unit_interval("property_tax_rate", rate)?;
    }
    if let Some(rate) = input.insurance_rate {
        require_unit_interval("insurance_rate", rate)?;
    }
    require_unit_interval("maintenance_rate", input.maintenance_rate)?;
    require_unit_interval("marginal_tax_rate", input.marginal_tax_rate)?;
    require_growth_rate("rent_growth_rate", input.rent_growth_rate)?;
    require_growth_rate("appreciation_rate", input.appreciation_rate)?;
    require_growth_rate("investment_return", input.investment_return)?;
    if input.horizon_years == 0 || input.horizon_years > MAX_HORIZON_YEARS {
        return Err(MortgageError::invalid(
            "horizon_years",
            "Horizon must be between 1 and 50 years",
        ));
    }
    // Loan rate and term are validated by the amortization ledger.
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
