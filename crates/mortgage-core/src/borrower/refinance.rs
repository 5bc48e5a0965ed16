//! Refinance economics: payment change, closing-cost break-even and
//! lifetime interest comparison.
//!
//! Lifetime interest for each loan is approximated as
//! `payment × remaining payments − balance` rather than by re-running the
//! amortization ledger; the envelope carries a warning saying so.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::time_value::{level_payment, monthly_payment};
use crate::types::{
    require_non_negative, require_positive, round_money, validate_rate_percent,
    validate_term_years, with_metadata, ComputationOutput, Money, Percent,
};
use crate::MortgageResult;

const EXCELLENT_BREAK_EVEN_MONTHS: Decimal = dec!(24);
const LONG_BREAK_EVEN_MONTHS: Decimal = dec!(60);
const MAX_REMAINING_MONTHS: u32 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current_balance: Money,
    pub current_rate_percent: Percent,
    /// Payments left on the existing loan.
    pub remaining_months: u32,
    /// Existing principal-and-interest payment; derived from the balance,
    /// rate and remaining term when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_payment: Option<Money>,
    pub new_rate_percent: Percent,
    pub new_term_years: u32,
    #[serde(default)]
    pub closing_costs: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefinanceRecommendation {
    NotRecommended,
    ConsiderLengthOfStay,
    Excellent,
    GoodOpportunity,
}

impl RefinanceRecommendation {
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::NotRecommended => {
                "Refinancing does not lower the monthly payment. Proceed with caution."
            }
            Self::ConsiderLengthOfStay => {
                "Break-even takes more than five years. Consider how long you plan to \
                 stay in the home."
            }
            Self::Excellent => "Excellent opportunity: closing costs are recovered within two years.",
            Self::GoodOpportunity => "Good opportunity: closing costs are recovered within five years.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceOutput {
    pub current_payment: Money,
    pub new_payment: Money,
    pub monthly_savings: Money,
    /// Percentage points shaved off the note rate.
    pub rate_reduction: Percent,
    /// Months of savings needed to recover closing costs; `None` when the
    /// new payment is not lower.
    pub break_even_months: Option<Decimal>,
    /// `break_even_months` rounded up to a whole payment, saturating at `u32::MAX`.
    pub break_even_whole_months: Option<u32>,
    pub current_total_interest: Money,
    pub new_total_interest: Money,
    pub interest_savings: Money,
    /// Interest savings net of closing costs.
    pub total_savings: Money,
    pub recommendation: RefinanceRecommendation,
    pub guidance: String,
}

/// Compare the existing loan against a refinance at a new rate and term.
pub fn analyze_refinance(
    input: &RefinanceInput,
) -> MortgageResult<ComputationOutput<RefinanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = vec![
        "Lifetime interest approximated as payment x remaining payments - balance".into(),
    ];
    validate(input)?;

    let balance = input.current_balance;
    let current_payment = match input.current_payment {
        Some(p) => round_money(p),
        None => level_payment(balance, input.current_rate_percent, input.remaining_months)?,
    };
    let new_payment = monthly_payment(balance, input.new_rate_percent, input.new_term_years)?;
    let monthly_savings = current_payment - new_payment;

    let (break_even_months, break_even_whole_months) = if monthly_savings > Decimal::ZERO {
        let months = input.closing_costs / monthly_savings;
        let whole = months.ceil().to_u32().unwrap_or_else(|| {
            warnings.push("Break-even is beyond any realistic horizon".into());
            u32::MAX
        });
        (Some(months.round_dp(2)), Some(whole))
    } else {
        (None, None)
    };

    let new_months = input.new_term_years * 12;
    let current_total_interest =
        round_money(current_payment * Decimal::from(input.remaining_months) - balance);
    let new_total_interest = round_money(new_payment * Decimal::from(new_months) - balance);
    if current_total_interest < Decimal::ZERO {
        warnings.push("Current payment does not cover the balance over the remaining term".into());
    }
    let interest_savings = current_total_interest - new_total_interest;
    let total_savings = interest_savings - input.closing_costs;

    if new_months > input.remaining_months {
        warnings.push(format!(
            "New term extends payoff by {} months",
            new_months - input.remaining_months
        ));
    }
    if monthly_savings > Decimal::ZERO && total_savings < Decimal::ZERO {
        warnings.push("Monthly payment falls but lifetime cost rises after closing costs".into());
    }

    let recommendation = match break_even_months {
        None => RefinanceRecommendation::NotRecommended,
        Some(m) if m > LONG_BREAK_EVEN_MONTHS => RefinanceRecommendation::ConsiderLengthOfStay,
        Some(m) if m <= EXCELLENT_BREAK_EVEN_MONTHS => RefinanceRecommendation::Excellent,
        Some(_) => RefinanceRecommendation::GoodOpportunity,
    };

    let output = RefinanceOutput {
        current_payment,
        new_payment,
        monthly_savings,
        rate_reduction: input.current_rate_percent - input.new_rate_percent,
        break_even_months,
        break_even_whole_months,
        current_total_interest,
        new_total_interest,
        interest_savings,
        total_savings,
        recommendation,
        guidance: recommendation.guidance().to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance break-even on closing costs with approximate lifetime interest",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate(input: &RefinanceInput) -> MortgageResult<()> {
    require_positive("current_balance", input.current_balance)?;
    validate_rate_percent("current_rate_percent", input.current_rate_percent)?;
    validate_rate_percent("new_rate_percent", input.new_rate_percent)?;
    validate_term_years("new_term_years", input.new_term_years)?;
    require_non_negative("closing_costs", input.closing_costs)?;
    if input.remaining_months == 0 || input.remaining_months > MAX_REMAINING_MONTHS {
        return Err(MortgageError::invalid(
            "remaining_months",
            "Remaining months must be between 1 and 600",
        ));
    }
    if let Some(p) = input.current_payment {
        require_positive("current_payment", p)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> RefinanceInput {
        RefinanceInput {
            current_balance: dec!(400_000),
            current_rate_percent: dec!(7.5),
            remaining_months: 336,
            current_payment: Some(dec!(2_900)),
            new_rate_percent: dec!(6.0),
            new_term_years: 30,
            closing_costs: dec!(6_000),
        }
    }

    fn run(input: &RefinanceInput) -> RefinanceOutput {
        analyze_refinance(input).unwrap().result
    }

    #[test]
    fn test_savings_and_break_even() {
        let out = run(&input());
        // 400k at 6% / 30y = 2,398.20
        assert_eq!(out.new_payment, dec!(2398.20));
        assert_eq!(out.monthly_savings, dec!(501.80));
        // 6,000 / 501.80 = 11.96
        assert_eq!(out.break_even_months, Some(dec!(11.96)));
        assert_eq!(out.break_even_whole_months, Some(12));
        assert_eq!(out.recommendation, RefinanceRecommendation::Excellent);
        assert_eq!(out.rate_reduction, dec!(1.5));
    }

    #[test]
    fn test_interest_approximation() {
        let out = run(&input());
        assert_eq!(out.current_total_interest, dec!(2900) * dec!(336) - dec!(400_000));
        assert_eq!(out.new_total_interest, dec!(2398.20) * dec!(360) - dec!(400_000));
        assert_eq!(out.total_savings, out.interest_savings - dec!(6_000));
    }

    #[test]
    fn test_no_savings_has_no_break_even() {
        let mut req = input();
        req.new_rate_percent = dec!(8.5);
        let out = run(&req);
        assert!(out.monthly_savings <= Decimal::ZERO);
        assert_eq!(out.break_even_months, None);
        assert_eq!(out.recommendation, RefinanceRecommendation::NotRecommended);
    }

    #[test]
    fn test_recommendation_buckets() {
        let mut req = input();
        req.closing_costs = dec!(20_000); // ~39.9 months
        assert_eq!(run(&req).recommendation, RefinanceRecommendation::GoodOpportunity);
        req.closing_costs = dec!(40_000); // ~79.7 months
        assert_eq!(run(&req).recommendation, RefinanceRecommendation::ConsiderLengthOfStay);
        req.closing_costs = Decimal::ZERO;
        assert_eq!(run(&req).recommendation, RefinanceRecommendation::Excellent);
    }

    #[test]
    fn test_current_payment_derived_when_absent() {
        let mut req = input();
        req.current_payment = None;
        req.remaining_months = 360;
        let out = run(&req);
        let expected = monthly_payment(dec!(400_000), dec!(7.5), 30).unwrap();
        assert_eq!(out.current_payment, expected);
    }

    #[test]
    fn test_term_extension_warning() {
        let out = analyze_refinance(&input()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("extends payoff by 24 months")));
    }

    #[test]
    fn test_penny_savings_saturate_whole_months() {
        let mut req = input();
        req.current_payment = Some(dec!(2398.21));
        req.closing_costs = dec!(100_000_000_000);
        let out = analyze_refinance(&req).unwrap();
        assert_eq!(out.result.monthly_savings, dec!(0.01));
        assert_eq!(out.result.break_even_months, Some(dec!(10_000_000_000_000)));
        assert_eq!(out.result.break_even_whole_months, Some(u32::MAX));
        assert_eq!(
            out.result.recommendation,
            RefinanceRecommendation::ConsiderLengthOfStay
        );
        assert!(out.warnings.iter().any(|w| w.contains("realistic horizon")));
    }

    #[test]
    fn test_validation() {
        let mut req = input();
        req.remaining_months = 0;
        assert!(analyze_refinance(&req).is_err());
        let mut req = input();
        req.closing_costs = dec!(-1);
        assert!(analyze_refinance(&req).is_err());
        let mut req = input();
        req.current_balance = Decimal::ZERO;
        assert!(analyze_refinance(&req).is_err());
    }
}
