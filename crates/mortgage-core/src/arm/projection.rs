//! Worst-case adjustable-rate mortgage projection.
//!
//! The note rate is fixed for `initial_period_years`. The first reset (year
//! `initial_period + 1`) may raise it by up to `initial_cap`; each later reset,
//! every `adjustment_period_years`, by up to `periodic_cap`. The rate never
//! exceeds `initial_rate + lifetime_cap`. The projection assumes every reset
//! moves by the full cap, so it is a ceiling on what the borrower can face.
//!
//! Each year is priced independently: the balance at the start of the year
//! (as scheduled at the initial rate) is re-amortized over the remaining term
//! at that year's rate. This is an approximation of a servicer's ledger,
//! which would carry the actual balance through each rate change.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::time_value::{level_payment, remaining_balance};
use crate::types::{
    require_non_negative, require_positive, round_money, validate_rate_percent,
    validate_term_years, with_metadata, ComputationOutput, Money, Percent,
};
use crate::MortgageResult;

/// Spread of the comparison fixed-rate loan over the ARM start rate.
const FIXED_RATE_PREMIUM: Percent = dec!(0.75);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// ARM note terms. Caps, margin and index are in percentage points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmInput {
    pub loan_amount: Money,
    pub initial_rate_percent: Percent,
    pub term_years: u32,
    /// Years before the first reset (5 for a 5/1 ARM).
    pub initial_period_years: u32,
    /// Years between resets after the first (1 for a 5/1 ARM).
    pub adjustment_period_years: u32,
    pub initial_cap: Percent,
    pub periodic_cap: Percent,
    pub lifetime_cap: Percent,
    pub margin: Percent,
    pub index_rate: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateStatus {
    /// Still at the start rate.
    Current,
    /// Above the start rate, below the ceiling.
    Rising,
    /// At the lifetime ceiling.
    Max,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmYear {
    pub year: u32,
    pub rate: Percent,
    pub payment: Money,
    /// Scheduled balance at the start of the year.
    pub starting_balance: Money,
    pub is_adjustment: bool,
    pub status: RateStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmWorstCase {
    pub year: u32,
    pub rate: Percent,
    pub payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedRateComparison {
    pub rate: Percent,
    pub payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmOutput {
    pub initial_payment: Money,
    /// Payment on the full loan over the full term at the lifetime ceiling.
    pub max_possible_payment: Money,
    pub rate_ceiling: Percent,
    /// Index plus margin.
    pub fully_indexed_rate: Percent,
    pub worst_case: ArmWorstCase,
    /// First year the ceiling is reached, if ever.
    pub year_ceiling_reached: Option<u32>,
    pub payment_shock: Money,
    pub payment_shock_percent: Decimal,
    pub arm_total_paid: Money,
    pub fixed_rate_comparison: FixedRateComparison,
    /// Worst-case ARM total minus fixed-rate total (positive: ARM costs more).
    pub arm_vs_fixed_difference: Money,
    pub schedule: Vec<ArmYear>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project the worst-case rate and payment path of an ARM.
pub fn project_arm(input: &ArmInput) -> MortgageResult<ComputationOutput<ArmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = vec![
        "Yearly payments re-amortize the scheduled balance at each rate; not a servicing ledger"
            .into(),
    ];
    validate(input)?;

    let months = input.term_years * 12;
    let ceiling = rate_ceiling(input);
    let fully_indexed_rate = input.index_rate + input.margin;

    if fully_indexed_rate > ceiling {
        warnings.push(format!(
            "Fully indexed rate {fully_indexed_rate}% exceeds the lifetime ceiling {ceiling}%"
        ));
    } else if fully_indexed_rate < input.initial_rate_percent {
        warnings.push(format!(
            "Fully indexed rate {fully_indexed_rate}% is below the start rate; \
             actual resets may lower the payment"
        ));
    }
    if input.initial_period_years >= input.term_years {
        warnings.push("Initial period covers the whole term; the rate never adjusts".into());
    }

    let initial_payment = level_payment(input.loan_amount, input.initial_rate_percent, months)?;
    let max_possible_payment = level_payment(input.loan_amount, ceiling, months)?;

    let schedule = (1..=input.term_years)
        .map(|year| project_year(input, year))
        .collect::<MortgageResult<Vec<_>>>()?;

    let worst = schedule
        .iter()
        .fold(None::<&ArmYear>, |best, y| match best {
            Some(b) if b.payment >= y.payment => Some(b),
            _ => Some(y),
        })
        .ok_or_else(|| MortgageError::invalid("term_years", "Projection produced no years"))?;
    let worst_case = ArmWorstCase {
        year: worst.year,
        rate: worst.rate,
        payment: worst.payment,
    };

    let year_ceiling_reached = schedule
        .iter()
        .find(|y| y.status == RateStatus::Max)
        .map(|y| y.year);

    let payment_shock = worst_case.payment - initial_payment;
    let payment_shock_percent = if initial_payment.is_zero() {
        Decimal::ZERO
    } else {
        round_money(payment_shock / initial_payment * Decimal::ONE_HUNDRED)
    };

    let arm_total_paid: Money = schedule.iter().map(|y| y.payment * dec!(12)).sum();
    let fixed_rate_comparison = fixed_comparison(input, months)?;
    let arm_vs_fixed_difference = arm_total_paid - fixed_rate_comparison.total_paid;

    tracing::debug!(
        ceiling = %ceiling,
        worst_year = worst_case.year,
        worst_payment = %worst_case.payment,
        "arm projection complete"
    );

    let output = ArmOutput {
        initial_payment,
        max_possible_payment,
        rate_ceiling: ceiling,
        fully_indexed_rate,
        worst_case,
        year_ceiling_reached,
        payment_shock,
        payment_shock_percent,
        arm_total_paid,
        fixed_rate_comparison,
        arm_vs_fixed_difference,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capped ARM worst-case projection with per-year re-amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Worst-case note rate in force during `year` (1-based).
pub fn rate_for_year(input: &ArmInput, year: u32) -> Percent {
    if year <= input.initial_period_years {
        return input.initial_rate_percent;
    }
    let resets = 1 + (year - input.initial_period_years - 1) / input.adjustment_period_years;
    let uncapped = input.initial_rate_percent
        + input.initial_cap
        + input.periodic_cap * Decimal::from(resets - 1);
    uncapped.min(rate_ceiling(input))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rate_ceiling(input: &ArmInput) -> Percent {
    input.initial_rate_percent + input.lifetime_cap
}

fn project_year(input: &ArmInput, year: u32) -> MortgageResult<ArmYear> {
    let months = input.term_years * 12;
    let months_paid = (year - 1) * 12;
    let rate = rate_for_year(input, year);

    let starting_balance = remaining_balance(
        input.loan_amount,
        input.initial_rate_percent,
        months,
        months_paid,
    )?;
    // An unchanged rate leaves the note payment unchanged.
    let payment = if rate == input.initial_rate_percent {
        level_payment(input.loan_amount, rate, months)?
    } else {
        level_payment(starting_balance, rate, months - months_paid)?
    };

    let is_adjustment = year > input.initial_period_years
        && (year - input.initial_period_years - 1) % input.adjustment_period_years == 0;

    let status = if rate == input.initial_rate_percent {
        RateStatus::Current
    } else if rate >= rate_ceiling(input) {
        RateStatus::Max
    } else {
        RateStatus::Rising
    };

    Ok(ArmYear {
        year,
        rate,
        payment,
        starting_balance,
        is_adjustment,
        status,
    })
}

fn fixed_comparison(input: &ArmInput, months: u32) -> MortgageResult<FixedRateComparison> {
    let rate = input.initial_rate_percent + FIXED_RATE_PREMIUM;
    let payment = level_payment(input.loan_amount, rate, months)?;
    let total_paid = payment * Decimal::from(months);
    Ok(FixedRateComparison {
        rate,
        payment,
        total_paid,
        total_interest: total_paid - input.loan_amount,
    })
}

fn validate(input: &ArmInput) -> MortgageResult<()> {
    require_positive("loan_amount", input.loan_amount)?;
    validate_rate_percent("initial_rate_percent", input.initial_rate_percent)?;
    validate_term_years("term_years", input.term_years)?;
    if input.initial_period_years == 0 {
        return Err(MortgageError::invalid(
            "initial_period_years",
            "Initial fixed period must be at least 1 year",
        ));
    }
    if input.adjustment_period_years == 0 {
        return Err(MortgageError::invalid(
            "adjustment_period_years",
            "Adjustment period must be at least 1 year",
        ));
    }
    require_non_negative("initial_cap", input.initial_cap)?;
    require_non_negative("periodic_cap", input.periodic_cap)?;
    require_non_negative("lifetime_cap", input.lifetime_cap)?;
    require_non_negative("margin", input.margin)?;
    require_non_negative("index_rate", input.index_rate)?;
    validate_rate_percent("lifetime ceiling", rate_ceiling(input))?;
    validate_rate_percent(
        "fixed comparison rate",
        input.initial_rate_percent + FIXED_RATE_PREMIUM,
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
