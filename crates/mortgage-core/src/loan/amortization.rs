//! Level-payment amortization ledger.
//!
//! Expands a fixed-rate loan into one row per monthly payment. Interest is
//! charged on the running balance and rounded to cents each period, so every
//! row satisfies `principal + interest == payment` exactly and the principal
//! column sums to the original loan. The final scheduled period absorbs any
//! rounding residue, and the ledger stops early once the balance is retired
//! (which is what happens when extra principal is paid).

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::time_value::{monthly_payment, monthly_rate};
use crate::types::{
    require_non_negative, round_money, with_metadata, ComputationOutput, LoanTerms, Money, Percent,
};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Amortization request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual note rate in percent (e.g. 7.25).
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    /// Additional principal remitted with every payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_monthly_principal: Option<Money>,
    /// Due date of the first payment; later payments fall one month apart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

impl AmortizationInput {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            annual_rate_percent: self.annual_rate_percent,
            term_years: self.term_years,
        }
    }
}

/// One row of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based payment number.
    pub payment_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// Calendar-year style roll-up (payments 1-12, 13-24, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    /// Contractual principal-and-interest payment.
    pub monthly_payment: Money,
    /// Number of payments the note calls for.
    pub scheduled_payments: u32,
    /// Number of payments actually needed to retire the loan.
    pub payoff_months: u32,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    /// Interest avoided versus the same loan without extra principal.
    pub interest_saved: Money,
    pub months_saved: u32,
    pub yearly_summary: Vec<AmortizationYear>,
    pub schedule: Vec<AmortizationEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full amortization schedule for a fixed-rate loan.
pub fn build_amortization_schedule(
    input: &AmortizationInput,
) -> MortgageResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = input.terms();
    terms.validate()?;
    let extra = input.extra_monthly_principal.unwrap_or(Decimal::ZERO);
    require_non_negative("extra_monthly_principal", extra)?;

    if terms.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: principal is repaid straight-line".into());
    }

    let monthly = monthly_payment(terms.principal, terms.annual_rate_percent, terms.term_years)?;
    let mut schedule = amortization_ledger(&terms, extra)?;

    if let Some(first) = input.first_payment_date {
        for entry in &mut schedule {
            let date = first
                .checked_add_months(Months::new(entry.payment_index - 1))
                .ok_or_else(|| {
                    MortgageError::DateError(format!(
                        "payment {} falls outside the supported calendar",
                        entry.payment_index
                    ))
                })?;
            entry.scheduled_date = Some(date);
        }
    }

    let (total_principal, total_interest) = totals(&schedule);
    let payoff_months = schedule.len() as u32;

    let (interest_saved, months_saved) = if extra > Decimal::ZERO {
        let baseline = amortization_ledger(&terms, Decimal::ZERO)?;
        let (_, baseline_interest) = totals(&baseline);
        (
            baseline_interest - total_interest,
            (baseline.len() as u32).saturating_sub(payoff_months),
        )
    } else {
        (Decimal::ZERO, 0)
    };

    if extra > Decimal::ZERO {
        tracing::debug!(
            payoff_months,
            months_saved,
            %interest_saved,
            "extra principal shortens the loan"
        );
    }

    let output = AmortizationOutput {
        monthly_payment: monthly,
        scheduled_payments: terms.term_months(),
        payoff_months,
        total_principal,
        total_interest,
        total_paid: total_principal + total_interest,
        interest_saved,
        months_saved,
        yearly_summary: summarise_by_year(&schedule),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with per-period cent rounding",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Expand a loan into its payment-by-payment ledger (dates unset).
///
/// `extra_principal` is added to every payment until the loan is retired.
pub fn amortization_ledger(
    terms: &LoanTerms,
    extra_principal: Money,
) -> MortgageResult<Vec<AmortizationEntry>> {
    terms.validate()?;
    require_non_negative("extra_principal", extra_principal)?;

    let months = terms.term_months();
    let payment = monthly_payment(terms.principal, terms.annual_rate_percent, terms.term_years)?;
    let r = monthly_rate(terms.annual_rate_percent);

    let mut entries = Vec::with_capacity(months as usize);
    let mut balance = terms.principal;

    for payment_index in 1..=months {
        if balance <= Decimal::ZERO {
            break;
        }

        let interest = round_money(balance * r);
        let mut principal = payment - interest + extra_principal;
        if principal > balance || payment_index == months {
            principal = balance;
        }
        balance -= principal;

        entries.push(AmortizationEntry {
            payment_index,
            scheduled_date: None,
            payment_amount: principal + interest,
            principal_portion: principal,
            interest_portion: interest,
            remaining_balance: balance,
        });
    }

    Ok(entries)
}

/// Balance outstanding after `months_paid` payments, read off the ledger.
pub fn balance_after(schedule: &[AmortizationEntry], principal: Money, months_paid: u32) -> Money {
    if months_paid == 0 {
        return principal;
    }
    schedule
        .get(months_paid as usize - 1)
        .map(|e| e.remaining_balance)
        .unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn totals(schedule: &[AmortizationEntry]) -> (Money, Money) {
    schedule.iter().fold((Decimal::ZERO, Decimal::ZERO), |(p, i), e| {
        (p + e.principal_portion, i + e.interest_portion)
    })
}

fn summarise_by_year(schedule: &[AmortizationEntry]) -> Vec<AmortizationYear> {
    schedule
        .chunks(12)
        .enumerate()
        .map(|(idx, chunk)| {
            let (principal_paid, interest_paid) = totals(chunk);
            AmortizationYear {
                year: idx as u32 + 1,
                principal_paid,
                interest_paid,
                ending_balance: chunk
                    .last()
                    .map(|e| e.remaining_balance)
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
