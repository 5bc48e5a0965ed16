use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::borrower::affordability::{self, AffordabilityProfile};
use mortgage_core::borrower::refinance::{self, RefinanceInput};
use mortgage_core::config::MarketDefaults;

use crate::input;

/// Arguments for the affordability solver
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly debt payments
    #[arg(long, default_value = "0")]
    pub debts: Decimal,

    /// Cash available for the down payment
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Annual note rate in percent (e.g. 7.25)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term_years: u32,

    /// Front-end ratio override (e.g. 0.31)
    #[arg(long)]
    pub front_end_ratio: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for refinance analysis
#[derive(Args)]
pub struct RefinanceArgs {
    /// Outstanding balance on the existing loan
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Existing note rate in percent
    #[arg(long)]
    pub current_rate: Option<Decimal>,

    /// Payments left on the existing loan
    #[arg(long)]
    pub remaining_months: Option<u32>,

    /// Existing principal-and-interest payment (derived when omitted)
    #[arg(long)]
    pub current_payment: Option<Decimal>,

    /// New note rate in percent
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// New loan term in years
    #[arg(long, default_value = "30")]
    pub new_term_years: u32,

    /// Closing costs of the new loan
    #[arg(long, default_value = "0")]
    pub closing_costs: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_affordability(
    args: AffordabilityArgs,
    defaults: &MarketDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let profile: AffordabilityProfile = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => AffordabilityProfile {
            monthly_gross_income: args
                .income
                .ok_or("--income is required (or provide --input)")?,
            monthly_debts: args.debts,
            down_payment: args.down_payment,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term_years,
            property_tax_rate: None,
            insurance_rate: None,
            max_front_end_ratio: args.front_end_ratio,
        },
    };
    let result = affordability::calculate_affordability(&profile, defaults)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let refi_input: RefinanceInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => RefinanceInput {
            current_balance: args
                .balance
                .ok_or("--balance is required (or provide --input)")?,
            current_rate_percent: args
                .current_rate
                .ok_or("--current-rate is required (or provide --input)")?,
            remaining_months: args
                .remaining_months
                .ok_or("--remaining-months is required (or provide --input)")?,
            current_payment: args.current_payment,
            new_rate_percent: args
                .new_rate
                .ok_or("--new-rate is required (or provide --input)")?,
            new_term_years: args.new_term_years,
            closing_costs: args.closing_costs,
        },
    };
    let result = refinance::analyze_refinance(&refi_input)?;
    Ok(serde_json::to_value(result)?)
}
