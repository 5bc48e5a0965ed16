use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::arm::projection::{self, ArmInput};

use crate::input;

/// Arguments for the ARM projection. Defaults describe a 5/1 ARM with 2/2/5 caps.
#[derive(Args)]
pub struct ArmArgs {
    /// Amount borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Start rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term_years: u32,

    /// Years before the first reset
    #[arg(long, default_value = "5")]
    pub initial_period: u32,

    /// Years between later resets
    #[arg(long, default_value = "1")]
    pub adjustment_period: u32,

    /// Maximum increase at the first reset (percentage points)
    #[arg(long, default_value = "2")]
    pub initial_cap: Decimal,

    /// Maximum increase at each later reset (percentage points)
    #[arg(long, default_value = "2")]
    pub periodic_cap: Decimal,

    /// Maximum increase over the life of the loan (percentage points)
    #[arg(long, default_value = "5")]
    pub lifetime_cap: Decimal,

    /// Margin over the index (percentage points)
    #[arg(long, default_value = "2.75")]
    pub margin: Decimal,

    /// Current index value in percent
    #[arg(long, default_value = "0")]
    pub index_rate: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_arm(args: ArmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let arm_input: ArmInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ArmInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            initial_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term_years,
            initial_period_years: args.initial_period,
            adjustment_period_years: args.adjustment_period,
            initial_cap: args.initial_cap,
            periodic_cap: args.periodic_cap,
            lifetime_cap: args.lifetime_cap,
            margin: args.margin,
            index_rate: args.index_rate,
        },
    };
    let result = projection::project_arm(&arm_input)?;
    Ok(serde_json::to_value(result)?)
}
