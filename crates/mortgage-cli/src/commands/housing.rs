use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::config::MarketDefaults;
use mortgage_core::housing::property_tax::{self, PropertyTaxInput};
use mortgage_core::housing::rent_vs_buy::{self, RentVsBuyInput};

use crate::input;

/// Arguments for the property tax estimate
#[derive(Args)]
pub struct PropertyTaxArgs {
    /// Market value of the home
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Tax jurisdiction key (e.g. travis)
    #[arg(long)]
    pub jurisdiction: Option<String>,

    /// Apply the homestead exemption
    #[arg(long)]
    pub homestead: bool,

    /// Apply the senior exemption
    #[arg(long)]
    pub senior: bool,

    /// Apply the veteran exemption
    #[arg(long)]
    pub veteran: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for rent vs buy
#[derive(Args)]
pub struct RentVsBuyArgs {
    /// Path to JSON input file with purchase, rent and market assumptions
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_property_tax(
    args: PropertyTaxArgs,
    defaults: &MarketDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: PropertyTaxInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PropertyTaxInput {
            home_price: args
                .home_price
                .ok_or("--home-price is required (or provide --input)")?,
            jurisdiction: args.jurisdiction,
            homestead: args.homestead,
            senior: args.senior,
            veteran: args.veteran,
        },
    };
    let result = property_tax::estimate_property_tax(&tax_input, defaults)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rent_vs_buy(
    args: RentVsBuyArgs,
    defaults: &MarketDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rvb_input: RentVsBuyInput = input::read_structured(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for rent vs buy")?;
    let result = rent_vs_buy::analyze_rent_vs_buy(&rvb_input, defaults)?;
    Ok(serde_json::to_value(result)?)
}
