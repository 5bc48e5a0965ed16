use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::config::MarketDefaults;
use mortgage_core::loan::amortization::{self, AmortizationInput};
use mortgage_core::loan::monthly_payment::{self, MortgagePaymentInput};

use crate::input;

/// Arguments for the full monthly payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Purchase price
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Cash down payment
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual note rate in percent (e.g. 7.25)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term_years: u32,

    /// Known annual property tax bill
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Known annual homeowners insurance premium
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Lender-quoted monthly PMI
    #[arg(long)]
    pub pmi: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Tax jurisdiction key (e.g. travis)
    #[arg(long)]
    pub jurisdiction: Option<String>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual note rate in percent (e.g. 7.25)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term_years: u32,

    /// Extra principal paid every month
    #[arg(long)]
    pub extra_principal: Option<Decimal>,

    /// Print the yearly roll-up instead of every payment
    #[arg(long)]
    pub yearly: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payment(
    args: PaymentArgs,
    defaults: &MarketDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let payment_input: MortgagePaymentInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => MortgagePaymentInput {
            home_price: args
                .home_price
                .ok_or("--home-price is required (or provide --input)")?,
            down_payment: args
                .down_payment
                .ok_or("--down-payment is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term_years,
            annual_property_tax: args.property_tax,
            annual_insurance: args.insurance,
            monthly_pmi: args.pmi,
            monthly_hoa: args.hoa,
            jurisdiction: args.jurisdiction,
        },
    };
    let result = monthly_payment::calculate_mortgage_payment(&payment_input, defaults)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => AmortizationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term_years,
            extra_monthly_principal: args.extra_principal,
            first_payment_date: None,
        },
    };
    let result = amortization::build_amortization_schedule(&schedule_input)?;

    if args.yearly {
        return Ok(serde_json::to_value(&result.result.yearly_summary)?);
    }
    Ok(serde_json::to_value(result)?)
}
